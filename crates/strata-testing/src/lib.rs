//! Testing utilities and fixtures for strata
//!
//! Provides a scratch-directory fixture plus a mock cluster CLI: a shell
//! script that mimics the external DFS tool's subcommands against a local
//! directory, so the subprocess protocol can be exercised without a real
//! cluster.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

/// Temporary test directory, removed on drop
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file (and its parent directories) under the test directory
    pub fn create_file(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Create a directory under the test directory
    pub fn create_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// The standard sample tree used by tree-shaped remove/list tests
pub const SAMPLE_TREE: &[&str] = &["f", "g/a/b", "g/a/a/b"];

#[cfg(unix)]
mod mock {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use anyhow::Result;
    use tempfile::TempDir;

    const SCRIPT_TEMPLATE: &str = r##"#!/bin/sh
# Stand-in for the cluster CLI, backed by a local directory.
ROOT='__ROOT__'
VERSION='__VERSION__'

cmd="$1"; shift

if [ "$cmd" = "version" ]; then
    echo "Hadoop $VERSION"
    echo "Subversion https://example.invalid/repos/dfs -r 0000000"
    exit 0
fi

[ "$cmd" = "fs" ] || { echo "unknown command: $cmd" >&2; exit 2; }

sub="$1"; shift

strip() {
    printf '%s\n' "$1" | sed -e 's|^[a-z0-9]*://[^/]*||'
}

emit() {
    f="$1"; uri="$2"
    rel="${f#$ROOT}"
    [ -n "$rel" ] || rel="/"
    case "$uri" in
        hdfs*)
            if [ -d "$f" ]; then
                printf '%s   - mrsam supergroup          0 2010-01-13 14:00 %s\n' 'drwxr-xr-x' "$rel"
            else
                sz=$(wc -c < "$f" | tr -d ' ')
                printf '%s   3 mrsam supergroup %10s 2010-01-13 14:00 %s\n' '-rw-r--r--' "$sz" "$rel"
            fi
            ;;
        *)
            # object-store listings carry no owner/group columns
            if [ -d "$f" ]; then
                printf '%s   -          0 2010-01-13 14:00 %s\n' 'drwxrwxrwx' "$rel"
            else
                sz=$(wc -c < "$f" | tr -d ' ')
                printf '%s   1 %10s 2010-01-13 14:00 %s\n' '-rwxrwxrwx' "$sz" "$rel"
            fi
            ;;
    esac
}

case "$sub" in
    -lsr)
        uri="$1"
        rel=$(strip "$uri")
        matched=0
        for m in "$ROOT"$rel; do
            [ -e "$m" ] || continue
            matched=1
            find "$m" | while IFS= read -r f; do
                [ "$f" = "$ROOT" ] && continue
                emit "$f" "$uri"
            done
        done
        if [ "$matched" = 0 ]; then
            echo "lsr: cannot access $uri: No such file or directory." >&2
            exit 255
        fi
        ;;
    -dus)
        uri="$1"
        rel=$(strip "$uri")
        matched=0
        for m in "$ROOT"$rel; do
            [ -e "$m" ] || continue
            matched=1
            if [ -d "$m" ]; then
                sz=$(find "$m" -type f -exec cat {} + | wc -c | tr -d ' ')
            else
                sz=$(wc -c < "$m" | tr -d ' ')
            fi
            printf '%s    %s\n' "$uri" "$sz"
        done
        if [ "$matched" = 0 ]; then
            echo "dus: could not get listing for $uri" >&2
            exit 255
        fi
        ;;
    -mkdir)
        parents=0
        if [ "$1" = "-p" ]; then parents=1; shift; fi
        rel=$(strip "$1")
        p="$ROOT$rel"
        if [ -e "$p" ] && [ "$parents" = 0 ]; then
            echo "mkdir: cannot create directory $1: File exists" >&2
            exit 255
        fi
        mkdir -p "$p"
        ;;
    -test)
        [ "$1" = "-e" ] && shift
        rel=$(strip "$1")
        for m in "$ROOT"$rel; do
            [ -e "$m" ] && exit 0
        done
        exit 1
        ;;
    -rmr)
        uri="$1"
        rel=$(strip "$uri")
        matched=0
        for m in "$ROOT"$rel; do
            [ -e "$m" ] || continue
            matched=1
            echo "Moved to trash: $uri"
            rm -rf "$m"
        done
        if [ "$matched" = 0 ]; then
            echo "rmr: $uri" >&2
            exit 255
        fi
        ;;
    -touchz)
        rel=$(strip "$1")
        p="$ROOT$rel"
        if [ -s "$p" ]; then
            echo "touchz: $1 must be a zero-length file" >&2
            exit 255
        fi
        touch "$p"
        ;;
    -put)
        src="${1#file://}"
        dst="$2"
        rel=$(strip "$dst")
        p="$ROOT$rel"
        if [ -e "$p" ]; then
            echo "put: Target $dst already exists" >&2
            exit 255
        fi
        mkdir -p "$(dirname "$p")"
        cp "$src" "$p"
        ;;
    -cat)
        uri="$1"
        rel=$(strip "$uri")
        matched=0
        for m in "$ROOT"$rel; do
            [ -f "$m" ] || continue
            matched=1
            cat "$m"
        done
        if [ "$matched" = 0 ]; then
            echo "cat: $uri: No such file or directory" >&2
            exit 255
        fi
        ;;
    *)
        echo "unknown fs subcommand: $sub" >&2
        exit 2
        ;;
esac
exit 0
"##;

    /// A fake DFS client. `bin()` hands back the argv to configure a
    /// cluster adapter with; files placed under [`root`](MockDfs::root)
    /// are what the fake cluster serves.
    pub struct MockDfs {
        _dir: TempDir,
        script: PathBuf,
        root: PathBuf,
    }

    impl MockDfs {
        pub fn new(version: &str) -> Result<Self> {
            let dir = TempDir::new()?;
            let root = dir.path().join("dfs-root");
            fs::create_dir(&root)?;

            let script = dir.path().join("mock-dfs");
            let body = SCRIPT_TEMPLATE
                .replace("__ROOT__", &root.display().to_string())
                .replace("__VERSION__", version);
            write_executable(&script, &body)?;

            Ok(Self {
                _dir: dir,
                script,
                root,
            })
        }

        /// Argument vector that runs the fake client
        pub fn bin(&self) -> Vec<String> {
            vec![self.script.display().to_string()]
        }

        /// The local directory backing the fake cluster
        pub fn root(&self) -> &Path {
            &self.root
        }

        /// Seed a file into the fake cluster
        pub fn create_file(&self, rel: &str, contents: &[u8]) -> Result<PathBuf> {
            let path = self.root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, contents)?;
            Ok(path)
        }

        /// Seed a directory into the fake cluster
        pub fn create_dir(&self, rel: &str) -> Result<PathBuf> {
            let path = self.root.join(rel);
            fs::create_dir_all(&path)?;
            Ok(path)
        }
    }

    /// An arbitrary one-off tool script, for canned-output tests
    pub struct MockScript {
        _dir: TempDir,
        script: PathBuf,
    }

    impl MockScript {
        /// Write `body` (shell source, shebang included) as an executable
        pub fn new(body: &str) -> Result<Self> {
            let dir = TempDir::new()?;
            let script = dir.path().join("mock-tool");
            write_executable(&script, body)?;
            Ok(Self { _dir: dir, script })
        }

        pub fn bin(&self) -> Vec<String> {
            vec![self.script.display().to_string()]
        }
    }

    fn write_executable(path: &Path, body: &str) -> Result<()> {
        fs::write(path, body)?;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
        Ok(())
    }
}

#[cfg(unix)]
pub use mock::{MockDfs, MockScript};
