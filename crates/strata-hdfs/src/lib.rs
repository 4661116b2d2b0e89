//! Cluster filesystem backend for strata
//!
//! [`HdfsFilesystem`] owns every scheme-qualified path and serves it by
//! shelling out to a DFS command-line client (`hadoop fs` or a workalike).
//! The client's output formats and exit codes drift across versions and
//! across the storage flavors it can front, so each operation declares its
//! own tolerance policy through the [`invoke`] module rather than trusting
//! the transport-level outcome.

pub mod invoke;
pub mod parse;
pub mod version;

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{LazyLock, OnceLock};

use regex::Regex;
use tracing::{debug, error, info};

use strata_core::{path, ByteStream, Error, Filesystem, PathIter, Result};

use invoke::{Invoked, InvokeOpts};
use version::{extract_version, version_gte, FALLBACK_VERSION};

// mkdir on an existing directory
static FILE_EXISTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".*File exists.*").unwrap());

// recursive list of a path that matches nothing
static LSR_NO_SUCH_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^lsr: .*No such file or directory").unwrap());

// recursive remove of an already-absent target; the tool just echoes the
// scheme-qualified path back
static RMR_NO_SUCH_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rmr: \w+://.*").unwrap());

/// Backend that drives the external DFS client as a subprocess
pub struct HdfsFilesystem {
    bin: Vec<String>,
    // lazily probed once per instance; the client's version is assumed not
    // to change underneath us
    version: OnceLock<String>,
}

impl HdfsFilesystem {
    /// `bin` is the argument vector that runs the client, e.g.
    /// `["hadoop"]` or `["/opt/dfs/bin/hadoop", "--config", "/etc/dfs"]`.
    pub fn new(bin: Vec<String>) -> Self {
        HdfsFilesystem {
            bin,
            version: OnceLock::new(),
        }
    }

    /// Convenience constructor for a bare binary name
    pub fn with_binary(binary: &str) -> Self {
        Self::new(vec![binary.to_string()])
    }

    fn invoke(&self, args: &[&str], opts: &InvokeOpts) -> Result<Invoked> {
        invoke::invoke(&self.bin, args, opts)
    }

    /// Probe the client's version, memoized for the adapter's lifetime.
    /// Unparseable output falls back to a fixed default so that downstream
    /// flag selection still gets a deterministic answer.
    pub fn tool_version(&self) -> Result<&str> {
        if let Some(v) = self.version.get() {
            return Ok(v.as_str());
        }
        let out = self.invoke(&["version"], &InvokeOpts::capture_stdout())?;
        let resolved = match extract_version(&out.stdout) {
            Some(v) => {
                info!("using DFS client version {}", v);
                v
            }
            None => {
                info!(
                    "unable to determine DFS client version, assuming {}",
                    FALLBACK_VERSION
                );
                FALLBACK_VERSION.to_string()
            }
        };
        Ok(self.version.get_or_init(|| resolved).as_str())
    }
}

impl Filesystem for HdfsFilesystem {
    fn can_handle(&self, p: &str) -> bool {
        path::is_uri(p)
    }

    fn ls(&self, path_glob: &str) -> Result<PathIter> {
        let prefix = path::uri_prefix(path_glob);
        let opts = InvokeOpts::capture_stdout().tolerate(&LSR_NO_SUCH_FILE);
        let out = self.invoke(&["fs", "-lsr", path_glob], &opts)?;

        let entries: Vec<Result<String>> = out
            .stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| parse::parse_ls_line(line, &prefix))
            .filter_map(|parsed| parsed.transpose())
            .collect();
        Ok(Box::new(entries.into_iter()))
    }

    fn du(&self, path_glob: &str) -> Result<u64> {
        let out = self
            .invoke(&["fs", "-dus", path_glob], &InvokeOpts::capture_stdout())
            .map_err(|e| match e {
                Error::Command { .. } => Error::NotFound(path_glob.to_string()),
                other => other,
            })?;
        parse::sum_dus(&out.stdout)
    }

    fn exists(&self, path_glob: &str) -> Result<bool> {
        let out = self.invoke(
            &["fs", "-test", "-e", path_glob],
            &InvokeOpts::new().ok_statuses(&[0, 1]),
        )?;
        Ok(out.status == 0)
    }

    fn mkdir(&self, p: &str) -> Result<()> {
        let mut args = vec!["fs", "-mkdir"];
        // the "create parent directories" flag appeared in 2.0.0, where it
        // also became required for nested creation
        if version_gte(self.tool_version()?, "2.0.0") {
            args.push("-p");
        }
        args.push(p);
        self.invoke(&args, &InvokeOpts::new().tolerate(&FILE_EXISTS))?;
        Ok(())
    }

    fn rm(&self, path_glob: &str) -> Result<()> {
        // the tool narrates "Moved to trash: <path>" on stdout, which is
        // of no interest; its no-such-path complaint on stderr is not an
        // error for an already-absent target
        let opts = InvokeOpts::capture_stdout().tolerate(&RMR_NO_SUCH_FILE);
        self.invoke(&["fs", "-rmr", path_glob], &opts)?;
        Ok(())
    }

    fn touchz(&self, p: &str) -> Result<()> {
        // the tool refuses to touchz over a non-empty file
        self.invoke(&["fs", "-touchz", p], &InvokeOpts::new())
            .map_err(|e| match e {
                Error::Command { .. } => Error::AlreadyExists(p.to_string()),
                other => other,
            })?;
        Ok(())
    }

    fn open(&self, p: &str) -> Result<ByteStream> {
        let mut argv = self.bin.clone();
        for piece in ["fs", "-cat", p] {
            argv.push(piece.to_string());
        }
        debug!("> {}", argv.join(" "));

        let mut child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Storage("child stdout was not captured".to_string()))?;

        Ok(Box::new(CatReader {
            child,
            stdout,
            path: p.to_string(),
            finished: false,
        }))
    }

    fn write(&self, p: &str, content: &mut dyn Read) -> Result<()> {
        // spool to a scratch file and upload that; the scratch file is
        // removed on every exit path when `spool` drops
        let mut spool = tempfile::NamedTempFile::new()?;
        io::copy(content, &mut spool)?;
        spool.flush()?;
        self.put(p, spool.path())
    }

    fn put(&self, dest: &str, local_src: &Path) -> Result<()> {
        if path::is_uri(&local_src.to_string_lossy()) {
            return Err(Error::Storage(format!(
                "upload source must be a local path: {}",
                local_src.display()
            )));
        }
        if !local_src.is_file() {
            return Err(Error::NotFound(local_src.display().to_string()));
        }
        let absolute = std::fs::canonicalize(local_src)?;
        let src_uri = format!("file://{}", absolute.display());

        // the tool refuses to overwrite an existing destination
        self.invoke(&["fs", "-put", &src_uri, dest], &InvokeOpts::new())
            .map_err(|e| match e {
                Error::Command { .. } => Error::AlreadyExists(dest.to_string()),
                other => other,
            })?;
        Ok(())
    }
}

/// Streams one file's bytes out of a live `-cat` subprocess.
///
/// Exhausting the stream reaps the child and surfaces a non-zero exit as a
/// read error; dropping the reader early kills the child so the handle is
/// never leaked to a consumer that stopped pulling.
struct CatReader {
    child: Child,
    stdout: ChildStdout,
    path: String,
    finished: bool,
}

impl Read for CatReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.finished {
            return Ok(0);
        }
        let n = self.stdout.read(buf)?;
        if n == 0 {
            self.finished = true;

            // there should be no stderr; log whatever showed up
            let mut stderr_text = String::new();
            if let Some(mut stderr) = self.child.stderr.take() {
                let _ = stderr.read_to_string(&mut stderr_text);
            }
            for line in stderr_text.lines() {
                error!("STDERR: {}", line);
            }

            let status = self.child.wait()?;
            if !status.success() {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("could not stream {}", self.path),
                ));
            }
        }
        Ok(n)
    }
}

impl Drop for CatReader {
    fn drop(&mut self) {
        if !self.finished {
            // consumer stopped early; reclaim the subprocess
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
