//! The `Filesystem` trait implemented by every storage backend

use std::io::Read;
use std::path::Path;

use crate::{path, stream, Result};

/// Lazy listing: one absolute path reference per leaf entry
pub type PathIter = Box<dyn Iterator<Item = Result<String>> + Send>;

/// Byte stream pulled from a backend. Dropping it releases the underlying
/// resource (file handle, child process, network stream), even if the
/// consumer stops pulling early.
pub type ByteStream = Box<dyn Read + Send>;

/// One set of path-oriented operations over a storage backend.
///
/// Implementations are synchronous and blocking; nothing retries
/// internally. Paths are plain strings, either local paths or
/// `scheme://host/path` references; [`can_handle`](Filesystem::can_handle)
/// decides ownership purely syntactically.
pub trait Filesystem: Send + Sync {
    /// Whether this backend owns `path`. No probing, no I/O.
    fn can_handle(&self, path: &str) -> bool;

    /// Recursively list every file matching `path_glob`. Directories are
    /// traversed, never yielded. A glob matching nothing yields an empty
    /// iterator, not an error.
    fn ls(&self, path_glob: &str) -> Result<PathIter>;

    /// Total size in bytes of everything matching `path_glob`
    fn du(&self, path_glob: &str) -> Result<u64>;

    /// Whether anything matches `path_glob`
    fn exists(&self, path_glob: &str) -> Result<bool>;

    /// Create a directory (and missing parents). Idempotent.
    fn mkdir(&self, path: &str) -> Result<()>;

    /// Remove everything matching `path_glob`, recursing into directories.
    /// An already-absent target is not an error.
    fn rm(&self, path_glob: &str) -> Result<()>;

    /// Create an empty file at `path`. Fails with
    /// [`Error::AlreadyExists`](crate::Error::AlreadyExists) if a non-empty
    /// file is already there; an existing empty file is fine.
    fn touchz(&self, path: &str) -> Result<()>;

    /// Open `path` for reading, raw bytes
    fn open(&self, path: &str) -> Result<ByteStream>;

    /// Open `path` for reading, decompressing by extension (`.gz`)
    fn cat(&self, path: &str) -> Result<ByteStream> {
        Ok(stream::decompress(path, self.open(path)?))
    }

    /// Write `content` to a fresh file at `path`. Never overwrites; an
    /// existing destination fails with
    /// [`Error::AlreadyExists`](crate::Error::AlreadyExists).
    fn write(&self, path: &str, content: &mut dyn Read) -> Result<()>;

    /// Upload a local file to `dest`. Same no-overwrite rule as
    /// [`write`](Filesystem::write); the source must be a local, existing
    /// path.
    fn put(&self, dest: &str, local_src: &Path) -> Result<()>;

    /// Join `name` onto `dir` with the backend's separator conventions
    fn join(&self, dir: &str, name: &str) -> String {
        path::join(dir, name)
    }

    /// Hex digest of the file's raw content, for upload dedupe
    fn checksum(&self, path: &str) -> Result<String> {
        let mut reader = self.open(path)?;
        let mut hasher = blake3::Hasher::new();
        std::io::copy(&mut reader, &mut hasher)?;
        Ok(hasher.finalize().to_hex().to_string())
    }
}
