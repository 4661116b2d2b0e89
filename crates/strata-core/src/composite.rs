//! Ordered first-match dispatch over a set of backends

use std::io::Read;
use std::path::Path;

use crate::{path, ByteStream, Error, Filesystem, PathIter, Result};

/// Holds backends in registration order and delegates each operation to the
/// first one whose [`can_handle`](Filesystem::can_handle) claims the path.
/// Registration order matters: predicates may overlap (a local-path backend
/// and a catch-all remote backend, say), and the first match wins.
#[derive(Default)]
pub struct CompositeFilesystem {
    backends: Vec<Box<dyn Filesystem>>,
}

impl CompositeFilesystem {
    pub fn new() -> Self {
        CompositeFilesystem {
            backends: Vec::new(),
        }
    }

    /// Append a backend; earlier registrations take precedence.
    pub fn register(&mut self, backend: Box<dyn Filesystem>) {
        self.backends.push(backend);
    }

    /// Builder-style [`register`](CompositeFilesystem::register)
    pub fn with(mut self, backend: Box<dyn Filesystem>) -> Self {
        self.register(backend);
        self
    }

    fn for_path(&self, p: &str) -> Result<&dyn Filesystem> {
        self.backends
            .iter()
            .map(|b| b.as_ref())
            .find(|b| b.can_handle(p))
            .ok_or_else(|| Error::Routing(p.to_string()))
    }
}

impl Filesystem for CompositeFilesystem {
    fn can_handle(&self, p: &str) -> bool {
        self.backends.iter().any(|b| b.can_handle(p))
    }

    fn ls(&self, path_glob: &str) -> Result<PathIter> {
        self.for_path(path_glob)?.ls(path_glob)
    }

    fn du(&self, path_glob: &str) -> Result<u64> {
        self.for_path(path_glob)?.du(path_glob)
    }

    fn exists(&self, path_glob: &str) -> Result<bool> {
        self.for_path(path_glob)?.exists(path_glob)
    }

    fn mkdir(&self, p: &str) -> Result<()> {
        self.for_path(p)?.mkdir(p)
    }

    fn rm(&self, path_glob: &str) -> Result<()> {
        self.for_path(path_glob)?.rm(path_glob)
    }

    fn touchz(&self, p: &str) -> Result<()> {
        self.for_path(p)?.touchz(p)
    }

    fn open(&self, p: &str) -> Result<ByteStream> {
        self.for_path(p)?.open(p)
    }

    fn cat(&self, p: &str) -> Result<ByteStream> {
        self.for_path(p)?.cat(p)
    }

    fn write(&self, p: &str, content: &mut dyn Read) -> Result<()> {
        self.for_path(p)?.write(p, content)
    }

    fn put(&self, dest: &str, local_src: &Path) -> Result<()> {
        self.for_path(dest)?.put(dest, local_src)
    }

    fn join(&self, dir: &str, name: &str) -> String {
        match self.for_path(dir) {
            Ok(backend) => backend.join(dir, name),
            Err(_) => path::join(dir, name),
        }
    }

    fn checksum(&self, p: &str) -> Result<String> {
        self.for_path(p)?.checksum(p)
    }
}
