//! Local-disk backend

use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::{path, ByteStream, Error, Filesystem, PathIter, Result};

/// Backend for plain local paths, claiming everything that is not a
/// scheme-qualified reference.
#[derive(Debug, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        LocalFilesystem
    }
}

impl Filesystem for LocalFilesystem {
    fn can_handle(&self, p: &str) -> bool {
        !path::is_uri(p)
    }

    fn ls(&self, path_glob: &str) -> Result<PathIter> {
        let matches: Vec<PathBuf> = glob::glob(path_glob)?
            .filter_map(|entry| entry.ok())
            .collect();

        let iter = matches
            .into_iter()
            .flat_map(|p| -> Box<dyn Iterator<Item = Result<String>> + Send> {
                if p.is_dir() {
                    Box::new(WalkDir::new(p).into_iter().filter_map(|entry| match entry {
                        Ok(e) if e.file_type().is_file() => {
                            Some(Ok(e.path().display().to_string()))
                        }
                        Ok(_) => None,
                        Err(err) => Some(Err(err.into())),
                    }))
                } else {
                    Box::new(std::iter::once(Ok(p.display().to_string())))
                }
            });
        Ok(Box::new(iter))
    }

    fn du(&self, path_glob: &str) -> Result<u64> {
        let mut total = 0;
        for entry in self.ls(path_glob)? {
            total += fs::metadata(entry?)?.len();
        }
        Ok(total)
    }

    fn exists(&self, path_glob: &str) -> Result<bool> {
        if Path::new(path_glob).exists() {
            return Ok(true);
        }
        Ok(glob::glob(path_glob)?.filter_map(|e| e.ok()).next().is_some())
    }

    fn mkdir(&self, p: &str) -> Result<()> {
        fs::create_dir_all(p)?;
        Ok(())
    }

    fn rm(&self, path_glob: &str) -> Result<()> {
        for entry in glob::glob(path_glob)?.filter_map(|e| e.ok()) {
            debug!("rm {}", entry.display());
            if entry.is_dir() {
                fs::remove_dir_all(&entry)?;
            } else {
                fs::remove_file(&entry)?;
            }
        }
        Ok(())
    }

    fn touchz(&self, p: &str) -> Result<()> {
        if let Ok(meta) = fs::metadata(p) {
            if meta.len() > 0 {
                return Err(Error::AlreadyExists(p.to_string()));
            }
        }
        OpenOptions::new().create(true).append(true).open(p)?;
        Ok(())
    }

    fn open(&self, p: &str) -> Result<ByteStream> {
        let file = File::open(p).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(p.to_string()),
            _ => Error::Io(e),
        })?;
        Ok(Box::new(file))
    }

    fn write(&self, p: &str, content: &mut dyn Read) -> Result<()> {
        let dest = Path::new(p);
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(p.to_string()),
                _ => Error::Io(e),
            })?;
        std::io::copy(content, &mut file)?;
        Ok(())
    }

    fn put(&self, dest: &str, local_src: &Path) -> Result<()> {
        if !local_src.is_file() {
            return Err(Error::NotFound(local_src.display().to_string()));
        }
        let mut src = File::open(local_src)?;
        self.write(dest, &mut src)
    }
}
