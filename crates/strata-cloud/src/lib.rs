//! Cloud object-store backend for strata
//!
//! [`ObjectFilesystem`] serves `scheme://bucket/key` references out of an
//! [`object_store::ObjectStore`], bridging that async API to the synchronous
//! [`Filesystem`] trait through a shared Tokio runtime. The store's key
//! namespace is flat; directory semantics (recursive list, prefix delete)
//! are synthesized by prefix expansion.
//!
//! Several scheme spellings can denote the same physical store (`s3`,
//! `s3n`, `s3a`); listings are re-qualified with the scheme the query used,
//! so callers get back references in the spelling they asked with.

pub mod error;
mod reader;
mod runtime;

pub use error::CloudError;
pub use reader::ObjectReader;

use std::io::{Read, Write};
use std::path::Path as LocalPath;
use std::sync::Arc;

use futures_util::StreamExt;
use glob::Pattern;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore, PutPayload};
use tracing::debug;
use url::Url;

use strata_core::{path, ByteStream, Error, Filesystem, PathIter, PathRef, Result};

/// Scheme spellings that all mean "the S3 object-store family"
pub const S3_SCHEMES: &[&str] = &["s3", "s3n", "s3a"];

/// Location of a cloud store: scheme plus bucket/container
#[derive(Debug, Clone)]
pub struct StoreLocation {
    pub scheme: String,
    pub bucket: String,
}

impl StoreLocation {
    /// Parse a store URL like `s3://bucket` (any key part is ignored)
    pub fn parse(url: &str) -> error::Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| CloudError::InvalidPath(format!("invalid URL: {}", e)))?;

        let scheme = parsed.scheme().to_string();
        if !S3_SCHEMES.contains(&scheme.as_str()) {
            return Err(CloudError::InvalidPath(format!(
                "unsupported scheme: {}",
                scheme
            )));
        }

        let bucket = parsed
            .host_str()
            .ok_or_else(|| CloudError::InvalidPath("missing bucket name".to_string()))?
            .to_string();

        Ok(StoreLocation { scheme, bucket })
    }
}

/// Backend for a cloud object store's flat key namespace
pub struct ObjectFilesystem {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    schemes: Vec<String>,
}

/// Result of expanding a path or glob against the key namespace
struct Matched {
    prefix_uri: String,
    globbed: bool,
    entries: Vec<ObjectMeta>,
}

impl ObjectFilesystem {
    /// Wrap an existing store bound to `bucket`, claiming the given scheme
    /// spellings.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: &str, schemes: &[&str]) -> Self {
        ObjectFilesystem {
            store,
            bucket: bucket.to_string(),
            schemes: schemes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build an S3-backed filesystem from the environment's credentials
    pub fn from_url(url: &str) -> Result<Self> {
        let location = StoreLocation::parse(url)?;
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(&location.bucket)
            .build()
            .map_err(CloudError::ObjectStore)?;
        Ok(Self::new(Arc::new(store), &location.bucket, S3_SCHEMES))
    }

    /// Split a claimed reference into its `scheme://bucket` prefix and its
    /// key (or key glob) with the leading slash removed.
    fn split(&self, p: &str) -> Result<(String, String)> {
        match path::parse(p) {
            PathRef::Remote { scheme, host, path }
                if self.schemes.contains(&scheme) && host == self.bucket =>
            {
                let prefix = format!("{}://{}", scheme, host);
                Ok((prefix, path.trim_start_matches('/').to_string()))
            }
            _ => Err(Error::Routing(p.to_string())),
        }
    }

    fn list_all(&self, prefix: Option<&ObjectPath>) -> error::Result<Vec<ObjectMeta>> {
        let store = Arc::clone(&self.store);
        runtime::get_runtime().block_on(async move {
            let mut entries = store.list(prefix);
            let mut out = Vec::new();
            while let Some(meta) = entries.next().await {
                out.push(meta?);
            }
            Ok(out)
        })
    }

    /// Expand `path_glob` against the store. A bare path matches its exact
    /// key plus everything under it; a glob matches whole references, with
    /// wildcards free to cross key separators (directory hierarchy here is
    /// synthetic anyway).
    fn matched(&self, path_glob: &str) -> Result<Matched> {
        let (prefix_uri, key_glob) = self.split(path_glob)?;
        let literal = literal_prefix(&key_glob);
        let globbed = literal.len() != key_glob.len();
        let pattern = if globbed {
            Some(Pattern::new(path_glob)?)
        } else {
            None
        };

        // list under the deepest separator-terminated prefix we can trust
        let dir = literal.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        let list_prefix = if dir.is_empty() {
            None
        } else {
            Some(ObjectPath::from(dir))
        };
        let all = self.list_all(list_prefix.as_ref()).map_err(Error::from)?;

        let trailing_slash = key_glob.ends_with('/');
        let bare = key_glob.trim_end_matches('/').to_string();

        let entries = all
            .into_iter()
            .filter(|meta| {
                let key = meta.location.as_ref();
                match &pattern {
                    Some(p) => p.matches(&format!("{}/{}", prefix_uri, key)),
                    None => {
                        bare.is_empty()
                            || (!trailing_slash && key == bare.as_str())
                            || key.starts_with(&format!("{}/", bare))
                    }
                }
            })
            .collect();

        Ok(Matched {
            prefix_uri,
            globbed,
            entries,
        })
    }

    fn head_opt(&self, location: &ObjectPath) -> Result<Option<ObjectMeta>> {
        let store = Arc::clone(&self.store);
        let outcome = runtime::get_runtime().block_on(async move { store.head(location).await });
        match outcome {
            Ok(meta) => Ok(Some(meta)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(CloudError::from(e).into()),
        }
    }

    fn block_put(&self, location: &ObjectPath, bytes: Vec<u8>) -> Result<()> {
        let store = Arc::clone(&self.store);
        runtime::get_runtime()
            .block_on(async move { store.put(location, PutPayload::from(bytes)).await })
            .map_err(|e| Error::from(CloudError::from(e)))?;
        Ok(())
    }
}

impl Filesystem for ObjectFilesystem {
    fn can_handle(&self, p: &str) -> bool {
        matches!(
            path::parse(p),
            PathRef::Remote { scheme, host, .. }
                if self.schemes.contains(&scheme) && host == self.bucket
        )
    }

    fn ls(&self, path_glob: &str) -> Result<PathIter> {
        let Matched {
            prefix_uri,
            entries,
            ..
        } = self.matched(path_glob)?;
        let items: Vec<Result<String>> = entries
            .into_iter()
            .map(|meta| Ok(format!("{}/{}", prefix_uri, meta.location)))
            .collect();
        Ok(Box::new(items.into_iter()))
    }

    fn du(&self, path_glob: &str) -> Result<u64> {
        let matched = self.matched(path_glob)?;
        if matched.entries.is_empty() && !matched.globbed {
            return Err(Error::NotFound(path_glob.to_string()));
        }
        Ok(matched.entries.iter().map(|meta| meta.size as u64).sum())
    }

    fn exists(&self, path_glob: &str) -> Result<bool> {
        Ok(!self.matched(path_glob)?.entries.is_empty())
    }

    fn mkdir(&self, _p: &str) -> Result<()> {
        // the namespace is flat; "directories" exist once keys sit under them
        Ok(())
    }

    fn rm(&self, path_glob: &str) -> Result<()> {
        let matched = self.matched(path_glob)?;
        let store = Arc::clone(&self.store);
        runtime::get_runtime()
            .block_on(async move {
                for meta in &matched.entries {
                    debug!("delete {}", meta.location);
                    store.delete(&meta.location).await?;
                }
                Ok::<_, object_store::Error>(())
            })
            .map_err(|e| Error::from(CloudError::from(e)))?;
        Ok(())
    }

    fn touchz(&self, p: &str) -> Result<()> {
        let (_, key) = self.split(p)?;
        let location = ObjectPath::from(key.as_str());
        match self.head_opt(&location)? {
            Some(meta) if meta.size > 0 => Err(Error::AlreadyExists(p.to_string())),
            Some(_) => Ok(()),
            None => self.block_put(&location, Vec::new()),
        }
    }

    fn open(&self, p: &str) -> Result<ByteStream> {
        let (_, key) = self.split(p)?;
        let location = ObjectPath::from(key.as_str());
        let store = Arc::clone(&self.store);
        let stream = runtime::get_runtime()
            .block_on(async move { store.get(&location).await })
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => Error::NotFound(p.to_string()),
                other => CloudError::from(other).into(),
            })?
            .into_stream();
        Ok(Box::new(ObjectReader::new(stream)))
    }

    fn write(&self, p: &str, content: &mut dyn Read) -> Result<()> {
        // spool to a scratch file and upload that; the scratch file is
        // removed on every exit path when `spool` drops
        let mut spool = tempfile::NamedTempFile::new()?;
        std::io::copy(content, &mut spool)?;
        spool.flush()?;
        self.put(p, spool.path())
    }

    fn put(&self, dest: &str, local_src: &LocalPath) -> Result<()> {
        if !local_src.is_file() {
            return Err(Error::NotFound(local_src.display().to_string()));
        }
        let (_, key) = self.split(dest)?;
        let location = ObjectPath::from(key.as_str());
        if self.head_opt(&location)?.is_some() {
            return Err(Error::AlreadyExists(dest.to_string()));
        }
        let bytes = std::fs::read(local_src)?;
        debug!("put {} ({} bytes)", dest, bytes.len());
        self.block_put(&location, bytes)
    }
}

fn literal_prefix(glob: &str) -> &str {
    match glob.find(|c| matches!(c, '*' | '?' | '[')) {
        Some(idx) => &glob[..idx],
        None => glob,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn sample() -> ObjectFilesystem {
        ObjectFilesystem::new(Arc::new(InMemory::new()), "walrus", S3_SCHEMES)
    }

    #[test]
    fn test_can_handle_schemes_and_bucket() {
        let fs = sample();
        assert!(fs.can_handle("s3://walrus/key"));
        assert!(fs.can_handle("s3n://walrus/key"));
        assert!(fs.can_handle("S3N://walrus/key"));

        assert!(!fs.can_handle("s3://other-bucket/key"));
        assert!(!fs.can_handle("hdfs://walrus/key"));
        assert!(!fs.can_handle("/local/path"));
    }

    #[test]
    fn test_split_strips_leading_slash() {
        let fs = sample();
        let (prefix, key) = fs.split("s3n://walrus/data/foo").unwrap();
        assert_eq!(prefix, "s3n://walrus");
        assert_eq!(key, "data/foo");
    }

    #[test]
    fn test_split_rejects_foreign_paths() {
        let fs = sample();
        assert!(matches!(
            fs.split("gs://walrus/data"),
            Err(Error::Routing(_))
        ));
    }

    #[test]
    fn test_store_location_parse() {
        let loc = StoreLocation::parse("s3://my-bucket/ignored/key").unwrap();
        assert_eq!(loc.scheme, "s3");
        assert_eq!(loc.bucket, "my-bucket");

        assert!(StoreLocation::parse("http://not-a-store/x").is_err());
        assert!(StoreLocation::parse("s3://").is_err());
        assert!(StoreLocation::parse("/local/path").is_err());
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(literal_prefix("data/foo"), "data/foo");
        assert_eq!(literal_prefix("data/*"), "data/");
        assert_eq!(literal_prefix("da?a"), "da");
        assert_eq!(literal_prefix("[ab]/x"), "");
    }
}
