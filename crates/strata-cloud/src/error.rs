use thiserror::Error;

/// Failures local to the object-store bridge
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid cloud path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;

impl From<CloudError> for strata_core::Error {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::ObjectStore(object_store::Error::NotFound { path, .. }) => {
                strata_core::Error::NotFound(path)
            }
            CloudError::ObjectStore(object_store::Error::AlreadyExists { path, .. }) => {
                strata_core::Error::AlreadyExists(path)
            }
            CloudError::Io(io_err) => strata_core::Error::Io(io_err),
            other => strata_core::Error::Storage(other.to_string()),
        }
    }
}
