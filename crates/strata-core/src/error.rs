//! Error types shared by every storage backend

use thiserror::Error;

/// Errors surfaced by filesystem operations
#[derive(Error, Debug)]
pub enum Error {
    /// No registered backend claims the path
    #[error("no filesystem handles path: {0}")]
    Routing(String),

    /// External tool exited with an unacceptable status/stderr combination
    #[error("command {argv:?} exited with status {status}")]
    Command {
        /// Exit status of the subprocess (-1 if killed by a signal)
        status: i32,
        /// Full argument vector of the invocation
        argv: Vec<String>,
    },

    /// Tool output did not match any recognized line shape
    #[error("could not parse tool output line: {line:?}")]
    Parse {
        /// The offending line, verbatim
        line: String,
    },

    /// Operation targeted a path that does not exist
    #[error("path does not exist: {0}")]
    NotFound(String),

    /// Write or upload targeted an existing destination
    #[error("destination already exists: {0}")]
    AlreadyExists(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure with no finer classification
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(err.into())
    }
}

impl From<glob::PatternError> for Error {
    fn from(err: glob::PatternError) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io_err) => io_err,
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
