//! Strata - one interface over heterogeneous storage backends
//!
//! This crate defines the [`Filesystem`] trait (list, remove, make-directory,
//! existence, size, streaming read, upload, create-empty), the syntactic
//! [path classifier](path) that routes between local paths and
//! `scheme://host/path` references, the [`CompositeFilesystem`] dispatcher
//! that picks the first backend claiming a path, and the [`LocalFilesystem`]
//! backend. Remote backends (cluster CLI, cloud object store) live in their
//! own crates and implement the same trait.

pub mod composite;
pub mod error;
pub mod fs;
pub mod local;
pub mod path;
pub mod stream;

pub use composite::CompositeFilesystem;
pub use error::{Error, Result};
pub use fs::{ByteStream, Filesystem, PathIter};
pub use local::LocalFilesystem;
pub use path::PathRef;
