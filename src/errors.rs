//! Error taxonomy for the status engine.
//!
//! Failures are either entry-local (absorbed into flags on the affected
//! entry, e.g. unreadable working-tree paths) or call-fatal (propagated as a
//! typed error to the caller). Nothing in this crate retries.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed object id string (wrong length or non-hex characters).
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    /// The given path does not exist on disk.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The given path exists but carries no repository.
    #[error("not a repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// The on-disk index data is malformed; retrying cannot fix this.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// An object referenced by a tree, commit or index entry is absent
    /// from the object database.
    #[error("object missing from database: {0}")]
    ObjectMissing(ObjectId),

    /// A loose object decoded cleanly but its payload is malformed.
    #[error("malformed object: {0}")]
    MalformedObject(String),

    /// A collaborator failed while the aggregator was driving it; carries
    /// the name of the failing stage.
    #[error("{stage} failed")]
    StoreFailure {
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// The caller abandoned the status query mid-scan.
    #[error("status computation cancelled")]
    Cancelled,

    #[error("library already initialized")]
    AlreadyInitialized,

    #[error("library has been shut down")]
    Shutdown,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach the name of the failing aggregator stage.
    ///
    /// Errors that already identify their origin precisely (corrupt index,
    /// cancellation, lifecycle faults, or an earlier stage wrap) pass
    /// through unchanged.
    pub fn at_stage(self, stage: &'static str) -> Self {
        match self {
            Error::CorruptIndex(_)
            | Error::Cancelled
            | Error::AlreadyInitialized
            | Error::Shutdown
            | Error::InvalidObjectId(_)
            | Error::NotFound(_)
            | Error::NotARepository(_)
            | Error::StoreFailure { .. } => self,
            other => Error::StoreFailure {
                stage,
                source: Box::new(other),
            },
        }
    }
}
