//! drivepush Upload - Upload engine
//!
//! Provides:
//! - Deduplicated single-file uploads with checksum verification
//! - Recursive directory mirroring onto remote folders
//! - Stream uploads from non-seekable sources
//! - Bounded, fixed-delay retries around every remote call
//!
//! ## Modules
//!
//! - [`engine`] - Orchestrator exposing `upload`, `upload_stream` and `mkdir`
//! - [`retry`] - Failure classification and retry loop
//! - [`checksum`] - Background MD5 of local files
//! - [`transfer`] - Progress reporting and idle deadline for transfers
//! - [`query`] - Name lookups and folder path resolution
//! - [`folder`] - Find-or-create of remote folders

pub mod checksum;
pub mod engine;
pub mod folder;
pub mod query;
pub mod retry;
pub mod transfer;

pub use engine::UploadEngine;
pub use retry::{ErrorClass, RetryPolicy};

use std::path::PathBuf;
use std::time::Duration;

use drivepush_core::domain::{Checksum, RemoteId};
use drivepush_core::ports::RemoteError;
use thiserror::Error;

/// Errors that can occur during upload operations
#[derive(Debug, Error)]
pub enum UploadError {
    /// A retryable failure persisted past the retry budget
    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: RemoteError,
    },

    /// The store rejected the request with a non-retryable error
    #[error("{operation} failed: {source}")]
    Remote {
        operation: String,
        #[source]
        source: RemoteError,
    },

    /// Local filesystem failure
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The uploaded content does not match the local file
    #[error(
        "Failed to verify uploaded file {id} from {}, local checksum {local}, remote checksum {}",
        .path.display(),
        .remote.as_ref().map_or("<none>", Checksum::as_str)
    )]
    VerificationFailed {
        id: RemoteId,
        path: PathBuf,
        local: Checksum,
        remote: Option<Checksum>,
    },

    /// The background checksum task failed or vanished
    #[error("Checksum unavailable for {}", .path.display())]
    ChecksumUnavailable { path: PathBuf },

    #[error("{0} is a sync directory, use 'sync upload' instead")]
    SyncManagedParent(RemoteId),

    #[error("Chunk size is too big, max chunk size for this computer is {max} (requested {requested})")]
    ChunkSizeTooLarge { requested: u64, max: u64 },

    #[error("'{}' is a directory, use --recursive to upload directories", .path.display())]
    DirectoryWithoutRecursive { path: PathBuf },

    #[error("No top level folder matched name {0}")]
    TopLevelFolderNotFound(String),

    #[error("No folders matched name {0}")]
    FolderNotFound(String),

    /// A stream produced no data for the configured timeout
    #[error("Failed to upload file: timeout, no data was transferred for {0:?}")]
    StreamTimeout(Duration),
}

impl UploadError {
    /// Wrap an I/O error with the failed action and path
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
