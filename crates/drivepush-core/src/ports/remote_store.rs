//! Remote object store port
//!
//! This module defines the [`IRemoteStore`] trait, the boundary between the
//! upload engine and the cloud drive's REST API, together with the
//! [`RemoteError`] type every adapter maps its failures into.

use thiserror::Error;
use tokio::io::AsyncRead;

use crate::domain::{ObjectMetadata, ObjectQuery, RemoteId, RemoteObject, SharedDrive};

// ============================================================================
// RemoteError
// ============================================================================

/// Failure reported by a remote store adapter
///
/// Variants carry enough information for the engine to decide between
/// retrying and giving up.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP 429, or 403 with a rate limit reason
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// HTTP 500, 502, 503 or 504
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The transfer stalled or the transport timed out
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Connection-level failure other than a timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Reading the media source failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// IRemoteStore trait
// ============================================================================

/// Port trait for the remote object store
///
/// Implementations perform a single request per call. Retrying is the
/// engine's job, so adapters must not retry internally.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Create an object without content (used for folders)
    ///
    /// # Arguments
    /// * `metadata` - Name, description and kind of the new object
    /// * `parents` - Folders the object is created in
    ///
    /// # Returns
    /// The created object as reported by the store
    async fn create_object(
        &self,
        metadata: &ObjectMetadata,
        parents: &[RemoteId],
    ) -> Result<RemoteObject, RemoteError>;

    /// Create an object and upload its content in chunks
    ///
    /// # Arguments
    /// * `metadata` - Name, description and content type
    /// * `parents` - Folders the object is created in
    /// * `media` - Content source, read to the end
    /// * `size_hint` - Total size when known in advance
    /// * `chunk_size` - Bytes per transfer segment, 0 for a single request
    ///
    /// # Returns
    /// The created object including its checksum
    async fn create_object_with_media(
        &self,
        metadata: &ObjectMetadata,
        parents: &[RemoteId],
        media: &mut (dyn AsyncRead + Send + Unpin),
        size_hint: Option<u64>,
        chunk_size: u64,
    ) -> Result<RemoteObject, RemoteError>;

    /// List objects matching a name and parent filter
    async fn query_objects(&self, query: &ObjectQuery) -> Result<Vec<RemoteObject>, RemoteError>;

    /// List every top-level shared drive visible to the user
    async fn list_shared_drives(&self) -> Result<Vec<SharedDrive>, RemoteError>;

    /// Grant read access to anyone with the link
    async fn set_public_readable(&self, id: &RemoteId) -> Result<(), RemoteError>;
}
