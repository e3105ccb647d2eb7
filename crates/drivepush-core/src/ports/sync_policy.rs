//! Sync-managed folder predicate

use crate::domain::RemoteId;

use super::remote_store::RemoteError;

/// Decides whether a destination folder is owned by a sync job
///
/// Plain uploads into such folders are refused.
#[async_trait::async_trait]
pub trait ISyncFolderPolicy: Send + Sync {
    /// Returns true when `id` is a sync-managed folder
    ///
    /// # Errors
    /// Returns the store's error when the folder cannot be inspected
    async fn is_sync_managed(&self, id: &RemoteId) -> Result<bool, RemoteError>;
}

/// Policy for deployments without sync folders
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSyncFolders;

#[async_trait::async_trait]
impl ISyncFolderPolicy for NoSyncFolders {
    async fn is_sync_managed(&self, _id: &RemoteId) -> Result<bool, RemoteError> {
        Ok(false)
    }
}
