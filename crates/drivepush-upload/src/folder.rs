//! Folder ensurer

use drivepush_core::domain::{ObjectMetadata, RemoteId, RemoteObject};
use drivepush_core::ports::IRemoteStore;
use tracing::{debug, info};

use crate::query::find_object;
use crate::retry::RetryPolicy;
use crate::UploadError;

/// Find a folder called `name` under `parent`, creating it when missing
///
/// Lookup and creation are separate requests, so a concurrent creator can
/// leave two folders with the same name. That outcome is accepted.
///
/// # Returns
/// The folder id and whether it was created by this call
pub async fn ensure_folder(
    store: &dyn IRemoteStore,
    retry: &RetryPolicy,
    parent: &RemoteId,
    name: &str,
    description: Option<&str>,
) -> Result<(RemoteId, bool), UploadError> {
    if let Some(existing) = find_object(store, retry, parent, name, true).await? {
        debug!(id = %existing.id, name, "Reusing existing folder");
        return Ok((existing.id, false));
    }

    let metadata = ObjectMetadata::folder(name, description.map(str::to_string));
    let created = create_folder(store, retry, &metadata, std::slice::from_ref(parent)).await?;
    info!(id = %created.id, name, "Created folder");
    Ok((created.id, true))
}

/// Create a folder without checking for an existing one
pub async fn create_folder(
    store: &dyn IRemoteStore,
    retry: &RetryPolicy,
    metadata: &ObjectMetadata,
    parents: &[RemoteId],
) -> Result<RemoteObject, UploadError> {
    let operation = format!("create folder '{}'", metadata.name);
    retry
        .run(&operation, || store.create_object(metadata, parents))
        .await
}
