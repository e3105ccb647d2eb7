//! Remote query service
//!
//! Name lookups inside a parent folder and resolution of human-readable
//! destination paths such as `My Drive/Reports/2024`.

use drivepush_core::domain::{ObjectQuery, RemoteId, RemoteObject};
use drivepush_core::ports::IRemoteStore;
use tracing::debug;

use crate::retry::RetryPolicy;
use crate::UploadError;

/// Find every object called `name` directly under `parent`
///
/// # Arguments
/// * `want_folder` - Only match folders
///
/// # Returns
/// All matches in the order the store reported them, possibly empty
pub async fn find_objects(
    store: &dyn IRemoteStore,
    retry: &RetryPolicy,
    parent: &RemoteId,
    name: &str,
    want_folder: bool,
) -> Result<Vec<RemoteObject>, UploadError> {
    let query = ObjectQuery::new(parent.clone(), name, want_folder);
    let operation = format!("find '{name}' in {parent}");
    let matches = retry
        .run(&operation, || store.query_objects(&query))
        .await?;

    debug!(parent = %parent, name, matches = matches.len(), "Queried remote objects");
    Ok(matches)
}

/// Find an object called `name` directly under `parent`
///
/// # Returns
/// The first match, or `None` when nothing matched
pub async fn find_object(
    store: &dyn IRemoteStore,
    retry: &RetryPolicy,
    parent: &RemoteId,
    name: &str,
    want_folder: bool,
) -> Result<Option<RemoteObject>, UploadError> {
    Ok(find_objects(store, retry, parent, name, want_folder)
        .await?
        .into_iter()
        .next())
}

/// Resolve a `/`-separated folder path to the id of its last folder
///
/// The first segment is either "My Drive" (spaces and case ignored) or the
/// exact name of a shared drive. Empty segments are ignored and an empty
/// path resolves to the drive root.
///
/// # Errors
/// `TopLevelFolderNotFound` or `FolderNotFound` when a segment has no match
pub async fn resolve_folder_path(
    store: &dyn IRemoteStore,
    retry: &RetryPolicy,
    path: &str,
) -> Result<RemoteId, UploadError> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    let Some(first) = segments.next() else {
        return Ok(RemoteId::root());
    };

    let mut current = if is_my_drive(first) {
        RemoteId::root()
    } else {
        let drives = retry
            .run("list shared drives", || store.list_shared_drives())
            .await?;
        drives
            .into_iter()
            .find(|drive| drive.name == first)
            .map(|drive| drive.id)
            .ok_or_else(|| UploadError::TopLevelFolderNotFound(first.to_string()))?
    };

    for segment in segments {
        let folder = find_object(store, retry, &current, segment, true)
            .await?
            .ok_or_else(|| UploadError::FolderNotFound(segment.to_string()))?;
        current = folder.id;
    }

    debug!(path, id = %current, "Resolved folder path");
    Ok(current)
}

fn is_my_drive(segment: &str) -> bool {
    segment.replace(' ', "").eq_ignore_ascii_case("mydrive")
}
