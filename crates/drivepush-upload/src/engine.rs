//! Upload engine
//!
//! The [`UploadEngine`] decides what to transfer, deduplicates against the
//! remote state, streams bytes through the store's chunked upload and
//! mirrors local directory trees onto remote folders.
//!
//! ## File Flow
//!
//! 1. Start hashing the file in the background
//! 2. Look for a same-named object under the first parent; skip the upload
//!    when its checksum matches the local one
//! 3. Transfer inside the retry loop, rewinding the file before each attempt
//! 4. Compare the returned checksum with the local one

use std::future::Future;
use std::io::SeekFrom;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use drivepush_core::domain::content_type;
use drivepush_core::domain::{
    calc_rate, format_size, MkdirRequest, ObjectMetadata, RemoteId, RemoteObject,
    StreamUploadRequest, TransferOutcome, UploadOutcome, UploadRequest,
};
use drivepush_core::ports::{IProgressSink, IRemoteStore, ISyncFolderPolicy, RemoteError};
use tokio::io::{AsyncRead, AsyncSeekExt};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::checksum::PendingChecksum;
use crate::folder::{create_folder, ensure_folder};
use crate::query::{find_objects, resolve_folder_path};
use crate::retry::{RetryPolicy, RetryState};
use crate::transfer;
use crate::UploadError;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Orchestrates uploads against a remote store
pub struct UploadEngine {
    /// Remote object store
    store: Arc<dyn IRemoteStore>,
    /// Decides which destination folders are off limits
    sync_policy: Arc<dyn ISyncFolderPolicy>,
    retry: RetryPolicy,
    /// Receives byte counts during transfers
    progress: Option<Arc<dyn IProgressSink>>,
}

impl std::fmt::Debug for UploadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadEngine")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl UploadEngine {
    /// Creates a new `UploadEngine`
    ///
    /// # Arguments
    /// * `store` - Remote object store (IRemoteStore)
    /// * `sync_policy` - Sync-managed folder predicate (ISyncFolderPolicy)
    /// * `retry` - Retry budget and delays
    pub fn new(
        store: Arc<dyn IRemoteStore>,
        sync_policy: Arc<dyn ISyncFolderPolicy>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            sync_policy,
            retry,
            progress: None,
        }
    }

    /// Report transfer progress to `sink`
    #[must_use]
    pub fn with_progress(mut self, sink: Arc<dyn IProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Largest chunk size this platform can buffer
    #[must_use]
    pub fn max_chunk_size() -> u64 {
        isize::MAX as u64 - 1
    }

    // ========================================================================
    // upload()
    // ========================================================================

    /// Upload a file, or a directory tree when `req.recursive` is set
    ///
    /// # Errors
    /// Policy violations are reported before any network call, except a
    /// sync-managed parent which needs the folder path lookup and the sync
    /// check; any other fatal error aborts the whole operation.
    #[instrument(skip(self, req), fields(path = %req.path.display()))]
    pub async fn upload(&self, req: &UploadRequest) -> Result<UploadOutcome, UploadError> {
        check_chunk_size(req.chunk_size)?;

        if !req.recursive {
            let metadata = tokio::fs::metadata(&req.path)
                .await
                .map_err(|e| UploadError::io("stat", &req.path, e))?;
            if metadata.is_dir() {
                return Err(UploadError::DirectoryWithoutRecursive {
                    path: req.path.clone(),
                });
            }
        }

        let mut req = req.clone();
        if let Some(folder_path) = req.folder_path.take() {
            let id = resolve_folder_path(self.store.as_ref(), &self.retry, &folder_path).await?;
            req.parents = vec![id];
        }
        if req.parents.is_empty() {
            req.parents.push(RemoteId::root());
        }

        self.check_sync_parents(&req.parents).await?;

        if req.recursive {
            if req.share {
                warn!("Sharing is not supported for recursive uploads, ignoring");
            }
            let started = Instant::now();
            let bytes = self.upload_tree(&req).await?;
            let rate = calc_rate(bytes, started.elapsed());
            info!(
                "Uploaded {} at {}/s",
                format_size(bytes),
                format_size(rate)
            );
            return Ok(UploadOutcome::Tree { bytes, rate });
        }

        let outcome = self.upload_file(&req).await?;

        if req.share {
            self.share(&outcome.object).await?;
        }

        if req.delete_source {
            remove_file(&req.path).await?;
        }

        Ok(UploadOutcome::File(outcome))
    }

    /// Fail when any destination parent belongs to a sync job
    async fn check_sync_parents(&self, parents: &[RemoteId]) -> Result<(), UploadError> {
        for parent in parents {
            let operation = format!("check sync folder {parent}");
            let managed = self
                .retry
                .run(&operation, || self.sync_policy.is_sync_managed(parent))
                .await?;
            if managed {
                return Err(UploadError::SyncManagedParent(parent.clone()));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Recursive uploads
    // ========================================================================

    /// Entry point of a recursive upload; follows a top-level symlink
    async fn upload_tree(&self, req: &UploadRequest) -> Result<u64, UploadError> {
        let metadata = tokio::fs::metadata(&req.path)
            .await
            .map_err(|e| UploadError::io("stat", &req.path, e))?;

        if metadata.is_dir() {
            let mut top = req.clone();
            top.name = None;
            self.upload_directory(&top).await
        } else {
            self.upload_tree_file(req).await
        }
    }

    /// Mirror a directory onto a remote folder under `req.parents[0]`
    ///
    /// # Returns
    /// Total size of the files below the directory
    fn upload_directory<'a>(&'a self, req: &'a UploadRequest) -> BoxFuture<'a, Result<u64, UploadError>> {
        Box::pin(async move {
            let name = local_name(&req.path).await?;
            let parent = first_parent(&req.parents);

            let (folder_id, created) = ensure_folder(
                self.store.as_ref(),
                &self.retry,
                &parent,
                &name,
                req.description.as_deref(),
            )
            .await?;
            if !created {
                info!(id = %folder_id, "Using existing directory {name}");
            }

            let entries = read_dir_sorted(&req.path).await?;
            let mut total = 0u64;
            for (path, file_type) in entries {
                let child = req.for_child(&path, folder_id.clone());
                if file_type.is_dir() {
                    total += self.upload_directory(&child).await?;
                } else if file_type.is_file() {
                    total += self.upload_tree_file(&child).await?;
                } else {
                    warn!(path = %path.display(), "Skipping entry that is neither a file nor a directory");
                }
            }

            // Fails while skipped entries remain, which aborts the upload
            if req.delete_source {
                tokio::fs::remove_dir(&req.path)
                    .await
                    .map_err(|e| UploadError::io("remove directory", &req.path, e))?;
                info!("Removed {}", req.path.display());
            }

            Ok(total)
        })
    }

    async fn upload_tree_file(&self, req: &UploadRequest) -> Result<u64, UploadError> {
        let outcome = self.upload_file(req).await?;
        if req.delete_source {
            remove_file(&req.path).await?;
        }
        Ok(outcome.object.size)
    }

    // ========================================================================
    // Single file
    // ========================================================================

    /// Upload one regular file, skipping it when an identical copy exists
    ///
    /// # Returns
    /// The remote object with the rate of the successful attempt, or the
    /// existing object flagged as skipped
    ///
    /// # Errors
    /// `VerificationFailed` when the store reports a different checksum than
    /// the local one; this is never retried.
    #[instrument(skip(self, req), fields(path = %req.path.display()))]
    pub async fn upload_file(&self, req: &UploadRequest) -> Result<TransferOutcome, UploadError> {
        let mut local_checksum = PendingChecksum::spawn(&req.path);

        let mut file = tokio::fs::File::open(&req.path)
            .await
            .map_err(|e| UploadError::io("open", &req.path, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| UploadError::io("stat", &req.path, e))?
            .len();

        let name = match &req.name {
            Some(name) => name.clone(),
            None => local_name(&req.path).await?,
        };
        let mime = req
            .content_type
            .clone()
            .or_else(|| content_type::guess(Path::new(&name)).map(str::to_string));
        let metadata = ObjectMetadata::file(name.as_str(), req.description.clone(), mime);

        let parents = if req.parents.is_empty() {
            vec![RemoteId::root()]
        } else {
            req.parents.clone()
        };

        let candidates: Vec<RemoteObject> =
            find_objects(self.store.as_ref(), &self.retry, &parents[0], &name, false)
                .await?
                .into_iter()
                .filter(|object| !object.is_folder())
                .collect();
        if !candidates.is_empty() {
            let local = local_checksum.wait().await?;
            let count = candidates.len();
            if let Some(existing) = candidates
                .into_iter()
                .find(|object| object.checksum.as_ref() == Some(local))
            {
                info!(
                    "Skipped {} ({}), already exists",
                    req.path.display(),
                    existing.id
                );
                return Ok(TransferOutcome::skipped(existing));
            }
            debug!(count, "Same-named objects differ, uploading a new one");
        }

        info!("Uploading {}", req.path.display());

        let operation = format!("upload {}", req.path.display());
        let mut state = RetryState::default();
        let (object, elapsed) = loop {
            file.seek(SeekFrom::Start(0))
                .await
                .map_err(|e| UploadError::io("rewind", &req.path, e))?;

            let (mut reader, deadline) =
                transfer::instrument(&mut file, self.progress.clone(), size, req.timeout);
            let started = Instant::now();

            let attempt = deadline
                .guard(self.store.create_object_with_media(
                    &metadata,
                    &parents,
                    &mut reader,
                    Some(size),
                    req.chunk_size,
                ))
                .await
                .unwrap_or_else(|idle| Err(RemoteError::Timeout(idle.to_string())));

            match attempt {
                Ok(object) => break (object, started.elapsed()),
                Err(err) => {
                    let delay = self.retry.on_failure(&mut state, &operation, err)?;
                    tokio::time::sleep(delay).await;
                }
            }
        };

        let local = local_checksum.wait().await?;
        if object.checksum.as_ref() != Some(local) {
            return Err(UploadError::VerificationFailed {
                id: object.id.clone(),
                path: req.path.clone(),
                local: local.clone(),
                remote: object.checksum.clone(),
            });
        }

        let rate = calc_rate(size, elapsed);
        info!(
            "Uploaded {} at {}/s, total {}",
            object.id,
            format_size(rate),
            format_size(object.size)
        );
        Ok(TransferOutcome::transferred(object, size, rate))
    }

    // ========================================================================
    // Streams
    // ========================================================================

    /// Upload from a non-seekable source in a single attempt
    ///
    /// No existence check and no checksum verification.
    ///
    /// # Errors
    /// `StreamTimeout` when the source stalls for `req.timeout`; any store
    /// error fails immediately.
    #[instrument(skip(self, req, source), fields(name = %req.name))]
    pub async fn upload_stream<R>(
        &self,
        req: &StreamUploadRequest,
        source: R,
    ) -> Result<TransferOutcome, UploadError>
    where
        R: AsyncRead + Send + Unpin,
    {
        check_chunk_size(req.chunk_size)?;

        let parents = if req.parents.is_empty() {
            vec![RemoteId::root()]
        } else {
            req.parents.clone()
        };
        let mime = req
            .content_type
            .clone()
            .or_else(|| content_type::guess(Path::new(&req.name)).map(str::to_string));
        let metadata = ObjectMetadata::file(req.name.as_str(), req.description.clone(), mime);

        let (mut reader, deadline) =
            transfer::instrument(source, self.progress.clone(), 0, req.timeout);
        let started = Instant::now();

        let result = deadline
            .guard(self.store.create_object_with_media(
                &metadata,
                &parents,
                &mut reader,
                None,
                req.chunk_size,
            ))
            .await;

        let object = match result {
            Ok(Ok(object)) => object,
            Ok(Err(err)) => {
                return Err(UploadError::Remote {
                    operation: format!("upload stream '{}'", req.name),
                    source: err,
                })
            }
            Err(idle) => return Err(UploadError::StreamTimeout(idle.0)),
        };

        let bytes = reader.transferred();
        let rate = calc_rate(bytes, started.elapsed());
        info!(
            "Uploaded {} at {}/s, total {}",
            object.id,
            format_size(rate),
            format_size(object.size)
        );

        if req.share {
            self.share(&object).await?;
        }

        Ok(TransferOutcome::transferred(object, bytes, rate))
    }

    // ========================================================================
    // mkdir / share
    // ========================================================================

    /// Create a folder without checking for an existing one
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn mkdir(&self, req: &MkdirRequest) -> Result<RemoteObject, UploadError> {
        let parents = if req.parents.is_empty() {
            vec![RemoteId::root()]
        } else {
            req.parents.clone()
        };
        let metadata = ObjectMetadata::folder(req.name.as_str(), req.description.clone());
        let folder = create_folder(self.store.as_ref(), &self.retry, &metadata, &parents).await?;
        info!("Directory {} created", folder.id);
        Ok(folder)
    }

    /// Make an object readable by anyone with the link
    async fn share(&self, object: &RemoteObject) -> Result<(), UploadError> {
        let operation = format!("share {}", object.id);
        self.retry
            .run(&operation, || self.store.set_public_readable(&object.id))
            .await?;

        match &object.web_content_link {
            Some(link) => info!("File is readable by anyone at {link}"),
            None => info!(id = %object.id, "File is readable by anyone with the link"),
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn check_chunk_size(chunk_size: u64) -> Result<(), UploadError> {
    let max = UploadEngine::max_chunk_size();
    if chunk_size > max {
        return Err(UploadError::ChunkSizeTooLarge {
            requested: chunk_size,
            max,
        });
    }
    Ok(())
}

fn first_parent(parents: &[RemoteId]) -> RemoteId {
    parents.first().cloned().unwrap_or_else(RemoteId::root)
}

/// Final path component, canonicalising paths such as `.` first
async fn local_name(path: &Path) -> Result<String, UploadError> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }

    let canonical = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| UploadError::io("resolve", path, e))?;
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            UploadError::io(
                "name",
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path has no final component",
                ),
            )
        })
}

/// Directory entries with their (unfollowed) file types, sorted by name
async fn read_dir_sorted(
    dir: &Path,
) -> Result<Vec<(std::path::PathBuf, std::fs::FileType)>, UploadError> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| UploadError::io("read directory", dir, e))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| UploadError::io("read directory", dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| UploadError::io("stat", entry.path(), e))?;
        entries.push((entry.path(), file_type));
    }

    entries.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(entries)
}

async fn remove_file(path: &Path) -> Result<(), UploadError> {
    tokio::fs::remove_file(path)
        .await
        .map_err(|e| UploadError::io("remove", path, e))?;
    info!("Removed {}", path.display());
    Ok(())
}
