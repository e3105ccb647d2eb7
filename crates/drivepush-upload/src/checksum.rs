//! Checksum service
//!
//! Hashes local files with MD5, the digest the store reports as
//! `md5Checksum`. The file is always opened separately from the upload
//! stream so hashing and transfer never share a reader.

use std::io::Read;
use std::path::{Path, PathBuf};

use drivepush_core::domain::Checksum;
use md5::{Digest, Md5};
use tokio::sync::oneshot;
use tracing::{debug, instrument};

use crate::UploadError;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Compute the MD5 checksum of a local file
///
/// Runs on the blocking pool.
///
/// # Errors
/// Returns `UploadError::Io` if the file cannot be opened or read
#[instrument(level = "debug")]
pub async fn checksum(path: &Path) -> Result<Checksum, UploadError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || hash_file(&owned))
        .await
        .map_err(|_| UploadError::ChecksumUnavailable {
            path: path.to_path_buf(),
        })?
}

fn hash_file(path: &Path) -> Result<Checksum, UploadError> {
    let mut file = std::fs::File::open(path).map_err(|e| UploadError::io("open", path, e))?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let n = file
            .read(&mut buffer)
            .map_err(|e| UploadError::io("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(Checksum::from_digest(&hasher.finalize()))
}

/// A checksum being computed in the background
///
/// Started when a file upload begins; the engine only waits for it when a
/// same-named remote object exists and after the transfer. The first
/// resolved value is cached for later calls.
#[derive(Debug)]
pub struct PendingChecksum {
    path: PathBuf,
    receiver: Option<oneshot::Receiver<Result<Checksum, UploadError>>>,
    value: Option<Checksum>,
}

impl PendingChecksum {
    /// Start hashing `path` on the blocking pool
    pub fn spawn(path: &Path) -> Self {
        let (tx, rx) = oneshot::channel();
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let result = hash_file(&owned);
            // Receiver gone means the upload was abandoned
            let _ = tx.send(result);
        });

        Self {
            path: path.to_path_buf(),
            receiver: Some(rx),
            value: None,
        }
    }

    /// Wait for the checksum
    ///
    /// # Errors
    /// Returns the hashing error on the first call that observes it, and
    /// `UploadError::ChecksumUnavailable` if the task vanished or already
    /// failed
    pub async fn wait(&mut self) -> Result<&Checksum, UploadError> {
        if self.value.is_none() {
            let receiver = self
                .receiver
                .take()
                .ok_or_else(|| UploadError::ChecksumUnavailable {
                    path: self.path.clone(),
                })?;
            let result = receiver
                .await
                .map_err(|_| UploadError::ChecksumUnavailable {
                    path: self.path.clone(),
                })?;
            let checksum = result?;
            debug!(path = %self.path.display(), checksum = %checksum, "Local checksum ready");
            self.value = Some(checksum);
        }

        self.value
            .as_ref()
            .ok_or_else(|| UploadError::ChecksumUnavailable {
                path: self.path.clone(),
            })
    }
}
