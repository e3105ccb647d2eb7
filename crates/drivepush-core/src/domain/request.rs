//! Upload, stream and mkdir requests

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::newtypes::RemoteId;

/// Default transfer segment size (8 MiB)
pub const DEFAULT_CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Default per-attempt idle timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Request to upload a local file or directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Local file or directory
    pub path: PathBuf,
    /// Destination name; defaults to the local base name
    pub name: Option<String>,
    pub description: Option<String>,
    /// Content type override; otherwise guessed from the extension
    pub content_type: Option<String>,
    /// Destination parents; empty means the drive root
    pub parents: Vec<RemoteId>,
    /// Human-readable destination such as `My Drive/Reports`; overrides `parents`
    pub folder_path: Option<String>,
    /// Bytes per transfer segment
    pub chunk_size: u64,
    /// Abort an attempt when no byte was produced for this long (zero disables)
    pub timeout: Duration,
    pub recursive: bool,
    pub share: bool,
    pub delete_source: bool,
}

impl UploadRequest {
    /// Create a request with default chunk size and timeout
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
            description: None,
            content_type: None,
            parents: Vec::new(),
            folder_path: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: DEFAULT_TIMEOUT,
            recursive: false,
            share: false,
            delete_source: false,
        }
    }

    /// Derived request for a directory entry during recursion
    ///
    /// The child lives under `parent` only. Name and description overrides
    /// apply to the top-level node and are cleared; the content type
    /// override is inherited.
    #[must_use]
    pub fn for_child(&self, path: &Path, parent: RemoteId) -> Self {
        Self {
            path: path.to_path_buf(),
            name: None,
            description: None,
            content_type: self.content_type.clone(),
            parents: vec![parent],
            folder_path: None,
            chunk_size: self.chunk_size,
            timeout: self.timeout,
            recursive: self.recursive,
            share: self.share,
            delete_source: self.delete_source,
        }
    }
}

/// Request to upload a non-seekable byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamUploadRequest {
    pub name: String,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub parents: Vec<RemoteId>,
    pub chunk_size: u64,
    pub timeout: Duration,
    pub share: bool,
}

impl StreamUploadRequest {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            content_type: None,
            parents: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: DEFAULT_TIMEOUT,
            share: false,
        }
    }
}

/// Request to create a single folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MkdirRequest {
    pub name: String,
    pub description: Option<String>,
    pub parents: Vec<RemoteId>,
}
