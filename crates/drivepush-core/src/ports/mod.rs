//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the upload engine depends on; their
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Object creation, media upload, lookup and sharing
//! - [`ISyncFolderPolicy`] - Whether a destination folder is managed by sync
//! - [`IProgressSink`] - Byte-level transfer progress reporting

pub mod progress;
pub mod remote_store;
pub mod sync_policy;

pub use progress::IProgressSink;
pub use remote_store::{IRemoteStore, RemoteError};
pub use sync_policy::{ISyncFolderPolicy, NoSyncFolders};
