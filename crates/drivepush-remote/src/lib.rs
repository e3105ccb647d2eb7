//! drivepush Remote - Drive v3 REST adapter
//!
//! Provides async adapters for:
//! - Object creation, lookup and sharing over the Drive v3 REST API
//! - Resumable chunked media uploads
//! - Sync-managed folder detection through `appProperties`
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP client with API and upload base URLs
//! - [`error`] - Mapping of HTTP failures onto `RemoteError`
//! - [`store`] - `IRemoteStore` and `ISyncFolderPolicy` implementations
//! - [`upload`] - Resumable upload sessions

pub mod client;
pub mod error;
pub mod store;
pub mod upload;

mod wire;

pub use client::DriveClient;
pub use store::DriveStore;
