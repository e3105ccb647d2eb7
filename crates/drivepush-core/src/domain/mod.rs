//! Domain types
//!
//! This module contains the core domain types for drivepush:
//! - Newtypes for remote identifiers and content checksums
//! - Remote objects, creation metadata and typed queries
//! - Upload requests and their outcomes
//! - Domain-specific error types

pub mod content_type;
pub mod errors;
pub mod newtypes;
pub mod outcome;
pub mod remote_object;
pub mod request;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::*;
pub use outcome::{calc_rate, format_size, TransferOutcome, UploadOutcome};
pub use remote_object::{
    ObjectKind, ObjectMetadata, ObjectQuery, RemoteObject, SharedDrive, FOLDER_MIME_TYPE,
};
pub use request::{
    MkdirRequest, StreamUploadRequest, UploadRequest, DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT,
};
