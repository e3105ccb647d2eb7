//! drivepush Core - Domain types and ports for the upload engine
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `RemoteId`, `Checksum`, `RemoteObject`, `UploadRequest`, `UploadOutcome`
//! - **Port definitions** - Traits for adapters: `IRemoteStore`, `ISyncFolderPolicy`, `IProgressSink`
//! - **Configuration** - YAML configuration with validation
//!
//! # Architecture
//!
//! The domain module holds plain data with no I/O.
//! Ports define trait interfaces that adapter crates implement; the upload
//! engine depends only on these traits.

pub mod config;
pub mod domain;
pub mod ports;
