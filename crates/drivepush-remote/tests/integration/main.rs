//! Integration tests for drivepush-remote
//!
//! Uses wiremock to simulate the Drive v3 API and verifies lookups, folder
//! creation, sharing, sync folder detection and resumable uploads.

mod common;

mod test_store;
mod test_upload;
