//! Shared helpers for Drive API integration tests

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drivepush_remote::{DriveClient, DriveStore};

/// Path of the upload session handed out by [`mount_session`]
pub const SESSION_PATH: &str = "/upload/session/abc";

/// Starts a mock server and returns a store pointing at it
///
/// Metadata calls go to `/drive/v3`, uploads to `/upload/drive/v3`.
pub async fn setup_drive_mock() -> (MockServer, DriveStore) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_urls(
        "test-access-token",
        format!("{}/drive/v3", server.uri()),
        format!("{}/upload/drive/v3", server.uri()),
    );
    (server, DriveStore::new(client))
}

/// A file resource as the API returns it
pub fn file_json(id: &str, name: &str, size: u64, md5: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "parents": ["root"],
        "size": size.to_string(),
        "md5Checksum": md5,
        "mimeType": "application/octet-stream"
    })
}

/// Mounts the resumable session endpoint
pub async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", format!("{}{}", server.uri(), SESSION_PATH).as_str()),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// A `308 Resume Incomplete` acknowledging bytes `0..=last`
pub fn resume_incomplete(last: u64) -> ResponseTemplate {
    ResponseTemplate::new(308).insert_header("Range", format!("bytes=0-{last}").as_str())
}

/// A Drive error body
pub fn error_json(code: u16, reason: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "errors": [{"domain": "global", "reason": reason, "message": message}]
        }
    })
}
