//! Resumable uploads against a mocked Drive API

use drivepush_core::domain::{ObjectMetadata, RemoteId};
use drivepush_core::ports::{IRemoteStore, RemoteError};
use drivepush_remote::upload::CHUNK_ALIGNMENT;
use serde_json::json;
use wiremock::matchers::{body_bytes, body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{file_json, mount_session, resume_incomplete, setup_drive_mock, SESSION_PATH};

const CHUNK: u64 = CHUNK_ALIGNMENT;

fn metadata(name: &str) -> ObjectMetadata {
    ObjectMetadata::file(name, None, Some("text/plain".to_string()))
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[tokio::test]
async fn test_session_request_carries_metadata() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "resumable"))
        .and(query_param("supportsAllDrives", "true"))
        .and(header("X-Upload-Content-Type", "text/plain"))
        .and(header("X-Upload-Content-Length", "3"))
        .and(body_json(json!({
            "name": "a.txt",
            "description": "notes",
            "mimeType": "text/plain",
            "parents": ["p1"]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", format!("{}{}", server.uri(), SESSION_PATH).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", "bytes 0-2/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            "f1",
            "a.txt",
            3,
            "900150983cd24fb0d6963f7d28e17f72",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let meta = ObjectMetadata::file("a.txt", Some("notes".to_string()), Some("text/plain".to_string()));
    let mut media: &[u8] = b"abc";
    let object = store
        .create_object_with_media(
            &meta,
            &[RemoteId::new("p1".to_string()).unwrap()],
            &mut media,
            Some(3),
            CHUNK,
        )
        .await
        .unwrap();

    assert_eq!(object.id.as_str(), "f1");
    assert_eq!(object.size, 3);
    assert_eq!(
        object.checksum.unwrap().as_str(),
        "900150983cd24fb0d6963f7d28e17f72"
    );
}

#[tokio::test]
async fn test_multi_chunk_upload_uses_open_ranges() {
    let (server, store) = setup_drive_mock().await;
    mount_session(&server).await;

    let data = payload(2 * CHUNK as usize + 100);
    let total = data.len() as u64;

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", format!("bytes 0-{}/*", CHUNK - 1).as_str()))
        .and(body_bytes(data[..CHUNK as usize].to_vec()))
        .respond_with(resume_incomplete(CHUNK - 1))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header(
            "Content-Range",
            format!("bytes {}-{}/*", CHUNK, 2 * CHUNK - 1).as_str(),
        ))
        .respond_with(resume_incomplete(2 * CHUNK - 1))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header(
            "Content-Range",
            format!("bytes {}-{}/{}", 2 * CHUNK, total - 1, total).as_str(),
        ))
        .and(body_bytes(data[2 * CHUNK as usize..].to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            "big",
            "big.bin",
            total,
            "00000000000000000000000000000000",
        )))
        .expect(1)
        .mount(&server)
        .await;

    // 100 KB is rounded up to one aligned chunk
    let mut media = &data[..];
    let object = store
        .create_object_with_media(&metadata("big.bin"), &[RemoteId::root()], &mut media, None, 100_000)
        .await
        .unwrap();

    assert_eq!(object.id.as_str(), "big");
    assert_eq!(object.size, total);
}

#[tokio::test]
async fn test_partial_acknowledgement_resends_remainder() {
    let (server, store) = setup_drive_mock().await;
    mount_session(&server).await;

    let data = payload(300_000);

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", format!("bytes 0-{}/*", CHUNK - 1).as_str()))
        .respond_with(resume_incomplete(99_999))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", "bytes 100000-299999/300000"))
        .and(body_bytes(data[100_000..].to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            "f2",
            "partial.bin",
            300_000,
            "00000000000000000000000000000000",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut media = &data[..];
    let object = store
        .create_object_with_media(&metadata("partial.bin"), &[RemoteId::root()], &mut media, None, CHUNK)
        .await
        .unwrap();
    assert_eq!(object.id.as_str(), "f2");
}

#[tokio::test]
async fn test_exact_chunk_multiple_finishes_with_final_range() {
    let (server, store) = setup_drive_mock().await;
    mount_session(&server).await;

    let data = payload(CHUNK as usize);

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header(
            "Content-Range",
            format!("bytes 0-{}/{}", CHUNK - 1, CHUNK).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            "f3",
            "exact.bin",
            CHUNK,
            "00000000000000000000000000000000",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut media = &data[..];
    store
        .create_object_with_media(&metadata("exact.bin"), &[RemoteId::root()], &mut media, None, CHUNK)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_content() {
    let (server, store) = setup_drive_mock().await;
    mount_session(&server).await;

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", "bytes */0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            "empty",
            "empty.txt",
            0,
            "d41d8cd98f00b204e9800998ecf8427e",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut media: &[u8] = b"";
    let object = store
        .create_object_with_media(&metadata("empty.txt"), &[RemoteId::root()], &mut media, Some(0), CHUNK)
        .await
        .unwrap();
    assert_eq!(object.size, 0);
}

#[tokio::test]
async fn test_zero_chunk_size_sends_single_request() {
    let (server, store) = setup_drive_mock().await;
    mount_session(&server).await;

    let data = payload(3 * CHUNK as usize);
    let total = data.len() as u64;

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header(
            "Content-Range",
            format!("bytes 0-{}/{}", total - 1, total).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            "one",
            "one.bin",
            total,
            "00000000000000000000000000000000",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut media = &data[..];
    store
        .create_object_with_media(&metadata("one.bin"), &[RemoteId::root()], &mut media, None, 0)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_resume_without_progress_is_backend_error() {
    let (server, store) = setup_drive_mock().await;
    mount_session(&server).await;

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(308))
        .expect(1)
        .mount(&server)
        .await;

    let data = payload(2 * CHUNK as usize);
    let mut media = &data[..];
    let err = store
        .create_object_with_media(&metadata("stuck.bin"), &[RemoteId::root()], &mut media, None, CHUNK)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Backend { status: 308, .. }));
}

#[tokio::test]
async fn test_chunk_failure_is_mapped() {
    let (server, store) = setup_drive_mock().await;
    mount_session(&server).await;

    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let mut media: &[u8] = b"hello";
    let err = store
        .create_object_with_media(&metadata("a.txt"), &[RemoteId::root()], &mut media, Some(5), CHUNK)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Backend { status: 502, .. }));
}

#[tokio::test]
async fn test_session_without_location_is_invalid_response() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut media: &[u8] = b"hello";
    let err = store
        .create_object_with_media(&metadata("a.txt"), &[RemoteId::root()], &mut media, None, CHUNK)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::InvalidResponse(_)));
}
