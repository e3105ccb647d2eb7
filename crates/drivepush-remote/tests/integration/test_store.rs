//! Metadata operations against a mocked Drive API

use drivepush_core::domain::{ObjectKind, ObjectMetadata, ObjectQuery, RemoteId, FOLDER_MIME_TYPE};
use drivepush_core::ports::{IRemoteStore, ISyncFolderPolicy, RemoteError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{error_json, file_json, setup_drive_mock};

fn id(s: &str) -> RemoteId {
    RemoteId::new(s.to_string()).unwrap()
}

#[tokio::test]
async fn test_query_objects_sends_filter() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(header("Authorization", "Bearer test-access-token"))
        .and(query_param("q", "name = 'a.txt' and 'p1' in parents"))
        .and(query_param("supportsAllDrives", "true"))
        .and(query_param("includeItemsFromAllDrives", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [file_json("f1", "a.txt", 5, "5d41402abc4b2a76b9719d911017c592")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let found = store
        .query_objects(&ObjectQuery::new(id("p1"), "a.txt", false))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id.as_str(), "f1");
    assert_eq!(found[0].size, 5);
    assert_eq!(found[0].kind, ObjectKind::File);
}

#[tokio::test]
async fn test_query_objects_empty_result() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .mount(&server)
        .await;

    let found = store
        .query_objects(&ObjectQuery::new(RemoteId::root(), "Photos", true))
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_create_folder_sends_metadata() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .and(query_param("supportsAllDrives", "true"))
        .and(body_json(json!({
            "name": "docs",
            "description": "project docs",
            "mimeType": FOLDER_MIME_TYPE,
            "parents": ["p1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "d1",
            "name": "docs",
            "parents": ["p1"],
            "mimeType": FOLDER_MIME_TYPE
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = store
        .create_object(
            &ObjectMetadata::folder("docs", Some("project docs".to_string())),
            &[id("p1")],
        )
        .await
        .unwrap();

    assert_eq!(created.id.as_str(), "d1");
    assert!(created.is_folder());
    assert_eq!(created.parents, vec![id("p1")]);
}

#[tokio::test]
async fn test_list_shared_drives_follows_pages() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/drives"))
        .and(query_param("pageSize", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "drives": [{"id": "sd1", "name": "Team"}],
            "nextPageToken": "page2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/drives"))
        .and(query_param("pageToken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "drives": [{"id": "sd2", "name": "Finance"}]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let drives = store.list_shared_drives().await.unwrap();
    let names: Vec<_> = drives.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Team", "Finance"]);
    assert_eq!(drives[1].id.as_str(), "sd2");
}

#[tokio::test]
async fn test_set_public_readable() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files/f1/permissions"))
        .and(body_json(json!({"role": "reader", "type": "anyone"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "anyoneWithLink"})))
        .expect(1)
        .mount(&server)
        .await;

    store.set_public_readable(&id("f1")).await.unwrap();
}

#[tokio::test]
async fn test_sync_managed_detection() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/synced"))
        .and(query_param("fields", "appProperties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "appProperties": {"sync": "true", "syncRoot": "true"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/plain"))
        .and(query_param("fields", "appProperties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/other"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "appProperties": {"sync": "false"}
        })))
        .mount(&server)
        .await;

    assert!(store.is_sync_managed(&id("synced")).await.unwrap());
    assert!(!store.is_sync_managed(&id("plain")).await.unwrap());
    assert!(!store.is_sync_managed(&id("other")).await.unwrap());
}

#[tokio::test]
async fn test_rate_limit_reason_maps_to_rate_limited() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(403).set_body_json(error_json(
            403,
            "userRateLimitExceeded",
            "User Rate Limit Exceeded",
        )))
        .mount(&server)
        .await;

    let err = store
        .query_objects(&ObjectQuery::new(RemoteId::root(), "x", false))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::RateLimited(ref r) if r == "userRateLimitExceeded"));
}

#[tokio::test]
async fn test_not_found_and_server_errors() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files/missing/permissions"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_json(
            404,
            "notFound",
            "File not found: missing.",
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/drives"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = store.set_public_readable(&id("missing")).await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(ref m) if m == "File not found: missing."));

    let err = store.list_shared_drives().await.unwrap_err();
    assert!(matches!(err, RemoteError::Backend { status: 503, .. }));
}
