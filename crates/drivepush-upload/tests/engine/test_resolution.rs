//! Destination folder path resolution

use drivepush_core::domain::{UploadOutcome, UploadRequest};
use drivepush_core::ports::RemoteError;
use drivepush_upload::UploadError;

use crate::common::{engine, rid, write_file, FakeStore};

fn upload_to(path: &std::path::Path, folder_path: &str) -> UploadRequest {
    let mut req = UploadRequest::new(path);
    req.folder_path = Some(folder_path.to_string());
    req
}

fn parent_of(outcome: UploadOutcome) -> drivepush_core::domain::RemoteId {
    match outcome {
        UploadOutcome::File(transfer) => transfer.object.parents[0].clone(),
        other => panic!("expected a file outcome, got {other:?}"),
    }
}

fn seeded_store() -> std::sync::Arc<FakeStore> {
    let store = FakeStore::new();
    store.seed_folder("folderA", "A", &rid("root"));
    store.seed_folder("folderB", "B", &rid("folderA"));
    store.add_shared_drive("teamDrive1", "Team Docs");
    store.seed_folder("teamFolder", "Specs", &rid("teamDrive1"));
    store
}

#[tokio::test]
async fn test_my_drive_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");
    write_file(&path, b"x");

    let store = seeded_store();
    let outcome = engine(&store)
        .upload(&upload_to(&path, "My Drive/A/B"))
        .await
        .unwrap();

    assert_eq!(parent_of(outcome), rid("folderB"));
    assert_eq!(FakeStore::count(&store.drive_listings), 0);
}

#[tokio::test]
async fn test_my_drive_alias_and_empty_segments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");
    write_file(&path, b"x");

    let store = seeded_store();
    let outcome = engine(&store)
        .upload(&upload_to(&path, "/MYDRIVE//A/"))
        .await
        .unwrap();

    assert_eq!(parent_of(outcome), rid("folderA"));
}

#[tokio::test]
async fn test_shared_drive_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");
    write_file(&path, b"x");

    let store = seeded_store();
    let outcome = engine(&store)
        .upload(&upload_to(&path, "Team Docs/Specs"))
        .await
        .unwrap();

    assert_eq!(parent_of(outcome), rid("teamFolder"));
    assert_eq!(FakeStore::count(&store.drive_listings), 1);
}

#[tokio::test]
async fn test_empty_path_resolves_to_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");
    write_file(&path, b"x");

    let store = seeded_store();
    let outcome = engine(&store).upload(&upload_to(&path, "")).await.unwrap();

    assert!(parent_of(outcome).is_root());
}

#[tokio::test]
async fn test_folder_path_overrides_parents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");
    write_file(&path, b"x");

    let store = seeded_store();
    let mut req = upload_to(&path, "My Drive/A");
    req.parents = vec![rid("somewhereElse")];

    let outcome = engine(&store).upload(&req).await.unwrap();
    assert_eq!(parent_of(outcome), rid("folderA"));
}

#[tokio::test]
async fn test_unknown_top_level_folder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");
    write_file(&path, b"x");

    let store = seeded_store();
    let err = engine(&store)
        .upload(&upload_to(&path, "Nope/A"))
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::TopLevelFolderNotFound(ref name) if name == "Nope"));
    assert_eq!(err.to_string(), "No top level folder matched name Nope");
    assert_eq!(FakeStore::count(&store.media_attempts), 0);
}

#[tokio::test]
async fn test_unknown_nested_folder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");
    write_file(&path, b"x");

    let store = seeded_store();
    let err = engine(&store)
        .upload(&upload_to(&path, "MyDrive/A/Missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::FolderNotFound(ref name) if name == "Missing"));
    assert_eq!(err.to_string(), "No folders matched name Missing");
}

#[tokio::test]
async fn test_files_do_not_match_folder_segments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");
    write_file(&path, b"x");

    let store = seeded_store();
    // Upload a file called "C" into A, then try to use it as a folder
    let c = dir.path().join("C");
    write_file(&c, b"not a folder");
    engine(&store)
        .upload(&upload_to(&c, "My Drive/A"))
        .await
        .unwrap();

    let err = engine(&store)
        .upload(&upload_to(&path, "My Drive/A/C"))
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::FolderNotFound(_)));
}

#[tokio::test]
async fn test_segment_lookup_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.txt");
    write_file(&path, b"x");

    let store = seeded_store();
    store.fail_next_query(RemoteError::Backend {
        status: 502,
        message: "Bad Gateway".to_string(),
    });

    let outcome = engine(&store)
        .upload(&upload_to(&path, "My Drive/A"))
        .await
        .unwrap();
    assert_eq!(parent_of(outcome), rid("folderA"));
}
