//! Drive-backed implementation of the store ports
//!
//! [`DriveStore`] performs exactly one logical request per port call;
//! retrying is left to the upload engine.

use async_trait::async_trait;
use drivepush_core::domain::{ObjectMetadata, ObjectQuery, RemoteId, RemoteObject, SharedDrive};
use drivepush_core::ports::{IRemoteStore, ISyncFolderPolicy, RemoteError};
use reqwest::Method;
use tokio::io::AsyncRead;
use tracing::{debug, instrument};

use crate::client::DriveClient;
use crate::error::{check_status, map_transport};
use crate::upload::{start_session, upload_media};
use crate::wire::{
    AppPropertiesResponse, CreateBody, DriveFile, DriveList, FileList, PermissionBody, FILE_FIELDS,
};

/// Page size for `drives.list`
const DRIVES_PAGE_SIZE: &str = "100";

/// `appProperties` key marking a folder as owned by a sync job
const SYNC_PROPERTY: &str = "sync";

/// Remote store adapter for the Drive v3 REST API
#[derive(Debug, Clone)]
pub struct DriveStore {
    client: DriveClient,
}

impl DriveStore {
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &DriveClient {
        &self.client
    }
}

#[async_trait]
impl IRemoteStore for DriveStore {
    #[instrument(skip(self, metadata), fields(name = %metadata.name))]
    async fn create_object(
        &self,
        metadata: &ObjectMetadata,
        parents: &[RemoteId],
    ) -> Result<RemoteObject, RemoteError> {
        let body = CreateBody {
            name: &metadata.name,
            description: metadata.description.as_deref(),
            mime_type: metadata.mime_type(),
            parents: parents.iter().map(RemoteId::as_str).collect(),
        };

        let response = self
            .client
            .request(Method::POST, "/files")
            .query(&[("supportsAllDrives", "true"), ("fields", FILE_FIELDS)])
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;

        let file: DriveFile = check_status(response)
            .await?
            .json()
            .await
            .map_err(map_transport)?;
        let object = file.into_remote_object()?;
        debug!(id = %object.id, "Object created");
        Ok(object)
    }

    #[instrument(skip(self, metadata, parents, media), fields(name = %metadata.name))]
    async fn create_object_with_media(
        &self,
        metadata: &ObjectMetadata,
        parents: &[RemoteId],
        media: &mut (dyn AsyncRead + Send + Unpin),
        size_hint: Option<u64>,
        chunk_size: u64,
    ) -> Result<RemoteObject, RemoteError> {
        let session = start_session(&self.client, metadata, parents, size_hint).await?;
        let file = upload_media(&self.client, &session, media, chunk_size).await?;
        file.into_remote_object()
    }

    async fn query_objects(&self, query: &ObjectQuery) -> Result<Vec<RemoteObject>, RemoteError> {
        let filter = query.to_filter_expression();
        let fields = format!("files({FILE_FIELDS})");
        debug!(q = %filter, "Querying objects");

        let response = self
            .client
            .request(Method::GET, "/files")
            .query(&[
                ("q", filter.as_str()),
                ("fields", fields.as_str()),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(map_transport)?;

        let list: FileList = check_status(response)
            .await?
            .json()
            .await
            .map_err(map_transport)?;

        list.files
            .into_iter()
            .map(|file| file.into_remote_object())
            .collect()
    }

    async fn list_shared_drives(&self) -> Result<Vec<SharedDrive>, RemoteError> {
        let mut drives = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("pageSize", DRIVES_PAGE_SIZE.to_string()),
                ("fields", "nextPageToken,drives(id,name)".to_string()),
            ];
            if let Some(token) = page_token.take() {
                params.push(("pageToken", token));
            }

            let response = self
                .client
                .request(Method::GET, "/drives")
                .query(&params)
                .send()
                .await
                .map_err(map_transport)?;
            let page: DriveList = check_status(response)
                .await?
                .json()
                .await
                .map_err(map_transport)?;

            for drive in page.drives {
                drives.push(drive.into_shared_drive()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = drives.len(), "Listed shared drives");
        Ok(drives)
    }

    async fn set_public_readable(&self, id: &RemoteId) -> Result<(), RemoteError> {
        let path = format!("/files/{id}/permissions");
        let response = self
            .client
            .request(Method::POST, &path)
            .query(&[("supportsAllDrives", "true")])
            .json(&PermissionBody {
                role: "reader",
                kind: "anyone",
            })
            .send()
            .await
            .map_err(map_transport)?;
        check_status(response).await?;

        debug!(id = %id, "Permission created");
        Ok(())
    }
}

#[async_trait]
impl ISyncFolderPolicy for DriveStore {
    async fn is_sync_managed(&self, id: &RemoteId) -> Result<bool, RemoteError> {
        let path = format!("/files/{id}");
        let response = self
            .client
            .request(Method::GET, &path)
            .query(&[("fields", "appProperties"), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(map_transport)?;

        let props: AppPropertiesResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(map_transport)?;

        Ok(props
            .app_properties
            .get(SYNC_PROPERTY)
            .is_some_and(|value| value == "true"))
    }
}
