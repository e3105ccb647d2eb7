//! Drive v3 JSON resource types
//!
//! Fields are optional where the API omits them (folders have no size or
//! checksum, and `parents` is missing for objects the user does not own).

use drivepush_core::domain::{Checksum, ObjectKind, RemoteId, RemoteObject, SharedDrive};
use drivepush_core::ports::RemoteError;
use serde::{Deserialize, Serialize};

/// Fields requested for every returned file resource
pub(crate) const FILE_FIELDS: &str = "id,name,parents,size,md5Checksum,mimeType,webContentLink";

/// A file resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    /// int64 values are encoded as JSON strings
    pub size: Option<String>,
    pub md5_checksum: Option<String>,
    pub mime_type: Option<String>,
    pub web_content_link: Option<String>,
}

impl DriveFile {
    /// Convert into the domain object
    ///
    /// # Errors
    /// Returns `RemoteError::InvalidResponse` for an empty id, a malformed
    /// parent id, size or checksum
    pub fn into_remote_object(self) -> Result<RemoteObject, RemoteError> {
        let id = RemoteId::new(self.id).map_err(invalid)?;
        let parents = self
            .parents
            .into_iter()
            .map(RemoteId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;
        let size = match self.size.as_deref() {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| RemoteError::InvalidResponse(format!("size {raw:?} is not a number")))?,
            None => 0,
        };
        let checksum = self.md5_checksum.map(Checksum::new).transpose().map_err(invalid)?;

        Ok(RemoteObject {
            id,
            name: self.name,
            parents,
            size,
            checksum,
            kind: ObjectKind::from_mime_type(self.mime_type.as_deref()),
            web_content_link: self.web_content_link,
        })
    }
}

fn invalid(err: impl std::fmt::Display) -> RemoteError {
    RemoteError::InvalidResponse(err.to_string())
}

/// Response of `files.list`
#[derive(Debug, Deserialize)]
pub(crate) struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

/// A shared drive resource
#[derive(Debug, Deserialize)]
pub(crate) struct DriveResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl DriveResource {
    pub fn into_shared_drive(self) -> Result<SharedDrive, RemoteError> {
        Ok(SharedDrive {
            id: RemoteId::new(self.id).map_err(invalid)?,
            name: self.name,
        })
    }
}

/// Response of `drives.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriveList {
    #[serde(default)]
    pub drives: Vec<DriveResource>,
    pub next_page_token: Option<String>,
}

/// Metadata body for `files.create`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'a str>,
    pub parents: Vec<&'a str>,
}

/// Body for `permissions.create`
#[derive(Debug, Serialize)]
pub(crate) struct PermissionBody<'a> {
    pub role: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
}

/// Response of `files.get` with `fields=appProperties`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppPropertiesResponse {
    #[serde(default)]
    pub app_properties: std::collections::HashMap<String, String>,
}

/// Standard error envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub reason: String,
}
