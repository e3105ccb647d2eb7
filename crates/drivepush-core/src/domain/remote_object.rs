//! Remote objects, creation metadata and lookup queries

use serde::{Deserialize, Serialize};

use super::newtypes::{Checksum, RemoteId};

/// Content type the store uses to mark folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Kind of a remote object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    File,
    Folder,
}

impl ObjectKind {
    /// Derive the kind from the store's content type
    #[must_use]
    pub fn from_mime_type(mime_type: Option<&str>) -> Self {
        match mime_type {
            Some(FOLDER_MIME_TYPE) => Self::Folder,
            _ => Self::File,
        }
    }
}

/// A file or folder as last reported by the store
///
/// Never mutated locally; a fresh query result replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    pub id: RemoteId,
    pub name: String,
    /// A file may live in several folders at once
    pub parents: Vec<RemoteId>,
    pub size: u64,
    /// Only present for binary files
    pub checksum: Option<Checksum>,
    pub kind: ObjectKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_content_link: Option<String>,
}

impl RemoteObject {
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == ObjectKind::Folder
    }
}

/// Metadata sent when creating an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub name: String,
    pub description: Option<String>,
    /// `None` lets the store pick a content type
    pub content_type: Option<String>,
    pub kind: ObjectKind,
}

impl ObjectMetadata {
    /// Metadata for a regular file
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        description: Option<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            content_type,
            kind: ObjectKind::File,
        }
    }

    /// Metadata for a folder
    #[must_use]
    pub fn folder(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            content_type: Some(FOLDER_MIME_TYPE.to_string()),
            kind: ObjectKind::Folder,
        }
    }

    /// Content type to send on the wire
    ///
    /// Folders always carry the folder content type.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        match self.kind {
            ObjectKind::Folder => Some(FOLDER_MIME_TYPE),
            ObjectKind::File => self.content_type.as_deref(),
        }
    }
}

/// A top-level shared drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDrive {
    pub id: RemoteId,
    pub name: String,
}

/// Name lookup inside a single parent folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectQuery {
    pub name: String,
    pub parent: RemoteId,
    pub folders_only: bool,
}

impl ObjectQuery {
    #[must_use]
    pub fn new(parent: RemoteId, name: impl Into<String>, folders_only: bool) -> Self {
        Self {
            name: name.into(),
            parent,
            folders_only,
        }
    }

    /// Render the store's filter expression
    ///
    /// # Returns
    /// `name = '<name>' and '<parent>' in parents`, followed by a folder
    /// content type clause when `folders_only` is set
    #[must_use]
    pub fn to_filter_expression(&self) -> String {
        let mut expr = format!(
            "name = '{}' and '{}' in parents",
            escape_query_literal(&self.name),
            self.parent
        );
        if self.folders_only {
            expr.push_str(&format!(" and mimeType = '{FOLDER_MIME_TYPE}'"));
        }
        expr
    }
}

/// Escape a string for use inside a single-quoted filter literal
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
