//! Drive v3 HTTP client
//!
//! Provides an authenticated HTTP client for the Drive REST API. Metadata
//! calls go to the API base URL, media uploads to the upload base URL.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drivepush_remote::{DriveClient, DriveStore};
//!
//! let client = DriveClient::new("access-token-here");
//! let store = DriveStore::new(client);
//! ```

use drivepush_core::config::RemoteConfig;
use reqwest::{redirect, Client, Method, RequestBuilder};
use tracing::debug;

/// Base URL for Drive v3 metadata calls
pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive v3 media uploads
pub const DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// HTTP client for Drive v3 API calls
///
/// Wraps `reqwest::Client` with the bearer token and base URL construction.
/// Redirects are disabled because resumable uploads answer intermediate
/// chunks with `308 Resume Incomplete`.
#[derive(Debug, Clone)]
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    api_base_url: String,
    upload_base_url: String,
    /// Current OAuth2 access token
    access_token: String,
}

impl DriveClient {
    /// Creates a new DriveClient against the public Drive endpoints
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_urls(access_token, DRIVE_API_BASE_URL, DRIVE_UPLOAD_BASE_URL)
    }

    /// Creates a new DriveClient with custom base URLs (useful for testing)
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token
    /// * `api_base_url` - Base URL for metadata requests
    /// * `upload_base_url` - Base URL for media uploads
    pub fn with_base_urls(
        access_token: impl Into<String>,
        api_base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base_url: trim_slash(api_base_url.into()),
            upload_base_url: trim_slash(upload_base_url.into()),
            access_token: access_token.into(),
        }
    }

    /// Creates a client from the `remote` configuration section
    pub fn from_config(access_token: impl Into<String>, config: &RemoteConfig) -> Self {
        Self::with_base_urls(
            access_token,
            config.api_base_url.as_str(),
            config.upload_base_url.as_str(),
        )
    }

    /// Updates the access token (e.g., after a token refresh)
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
        debug!("Updated DriveClient access token");
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Creates an authenticated request against the API base URL
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - Path relative to the API base URL (e.g., "/files")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        self.client.request(method, url).bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request against the upload base URL
    pub fn upload_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base_url, path);
        self.client.request(method, url).bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request to an absolute URL such as an
    /// upload session
    pub fn absolute_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.access_token)
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
