//! Resumable media uploads
//!
//! Uploads run in two steps:
//! 1. [`start_session`] posts the metadata with `uploadType=resumable` and
//!    receives the session URL in the `Location` header
//! 2. [`upload_media`] sends the content to that URL in chunks
//!
//! Intermediate chunks carry `Content-Range: bytes a-b/*` because the total
//! is only known once the source is exhausted. The server answers them with
//! `308 Resume Incomplete` and a `Range: bytes=0-N` header naming the bytes
//! it has committed; anything past `N` is sent again with the next request.

use drivepush_core::domain::{ObjectMetadata, RemoteId};
use drivepush_core::ports::RemoteError;
use reqwest::header::{CONTENT_RANGE, LOCATION, RANGE};
use reqwest::{Method, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::client::DriveClient;
use crate::error::{check_status, map_status, map_transport};
use crate::wire::{CreateBody, DriveFile, FILE_FIELDS};

/// Chunk sizes are rounded up to a multiple of this (256 KiB)
pub const CHUNK_ALIGNMENT: u64 = 256 * 1024;

const READ_SIZE: usize = 64 * 1024;

/// Round a requested chunk size up to the alignment
///
/// Zero stays zero and means "send everything in one request".
#[must_use]
pub fn effective_chunk_size(requested: u64) -> u64 {
    if requested == 0 {
        return 0;
    }
    requested
        .div_ceil(CHUNK_ALIGNMENT)
        .saturating_mul(CHUNK_ALIGNMENT)
}

// ============================================================================
// Session
// ============================================================================

/// Open a resumable upload session
///
/// # Arguments
/// * `client` - The authenticated DriveClient
/// * `metadata` - Name, description and content type of the new file
/// * `parents` - Folders the file is created in
/// * `size_hint` - Total content length when known
///
/// # Returns
/// The session URL to send content to
///
/// # Errors
/// Returns the mapped HTTP error, or `RemoteError::InvalidResponse` when the
/// response has no usable `Location` header
pub async fn start_session(
    client: &DriveClient,
    metadata: &ObjectMetadata,
    parents: &[RemoteId],
    size_hint: Option<u64>,
) -> Result<String, RemoteError> {
    let body = CreateBody {
        name: &metadata.name,
        description: metadata.description.as_deref(),
        mime_type: metadata.mime_type(),
        parents: parents.iter().map(RemoteId::as_str).collect(),
    };

    let mut request = client
        .upload_request(Method::POST, "/files")
        .query(&[
            ("uploadType", "resumable"),
            ("supportsAllDrives", "true"),
            ("fields", FILE_FIELDS),
        ])
        .json(&body);
    if let Some(content_type) = metadata.mime_type() {
        request = request.header("X-Upload-Content-Type", content_type);
    }
    if let Some(size) = size_hint {
        request = request.header("X-Upload-Content-Length", size.to_string());
    }

    let response = check_status(request.send().await.map_err(map_transport)?).await?;
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            RemoteError::InvalidResponse("upload session response has no Location header".into())
        })?
        .to_string();

    debug!(name = %metadata.name, session = %location, "Upload session created");
    Ok(location)
}

// ============================================================================
// Chunk loop
// ============================================================================

/// Send `media` to an open session
///
/// # Arguments
/// * `client` - The authenticated DriveClient
/// * `session_url` - URL returned by [`start_session`]
/// * `media` - Content source, read to the end
/// * `chunk_size` - Bytes per request after alignment, 0 for a single request
///
/// # Returns
/// The created file resource
///
/// # Errors
/// - `RemoteError::Io` if reading `media` fails
/// - `RemoteError::Backend` if the server acknowledged no progress
/// - the mapped HTTP error for any other failure status
pub(crate) async fn upload_media(
    client: &DriveClient,
    session_url: &str,
    media: &mut (dyn AsyncRead + Send + Unpin),
    chunk_size: u64,
) -> Result<DriveFile, RemoteError> {
    let chunk = match effective_chunk_size(chunk_size) {
        0 => usize::MAX,
        size => usize::try_from(size).unwrap_or(usize::MAX),
    };

    // Bytes from `committed` onwards that the server has not acknowledged
    let mut pending: Vec<u8> = Vec::new();
    let mut committed: u64 = 0;
    let mut eof = false;

    loop {
        // One byte of lookahead tells a full final chunk from an intermediate one
        if !eof {
            eof = fill(media, &mut pending, chunk.saturating_add(1)).await?;
        }
        let is_final = eof && pending.len() <= chunk;
        let len = pending.len().min(chunk);
        let content_range = content_range(committed, len as u64, is_final);

        debug!(range = %content_range, bytes = len, "Sending chunk");
        let response = client
            .absolute_request(Method::PUT, session_url)
            .header(CONTENT_RANGE, &content_range)
            .body(pending[..len].to_vec())
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status == StatusCode::PERMANENT_REDIRECT {
            let acknowledged = response
                .headers()
                .get(RANGE)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_range_header)
                .unwrap_or(committed);
            if acknowledged <= committed || acknowledged > committed + len as u64 {
                return Err(RemoteError::Backend {
                    status: status.as_u16(),
                    message: format!(
                        "upload made no progress (committed {committed}, acknowledged {acknowledged})"
                    ),
                });
            }
            let advanced = (acknowledged - committed) as usize;
            pending.drain(..advanced);
            committed = acknowledged;
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        let file: DriveFile = response.json().await.map_err(map_transport)?;
        debug!(id = %file.id, bytes = committed + len as u64, "Upload session completed");
        return Ok(file);
    }
}

/// Read from `media` until `pending` holds `want` bytes
///
/// # Returns
/// true when the source is exhausted
async fn fill(
    media: &mut (dyn AsyncRead + Send + Unpin),
    pending: &mut Vec<u8>,
    want: usize,
) -> Result<bool, RemoteError> {
    let mut scratch = vec![0u8; READ_SIZE];
    while pending.len() < want {
        let max = READ_SIZE.min(want - pending.len());
        let n = media.read(&mut scratch[..max]).await?;
        if n == 0 {
            return Ok(true);
        }
        pending.extend_from_slice(&scratch[..n]);
    }
    Ok(false)
}

/// `Content-Range` value for a chunk of `len` bytes at `offset`
fn content_range(offset: u64, len: u64, is_final: bool) -> String {
    match (len, is_final) {
        (0, _) => format!("bytes */{offset}"),
        (_, true) => format!("bytes {}-{}/{}", offset, offset + len - 1, offset + len),
        (_, false) => format!("bytes {}-{}/*", offset, offset + len - 1),
    }
}

/// Parse `bytes=0-N` into the committed length `N + 1`
fn parse_range_header(value: &str) -> Option<u64> {
    let (start, end) = value.trim().strip_prefix("bytes=")?.split_once('-')?;
    if start != "0" {
        return None;
    }
    end.parse::<u64>().ok().map(|last| last + 1)
}
