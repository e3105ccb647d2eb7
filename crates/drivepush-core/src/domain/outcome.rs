//! Results of upload operations

use std::time::Duration;

use serde::Serialize;

use super::remote_object::RemoteObject;

/// Result of transferring a single file or stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub object: RemoteObject,
    /// Bytes per second; zero when the upload was skipped
    pub rate: u64,
    pub bytes_transferred: u64,
    /// An identical object already existed and nothing was sent
    pub skipped: bool,
}

impl TransferOutcome {
    /// Outcome of a completed transfer
    #[must_use]
    pub fn transferred(object: RemoteObject, bytes: u64, rate: u64) -> Self {
        Self {
            object,
            rate,
            bytes_transferred: bytes,
            skipped: false,
        }
    }

    /// Outcome for an object that was already present remotely
    #[must_use]
    pub fn skipped(object: RemoteObject) -> Self {
        Self {
            object,
            rate: 0,
            bytes_transferred: 0,
            skipped: true,
        }
    }
}

/// Result of an upload of a single file or a whole tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UploadOutcome {
    File(TransferOutcome),
    /// Aggregate for a recursive upload
    Tree { bytes: u64, rate: u64 },
}

/// Bytes per second for a transfer
///
/// Transfers shorter than one second report the byte count itself.
#[must_use]
pub fn calc_rate(bytes: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs();
    if secs < 1 {
        return bytes;
    }
    bytes / secs
}

/// Human readable size using decimal units, e.g. `1.5 MB`
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 1000 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
