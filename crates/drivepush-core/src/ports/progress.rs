//! Progress reporting port

/// Receives byte counts while a transfer is running
///
/// Called from the transfer path on every read, so implementations must be
/// cheap and must not block.
pub trait IProgressSink: Send + Sync {
    /// # Arguments
    /// * `transferred` - Bytes handed to the transport so far in this attempt
    /// * `total` - Expected size, 0 when unknown
    fn on_progress(&self, transferred: u64, total: u64);
}
