//! Retry/backoff controller
//!
//! Every remote call the engine makes runs inside [`RetryPolicy::run`] (or a
//! hand-written loop driven by [`RetryPolicy::on_failure`] when the call
//! needs per-attempt setup). Delays are fixed per failure class.

use std::future::Future;
use std::time::Duration;

use drivepush_core::config::RetryConfig;
use drivepush_core::ports::RemoteError;
use tracing::{info, warn};

use crate::UploadError;

// ============================================================================
// ErrorClass
// ============================================================================

/// How a remote failure should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rate limiting or a backend hiccup
    Transient,
    /// The transfer stalled or the transport timed out
    Timeout,
    /// Anything that a retry will not fix
    Fatal,
}

impl ErrorClass {
    /// Classify a store error
    #[must_use]
    pub fn classify(err: &RemoteError) -> Self {
        match err {
            RemoteError::RateLimited(_) | RemoteError::Backend { .. } => Self::Transient,
            RemoteError::Timeout(_) => Self::Timeout,
            RemoteError::NotFound(_)
            | RemoteError::PermissionDenied(_)
            | RemoteError::InvalidRequest(_)
            | RemoteError::Unauthorized(_)
            | RemoteError::Rejected { .. }
            | RemoteError::Transport(_)
            | RemoteError::InvalidResponse(_)
            | RemoteError::Io(_) => Self::Fatal,
        }
    }
}

// ============================================================================
// RetryState
// ============================================================================

/// Progress of one retried operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Failed attempts so far
    pub attempt: u32,
    pub last_class: Option<ErrorClass>,
    pub next_delay: Duration,
}

// ============================================================================
// RetryPolicy
// ============================================================================

/// Retry budget and fixed per-class delays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub transient_delay: Duration,
    pub timeout_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            transient_delay: config.transient_delay(),
            timeout_delay: config.timeout_delay(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying a failure of `class`, `None` when it is not retryable
    #[must_use]
    pub fn delay_for(&self, class: ErrorClass) -> Option<Duration> {
        match class {
            ErrorClass::Transient => Some(self.transient_delay),
            ErrorClass::Timeout => Some(self.timeout_delay),
            ErrorClass::Fatal => None,
        }
    }

    /// Record a failed attempt and decide what happens next
    ///
    /// # Returns
    /// The delay to sleep before the next attempt
    ///
    /// # Errors
    /// `UploadError::Remote` for a fatal failure, `UploadError::RetriesExhausted`
    /// once the budget is spent
    pub fn on_failure(
        &self,
        state: &mut RetryState,
        operation: &str,
        err: RemoteError,
    ) -> Result<Duration, UploadError> {
        state.attempt += 1;
        let class = ErrorClass::classify(&err);
        state.last_class = Some(class);

        let Some(delay) = self.delay_for(class) else {
            return Err(UploadError::Remote {
                operation: operation.to_string(),
                source: err,
            });
        };

        if state.attempt > self.max_retries {
            return Err(UploadError::RetriesExhausted {
                operation: operation.to_string(),
                attempts: state.attempt,
                source: err,
            });
        }

        state.next_delay = delay;
        warn!(
            operation,
            attempt = state.attempt,
            max_retries = self.max_retries,
            delay_secs = delay.as_secs(),
            error = %err,
            "Retrying after {:?}",
            class
        );
        Ok(delay)
    }

    /// Run `f` until it succeeds, fails fatally or exhausts the budget
    ///
    /// # Arguments
    /// * `operation` - Name used in logs and errors
    /// * `f` - Produces a fresh attempt on every call
    pub async fn run<T, F, Fut>(&self, operation: &str, mut f: F) -> Result<T, UploadError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut state = RetryState::default();
        loop {
            match f().await {
                Ok(value) => {
                    if state.attempt > 0 {
                        info!(
                            operation,
                            attempts = state.attempt + 1,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => {
                    let delay = self.on_failure(&mut state, operation, err)?;
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
