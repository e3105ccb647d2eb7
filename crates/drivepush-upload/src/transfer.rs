//! Transfer stream adapter
//!
//! Wraps the byte source of an upload attempt with progress reporting and an
//! idle deadline. The deadline is measured from the last byte produced by
//! the source, not from the start of the attempt.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use drivepush_core::ports::IProgressSink;
use thiserror::Error;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::Instant;

/// The source produced no data for the configured timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no data was transferred for {0:?}")]
pub struct IdleTimeout(pub Duration);

/// Time of the last produced byte, shared between reader and deadline
#[derive(Debug, Clone)]
struct ActivityClock(Arc<Mutex<Instant>>);

impl ActivityClock {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Instant::now())))
    }

    fn touch(&self) {
        if let Ok(mut last) = self.0.lock() {
            *last = Instant::now();
        }
    }

    fn last(&self) -> Instant {
        match self.0.lock() {
            Ok(last) => *last,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

// ============================================================================
// ProgressReader
// ============================================================================

/// Reader that reports progress and records activity
pub struct ProgressReader<R> {
    inner: R,
    sink: Option<Arc<dyn IProgressSink>>,
    total: u64,
    transferred: u64,
    clock: ActivityClock,
}

impl<R> ProgressReader<R> {
    /// Bytes read through this adapter so far
    pub fn transferred(&self) -> u64 {
        self.transferred
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let before = buf.filled().len();

        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            let n = (buf.filled().len() - before) as u64;
            if n > 0 {
                this.transferred += n;
                this.clock.touch();
                if let Some(sink) = &this.sink {
                    sink.on_progress(this.transferred, this.total);
                }
            }
        }
        poll
    }
}

// ============================================================================
// IdleDeadline
// ============================================================================

/// Aborts a future once its reader has been idle for too long
#[derive(Debug, Clone)]
pub struct IdleDeadline {
    clock: ActivityClock,
    timeout: Duration,
}

impl IdleDeadline {
    /// Run `fut`, failing with [`IdleTimeout`] when no byte was read for the timeout
    ///
    /// A zero timeout disables the deadline. Dropping `fut` on timeout
    /// cancels the in-flight request.
    pub async fn guard<F, T>(&self, fut: F) -> Result<T, IdleTimeout>
    where
        F: Future<Output = T>,
    {
        if self.timeout.is_zero() {
            return Ok(fut.await);
        }

        tokio::pin!(fut);
        loop {
            let deadline = self.clock.last() + self.timeout;
            tokio::select! {
                output = &mut fut => return Ok(output),
                _ = tokio::time::sleep_until(deadline) => {
                    // Activity may have moved the deadline while we slept
                    if self.clock.last() + self.timeout <= Instant::now() {
                        return Err(IdleTimeout(self.timeout));
                    }
                }
            }
        }
    }
}

/// Wrap `source` for one transfer attempt
///
/// # Arguments
/// * `source` - Byte source of the attempt
/// * `sink` - Optional progress receiver
/// * `total` - Expected size, 0 when unknown
/// * `timeout` - Idle timeout, zero to disable
pub fn instrument<R>(
    source: R,
    sink: Option<Arc<dyn IProgressSink>>,
    total: u64,
    timeout: Duration,
) -> (ProgressReader<R>, IdleDeadline) {
    let clock = ActivityClock::new();
    let reader = ProgressReader {
        inner: source,
        sink,
        total,
        transferred: 0,
        clock: clock.clone(),
    };
    (reader, IdleDeadline { clock, timeout })
}
