//! Retry executor with exponential backoff.
//!
//! Wraps a fallible asynchronous operation and retries it with delays of
//! `2^attempt` seconds (2 s, 4 s, 8 s, ...). The shared state exposes an
//! `is_retrying` flag for caller feedback, true from the first failure until
//! the run resolves. There is no mid-backoff cancellation; callers must
//! tolerate in-flight retries outliving a workflow reset.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::error::Result;

/// Attempt ceiling for plan and content calls.
pub const DEFAULT_CONTENT_ATTEMPTS: u32 = 3;
/// Attempt ceiling for speaker-note calls.
pub const DEFAULT_NOTES_ATTEMPTS: u32 = 2;

/// Shared retry/error state, observable while a run is in flight.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    pub is_retrying: bool,
    /// Message of the last run that exhausted its attempts; cleared by the
    /// next successful run.
    pub last_error: Option<String>,
}

/// Generic retry wrapper shared across the pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    state: Arc<RwLock<RetryState>>,
}

/// Delay before the retry following attempt `attempt` (1-based).
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

impl RetryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current retry state.
    pub async fn state(&self) -> RetryState {
        self.state.read().await.clone()
    }

    pub async fn is_retrying(&self) -> bool {
        self.state.read().await.is_retrying
    }

    /// Clear any recorded error without running anything.
    pub async fn clear_error(&self) {
        self.state.write().await.last_error = None;
    }

    /// Run `op` with up to `max_attempts` attempts.
    ///
    /// Success at any attempt returns the value and clears prior error
    /// state. Exhaustion returns the final failure and records its message.
    pub async fn run<T, F, Fut>(&self, max_attempts: u32, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    let mut state = self.state.write().await;
                    state.is_retrying = false;
                    state.last_error = None;
                    return Ok(value);
                }
                Err(err) => {
                    if attempt >= max_attempts {
                        let mut state = self.state.write().await;
                        state.is_retrying = false;
                        state.last_error = Some(err.user_message());
                        return Err(err);
                    }

                    self.state.write().await.is_retrying = true;
                    let delay = backoff(attempt);
                    log::debug!(
                        "attempt {attempt}/{max_attempts} failed, retrying in {}s",
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
