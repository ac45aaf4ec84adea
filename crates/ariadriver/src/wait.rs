//! Bounded polling.
//!
//! A predicate is evaluated until it holds or the deadline passes. Each
//! iteration suspends on the runtime, so the browser keeps running its own
//! event loop while a condition is awaited.

use crate::result::{AriaError, AriaResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (1 second)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 1_000;

/// Default polling interval (10ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds (0 yields without sleeping)
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of predicate evaluations
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Polls asynchronous predicates with a fixed deadline
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `predicate` until it returns `true`.
    ///
    /// The predicate runs at least once, even with a zero timeout. Errors
    /// from the predicate end the wait immediately. When the deadline
    /// passes the result is [`AriaError::Timeout`] naming `description`.
    pub async fn wait_for<F, Fut>(&self, description: &str, mut predicate: F) -> AriaResult<WaitResult>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AriaResult<bool>>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let poll_interval = self.options.poll_interval();
        let mut attempts = 0_u32;

        loop {
            attempts = attempts.saturating_add(1);
            if predicate().await? {
                tracing::debug!(condition = description, attempts, "condition met");
                return Ok(WaitResult {
                    elapsed: start.elapsed(),
                    attempts,
                    waited_for: description.to_string(),
                });
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                tracing::debug!(condition = description, attempts, "condition timed out");
                return Err(AriaError::Timeout {
                    ms: self.options.timeout_ms,
                    condition: description.to_string(),
                });
            }

            if poll_interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
            }
        }
    }
}

/// Poll `predicate` with the default interval until it holds or `timeout_ms` passes
pub async fn wait_until<F, Fut>(description: &str, timeout_ms: u64, predicate: F) -> AriaResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AriaResult<bool>>,
{
    Waiter::new(WaitOptions::new().with_timeout(timeout_ms))
        .wait_for(description, predicate)
        .await
}
