//! Retry with exponential backoff
//!
//! Only attempts that never got a response are retried. A timed-out attempt
//! may still have been delivered, so it ends the loop immediately.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{ClientError, Result};

/// Why a single attempt produced no response
#[derive(Debug, Clone)]
pub enum AttemptFailure {
    /// The per-attempt deadline passed
    TimedOut(Duration),
    /// Connection could not be established or broke before a response
    Unreachable(String),
}

/// How many times to retry and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub attempts: u32,
    /// Delay before the first retry; doubled for every further retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    /// Total number of attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.attempts.saturating_add(1)
    }

    /// Delay after failed attempt `attempt` (0-based): `base * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Runs `op` until it yields a response, times out, or retries run out.
    ///
    /// `target` names what is being contacted and ends up in the error.
    pub async fn run<T, F, Fut>(&self, target: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, AttemptFailure>>,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(AttemptFailure::TimedOut(after)) => {
                    return Err(ClientError::Timeout {
                        target: target.to_string(),
                        timeout_ms: after.as_millis() as u64,
                    });
                }
                Err(AttemptFailure::Unreachable(detail)) => {
                    if attempt >= self.attempts {
                        return Err(ClientError::Connectivity {
                            target: target.to_string(),
                            detail,
                        });
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        "Retry {}/{} for {} in {}ms: {}",
                        attempt + 1,
                        self.attempts,
                        target,
                        delay.as_millis(),
                        detail
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
