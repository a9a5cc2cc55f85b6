// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry support for flaky automation operations.
//!
//! Browser-driven mutations fail for reasons that clear themselves on the
//! next attempt (slow page loads, transient form state). [`retry`] wraps an
//! async operation with a bounded number of attempts, exponential backoff,
//! and a small random jitter so concurrent retries do not synchronize.

use std::future::Future;
use std::time::Duration;

use pricewatch_core::PricewatchError;
use rand::Rng;
use tracing::warn;

/// Bounded-attempt retry schedule with exponential backoff and jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_factor: f64,
    /// Relative jitter applied to each delay, in `[0.0, 1.0]`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Override the attempt count, keeping the default schedule.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Delay before attempt `next_attempt` (1-based), jitter applied.
    fn delay_before(&self, next_attempt: u32) -> Duration {
        let base =
            self.initial_delay.as_secs_f64() * self.backoff_factor.powi(next_attempt as i32 - 2);
        let jitter = if self.jitter > 0.0 {
            rand::thread_rng().gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        Duration::from_secs_f64((base * (1.0 + jitter)).max(0.0))
    }
}

/// Run `operation` up to `policy.max_attempts` times, sleeping between
/// attempts per the policy's backoff schedule.
///
/// Returns the first success, or the error from the final attempt.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, PricewatchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PricewatchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                let delay = policy.delay_before(attempt + 1);
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(
                    operation = operation_name,
                    attempts = attempt,
                    error = %err,
                    "operation failed, attempts exhausted"
                );
                return Err(err);
            }
        }
    }
}
