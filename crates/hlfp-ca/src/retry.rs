//! Retry policy for CA operations.
//!
//! The reference behavior during cluster bring-up is an unbounded fixed
//! 15-second backoff: the CA is expected to become ready eventually, and
//! provisioning simply waits for it. Callers that need a bound can opt into
//! a retry ceiling or a wall-clock deadline.

use hlfp_core::{ProvisionError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::warn;

/// Backoff strategy between retry attempts
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Constant delay between attempts
    Fixed(Duration),
    /// Doubling delay, capped at `max`
    Exponential {
        /// Delay before the first retry
        initial: Duration,
        /// Ceiling for the delay
        max: Duration,
    },
}

/// Retry configuration for transient CA failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Backoff strategy
    pub backoff: Backoff,
    /// Maximum retries; `None` retries indefinitely
    pub max_retries: Option<u32>,
    /// Wall-clock bound on the whole operation; `None` waits forever
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Backoff::Fixed(Duration::from_secs(15)),
            max_retries: None,
            deadline: None,
        }
    }
}

impl RetryPolicy {
    /// Fixed backoff, unbounded
    #[must_use]
    pub const fn fixed(delay: Duration) -> Self {
        Self {
            backoff: Backoff::Fixed(delay),
            max_retries: None,
            deadline: None,
        }
    }

    /// Exponential backoff, unbounded
    #[must_use]
    pub const fn exponential(initial: Duration, max: Duration) -> Self {
        Self {
            backoff: Backoff::Exponential { initial, max },
            max_retries: None,
            deadline: None,
        }
    }

    /// Cap the number of retries
    #[must_use]
    pub const fn max_retries(mut self, max: u32) -> Self {
        self.max_retries = Some(max);
        self
    }

    /// Bound total wait with a wall-clock deadline
    #[must_use]
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Calculate backoff for a given attempt
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial, max } => {
                let millis = (initial.as_millis() as u64).saturating_mul(2u64.saturating_pow(attempt));
                Duration::from_millis(millis.min(max.as_millis() as u64))
            }
        }
    }
}

/// Run `op`, retrying as long as it fails with a transient error.
///
/// Non-transient errors propagate immediately. When the policy's retry
/// ceiling or deadline is hit, the last transient error is surfaced inside
/// [`ProvisionError::DeadlineExceeded`].
pub async fn retry_transient<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => {
                let delay = policy.backoff_for(attempt);

                let ceiling_hit = policy.max_retries.is_some_and(|max| attempt >= max);
                let deadline_hit = policy
                    .deadline
                    .is_some_and(|deadline| started.elapsed() + delay >= deadline);
                if ceiling_hit || deadline_hit {
                    return Err(ProvisionError::DeadlineExceeded {
                        attempts: attempt + 1,
                        last_error: err.to_string(),
                    });
                }

                warn!(what, attempt, delay_secs = delay.as_secs(), error = %err, "transient failure, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
