//! Bounded retry policy for tool calls
//!
//! One call makes at most `max_attempts` tries. Between tries the client
//! sleeps for the delay this policy computes; which failures earn another
//! try is decided by [`RetryOn`].

use super::transport::TransportError;
use crate::config::{Backoff, ClientConfig, RetryOn};
use std::fmt;
use std::time::Duration;

/// Why a single attempt did not produce a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Server answered with something other than 200
    Status { status: u16, body: String },
    /// No HTTP response at all
    Transport(TransportError),
    /// 200, but the body was not JSON
    Decode { message: String, body: String },
}

impl AttemptFailure {
    /// Text carried into the final error
    pub fn detail(&self) -> String {
        match self {
            AttemptFailure::Status { body, .. } => body.clone(),
            AttemptFailure::Transport(err) => err.to_string(),
            AttemptFailure::Decode { message, .. } => {
                format!("invalid JSON in response body: {}", message)
            }
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Status { status, body } => write!(f, "status {}: {}", status, body),
            other => write!(f, "{}", other.detail()),
        }
    }
}

/// Retry settings derived from [`ClientConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
    pub retry_on: RetryOn,
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay,
            backoff: config.backoff,
            retry_on: config.retry_on,
        }
    }

    /// Whether this kind of failure is worth another try
    pub fn is_retryable(&self, failure: &AttemptFailure) -> bool {
        match self.retry_on {
            RetryOn::All => true,
            RetryOn::Transient => match failure {
                AttemptFailure::Status { status, .. } => is_transient_status(*status),
                AttemptFailure::Transport(_) | AttemptFailure::Decode { .. } => true,
            },
        }
    }

    /// Whether attempt `attempt` (0-based) may be followed by another
    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }

    /// Pause after the failed attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { max_delay, jitter } => {
                let capped = exponential_delay(self.delay, attempt, max_delay);
                if jitter {
                    apply_jitter(capped)
                } else {
                    capped
                }
            }
        }
    }

    /// Worst-case wall clock for one call, ignoring jitter
    pub fn total_budget(&self, timeout: Duration) -> Duration {
        let waits: Duration = (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| match self.backoff {
                Backoff::Fixed => self.delay,
                Backoff::Exponential { max_delay, .. } => {
                    exponential_delay(self.delay, attempt, max_delay)
                }
            })
            .sum();
        timeout * self.max_attempts + waits
    }
}

/// 408, 429 and 5xx may succeed on resubmission
pub fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || status >= 500
}

fn exponential_delay(base: Duration, attempt: u32, max_delay: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    base.checked_mul(factor).unwrap_or(max_delay).min(max_delay)
}

// +/-25% random variation
fn apply_jitter(delay: Duration) -> Duration {
    let millis = delay.as_millis() as f64;
    let jitter = millis / 4.0;
    let offset = (rand::random::<f64>() * 2.0 - 1.0) * jitter;
    Duration::from_millis((millis + offset).max(0.0) as u64)
}
