use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which failures count as retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryOn {
    /// Transport errors and non-2xx responses are both retried.
    #[default]
    Any,
    /// Only transport errors are retried; a non-2xx response is handed back
    /// to the caller unchanged.
    Transport,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry; the attempt budget is spent.
    NoRetry,
    /// Retry after the given delay (zero = immediately).
    RetryAfter(Duration),
}

/// Bounded retry policy with a fixed (default zero) delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
    pub retry_on: RetryOn,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::ZERO,
            retry_on: RetryOn::Any,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_attempts` attempts and the other fields defaulted.
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Decide what to do after attempt number `attempt` (1-based) failed.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay)
    }

    /// True when a response with this status should be treated as a failed attempt.
    pub fn status_is_failure(&self, status: u32) -> bool {
        self.retry_on == RetryOn::Any && !(200..300).contains(&status)
    }
}
