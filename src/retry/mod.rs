//! Retry policy for version conflicts.
//!
//! Only lost-update races are retried. Missing records, failed
//! preconditions and store errors are terminal on the first attempt.

mod cancel;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub use cancel::CancelToken;

/// Delay schedule between conflicting attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// Same delay after every conflict.
    Fixed { delay_ms: u64 },
    /// `base_ms` after the first conflict, doubling after each further one, capped at `max_ms`.
    Exponential { base_ms: u64, max_ms: u64 },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential {
            base_ms: 5,
            max_ms: 100,
        }
    }
}

impl Backoff {
    /// Delay to wait after the conflict on attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Backoff::Exponential { base_ms, max_ms } => {
                let base = base_ms.max(1);
                let cap = max_ms.max(base);

                let mut backoff = base;
                for _ in 1..attempt {
                    backoff = backoff.saturating_mul(2).min(cap);
                }
                Duration::from_millis(backoff)
            }
        }
    }
}

/// Bounds and pacing for conflict retries.
///
/// Loadable from JSON; missing fields take their defaults:
///
/// ```ignore
/// let policy = RetryPolicy::from_json(r#"{
///     "max_attempts": 5,
///     "backoff": { "kind": "fixed", "delay_ms": 2 }
/// }"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Time budget for one call. Checked before each attempt and before each
    /// backoff wait; a wait that would cross it ends the call instead. A
    /// store call already in flight is never interrupted.
    pub timeout_ms: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
            timeout_ms: None,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a policy from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the maximum number of attempts per call.
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set the delay schedule between conflicting attempts.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Bound the total wall time of one call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().min(u64::MAX as u128) as u64);
        self
    }

    /// Effective attempt limit.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether another attempt may follow a conflict on `attempt`.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.attempts()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Whether a call started at `started` has run out of time.
    pub fn expired(&self, started: Instant) -> bool {
        self.timeout()
            .is_some_and(|timeout| started.elapsed() >= timeout)
    }

    /// Time left for a call started at `started`. `None` without a timeout.
    pub fn remaining(&self, started: Instant) -> Option<Duration> {
        self.timeout()
            .map(|timeout| timeout.saturating_sub(started.elapsed()))
    }

    /// Whether waiting `delay` now would leave no budget for another attempt.
    pub fn delay_overruns(&self, started: Instant, delay: Duration) -> bool {
        self.remaining(started)
            .is_some_and(|remaining| delay >= remaining)
    }
}
