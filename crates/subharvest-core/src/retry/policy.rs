use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{secs_range, RetryConfig};

/// Classification of a playlist-level fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Server asked us to slow down (HTTP 429).
    RateLimited,
    /// Private or otherwise unavailable content; retrying will not help.
    AccessRestricted,
    /// Anything else.
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FailureKind::RateLimited => "rate limited",
            FailureKind::AccessRestricted => "access restricted",
            FailureKind::Other => "other",
        })
    }
}

/// Errors that carry their own retry classification.
pub trait Classified {
    fn kind(&self) -> FailureKind;
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop retrying and report the failure.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Linear randomized backoff: `uniform(min, max) * attempt` for rate limits,
/// no retry for anything else.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Lower bound of the random backoff factor.
    pub backoff_min: Duration,
    /// Upper bound of the random backoff factor.
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        let (backoff_min, backoff_max) = secs_range(cfg.backoff_min_secs, cfg.backoff_max_secs);
        Self {
            max_attempts: cfg.max_attempts.max(1),
            backoff_min,
            backoff_max,
        }
    }

    /// Decide what to do after `attempt` (1-based) failed with `kind`.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        attempt: u32,
        kind: FailureKind,
        rng: &mut R,
    ) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            FailureKind::AccessRestricted | FailureKind::Other => RetryDecision::NoRetry,
            FailureKind::RateLimited => {
                let base = jitter(rng, self.backoff_min, self.backoff_max);
                RetryDecision::RetryAfter(base.saturating_mul(attempt))
            }
        }
    }
}

/// Uniformly random duration in `[lo, hi]`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, lo: Duration, hi: Duration) -> Duration {
    if hi <= lo {
        return lo;
    }
    Duration::from_secs_f64(rng.gen_range(lo.as_secs_f64()..=hi.as_secs_f64()))
}
