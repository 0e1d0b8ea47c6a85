//! Retry loop: run a closure until success or the policy says stop.

use rand::Rng;
use thiserror::Error;

use super::policy::{Classified, FailureKind, RetryDecision, RetryPolicy};
use super::sleep::Sleeper;

/// Why the retry loop stopped without a success.
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    /// Every allowed attempt failed with a retryable error.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: E },
    /// A non-retryable failure ended the loop early.
    #[error("abandoned on attempt {attempt} ({kind}): {error}")]
    Abandoned {
        attempt: u32,
        kind: FailureKind,
        error: E,
    },
}

impl<E: std::error::Error + 'static> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Abandoned { attempt, .. } => *attempt,
        }
    }
}

/// Runs `f` (given the 1-based attempt number) until it succeeds or the
/// retry policy says to stop. On retryable failure, sleeps for the backoff
/// duration then tries again.
pub fn run_with_retry<T, E, F, S, R>(
    policy: &RetryPolicy,
    sleeper: &mut S,
    rng: &mut R,
    mut f: F,
) -> Result<T, RetryError<E>>
where
    E: Classified + std::error::Error + 'static,
    F: FnMut(u32) -> Result<T, E>,
    S: Sleeper + ?Sized,
    R: Rng + ?Sized,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = e.kind();
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    %kind,
                    error = %e,
                    "attempt failed"
                );
                match policy.decide(attempt, kind, rng) {
                    RetryDecision::NoRetry if kind == FailureKind::RateLimited => {
                        return Err(RetryError::Exhausted { attempts: attempt, last: e });
                    }
                    RetryDecision::NoRetry => {
                        return Err(RetryError::Abandoned {
                            attempt,
                            kind,
                            error: e,
                        });
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::info!(
                            attempt,
                            wait_secs = d.as_secs_f64(),
                            "rate limited, backing off before retry"
                        );
                        sleeper.sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RecordingSleeper;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fmt;

    #[derive(Debug)]
    struct Fake(FailureKind);

    impl fmt::Display for Fake {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake {}", self.0)
        }
    }

    impl std::error::Error for Fake {}

    impl Classified for Fake {
        fn kind(&self) -> FailureKind {
            self.0
        }
    }

    #[test]
    fn success_first_try_never_sleeps() {
        let mut sleeper = RecordingSleeper::default();
        let mut rng = StdRng::seed_from_u64(1);
        let out: Result<u32, RetryError<Fake>> =
            run_with_retry(&RetryPolicy::default(), &mut sleeper, &mut rng, |a| Ok(a));
        assert_eq!(out.unwrap(), 1);
        assert!(sleeper.naps.is_empty());
    }

    #[test]
    fn rate_limited_retries_then_succeeds() {
        let mut sleeper = RecordingSleeper::default();
        let mut rng = StdRng::seed_from_u64(2);
        let out = run_with_retry(&RetryPolicy::default(), &mut sleeper, &mut rng, |a| {
            if a < 3 {
                Err(Fake(FailureKind::RateLimited))
            } else {
                Ok(a)
            }
        });
        assert_eq!(out.unwrap(), 3);
        assert_eq!(sleeper.naps.len(), 2);
    }

    #[test]
    fn rate_limited_every_time_exhausts_after_three() {
        let mut sleeper = RecordingSleeper::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut calls = 0;
        let policy = RetryPolicy::default();
        let out: Result<(), _> = run_with_retry(&policy, &mut sleeper, &mut rng, |_| {
            calls += 1;
            Err(Fake(FailureKind::RateLimited))
        });
        assert_eq!(calls, 3);
        assert!(matches!(out, Err(RetryError::Exhausted { attempts: 3, .. })));
        assert_eq!(sleeper.naps.len(), 2);
    }

    #[test]
    fn restricted_and_other_abandon_immediately() {
        for kind in [FailureKind::AccessRestricted, FailureKind::Other] {
            let mut sleeper = RecordingSleeper::default();
            let mut rng = StdRng::seed_from_u64(4);
            let mut calls = 0;
            let out: Result<(), _> =
                run_with_retry(&RetryPolicy::default(), &mut sleeper, &mut rng, |_| {
                    calls += 1;
                    Err(Fake(kind))
                });
            assert_eq!(calls, 1);
            assert!(sleeper.naps.is_empty());
            match out {
                Err(RetryError::Abandoned { attempt, kind: k, .. }) => {
                    assert_eq!(attempt, 1);
                    assert_eq!(k, kind);
                }
                other => panic!("expected Abandoned, got {other:?}"),
            }
        }
    }
}
