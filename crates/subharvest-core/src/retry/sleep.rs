//! Blocking sleeps, behind a trait so tests can observe them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use super::policy::jitter;

/// Something that can block the current thread for a duration.
pub trait Sleeper {
    fn sleep(&mut self, d: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, d: Duration) {
        tracing::trace!(secs = d.as_secs_f64(), "sleeping");
        std::thread::sleep(d);
    }
}

/// Records requested sleeps without blocking (dry runs and tests).
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    pub naps: Vec<Duration>,
}

impl RecordingSleeper {
    pub fn total(&self) -> Duration {
        self.naps.iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, d: Duration) {
        self.naps.push(d);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &mut S {
    fn sleep(&mut self, d: Duration) {
        (**self).sleep(d);
    }
}

/// Sleeper plus the randomness that sizes its sleeps.
#[derive(Debug, Clone)]
pub struct Pacer<S = ThreadSleeper, R = StdRng> {
    pub sleeper: S,
    pub rng: R,
}

impl Pacer {
    /// Real sleeps, entropy-seeded jitter.
    pub fn new() -> Self {
        Self {
            sleeper: ThreadSleeper,
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sleeper, R: Rng> Pacer<S, R> {
    pub fn with(sleeper: S, rng: R) -> Self {
        Self { sleeper, rng }
    }

    /// Sleeps a uniformly random duration in `[lo, hi]` and returns it.
    pub fn pause_between(&mut self, lo: Duration, hi: Duration) -> Duration {
        let d = jitter(&mut self.rng, lo, hi);
        self.sleeper.sleep(d);
        d
    }
}
