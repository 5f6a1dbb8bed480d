/// Clock, sleep and jitter used to pace requests against the suggestion service.
///
/// Every delay in the pipeline goes through [`Pacing`], so tests can swap the tokio
/// clock for a virtual one and the OS random source for a seeded one.
use std::future::Future;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inclusive bounds for a randomized delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    pub const fn from_secs(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    pub fn contains(&self, duration: Duration) -> bool {
        duration >= self.min && duration <= self.max
    }
}

/// Source of time for the pacing logic.
pub trait Pacer {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct Pacing<P, R> {
    pacer: P,
    rng: R,
}

impl Pacing<TokioPacer, StdRng> {
    /// Real clock and an OS-seeded random source.
    pub fn system() -> Self {
        Self::new(TokioPacer, StdRng::from_os_rng())
    }
}

impl<P: Pacer, R: Rng> Pacing<P, R> {
    pub fn new(pacer: P, rng: R) -> Self {
        Self { pacer, rng }
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn now(&self) -> Instant {
        self.pacer.now()
    }

    /// Draw a uniformly distributed delay from `range`.
    pub fn jitter(&mut self, range: DelayRange) -> Duration {
        if range.max <= range.min {
            return range.min;
        }
        let secs = self
            .rng
            .random_range(range.min.as_secs_f64()..=range.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Pick an index in `0..len`. `len` must be non-zero.
    pub fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    pub async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            self.pacer.sleep(duration).await;
        }
    }

    /// Sleep for a random delay drawn from `range` and return how long that was.
    pub async fn pause(&mut self, range: DelayRange) -> Duration {
        let delay = self.jitter(range);
        self.sleep(delay).await;
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePacer;

    fn seeded() -> Pacing<FakePacer, StdRng> {
        Pacing::new(FakePacer::new(), StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let mut pacing = seeded();
        let range = DelayRange::from_millis(1_500, 3_000);
        for _ in 0..200 {
            assert!(range.contains(pacing.jitter(range)));
        }
    }

    #[test]
    fn test_jitter_degenerate_range() {
        let mut pacing = seeded();
        let range = DelayRange::from_secs(10, 10);
        assert_eq!(pacing.jitter(range), Duration::from_secs(10));
    }

    #[test]
    fn test_pick_in_bounds() {
        let mut pacing = seeded();
        for _ in 0..100 {
            assert!(pacing.pick(4) < 4);
        }
    }

    #[tokio::test]
    async fn test_pause_advances_virtual_clock() {
        let mut pacing = seeded();
        let before = pacing.now();
        let slept = pacing.pause(DelayRange::from_secs(1, 2)).await;

        assert_eq!(pacing.now() - before, slept);
        assert_eq!(pacing.pacer().sleeps(), vec![slept]);
    }

    #[tokio::test]
    async fn test_zero_sleep_is_skipped() {
        let pacing = seeded();
        pacing.sleep(Duration::ZERO).await;
        assert!(pacing.pacer().sleeps().is_empty());
    }
}
