use std::time::Duration;

use rand::Rng;

/* ---------- */

/// Simulates the time a worker spends on an item.
///
/// Delays are purely cosmetic: workers behave the same whatever the strategy, so tests can use
/// [`NoDelay`] to run as fast as possible.
pub trait Delay: Send + Sync {
    /// Blocks the calling thread for a while.
    fn pause(&self);
}

/* ---------- */

/// Doesn't wait at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl Delay for NoDelay {
    #[inline]
    fn pause(&self) {}
}

/* ---------- */

/// Sleeps for a random duration in `[0, max)`.
#[derive(Debug, Clone, Copy)]
pub struct RandomDelay {
    max: Duration,
}

impl RandomDelay {
    /// Returns a delay sleeping at most `max`.
    #[inline]
    pub fn new(max: Duration) -> Self {
        Self { max }
    }

    /// Returns the upper bound of the sleeps.
    #[inline]
    pub fn max(&self) -> Duration {
        self.max
    }

    #[inline]
    fn pick(&self) -> Duration {
        let max = self.max.as_micros().min(u64::MAX as u128) as u64;
        if max == 0 {
            return Duration::ZERO;
        }

        Duration::from_micros(rand::thread_rng().gen_range(0..max))
    }
}

impl Default for RandomDelay {
    /// Up to one second, like a slow assembly line.
    #[inline]
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Delay for RandomDelay {
    #[inline]
    fn pause(&self) {
        let duration = self.pick();
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/* ---------- */
