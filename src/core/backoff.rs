use std::time::Duration;

/// Delay schedule between consecutive status polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub initial: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Backoff {
    pub fn fixed(delay: Duration) -> Self {
        Self { initial: delay, multiplier: 1, max_delay: delay }
    }

    pub fn exponential(initial: Duration, max_delay: Duration) -> Self {
        Self { initial, multiplier: 2, max_delay: max_delay.max(initial) }
    }

    /// Infinite sequence of delays, each capped at `max_delay`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let Backoff { initial, multiplier, max_delay } = *self;
        std::iter::successors(Some(initial.min(max_delay)), move |delay| {
            Some(delay.saturating_mul(multiplier).min(max_delay))
        })
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::fixed(Duration::from_secs(5))
    }
}
