//! Backoff schedule for rate-limited task invocations.

use std::time::Duration;

/// How the runner waits out rate limits.
///
/// The delay before retry `n` (0-based) is `initial_backoff * multiplier^n`,
/// capped at `max_backoff`. After `max_attempts` invocations of the same task
/// the run fails with [`ErrorKind::ExhaustedRetries`](crate::core::error::ErrorKind).
///
/// The default waits a fixed 10 s before every retry and gives up after six
/// attempts. Use [`RetryPolicy::exponential`] for a doubling schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
    /// Total invocations per task, the first one included. Never below 1.
    pub max_attempts: u32,
}

pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy {
    /// Backoff doubling from `initial_backoff` up to [`DEFAULT_MAX_BACKOFF`].
    pub fn exponential(initial_backoff: Duration, max_attempts: u32) -> Self {
        Self {
            initial_backoff,
            multiplier: 2.0,
            max_backoff: DEFAULT_MAX_BACKOFF,
            max_attempts,
        }
    }

    /// The same `interval` before every retry. Provider hints may still wait
    /// up to [`DEFAULT_MAX_BACKOFF`].
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            initial_backoff: interval,
            multiplier: 1.0,
            max_backoff: interval.max(DEFAULT_MAX_BACKOFF),
            max_attempts,
        }
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before the `retry`-th retry (0-based), ignoring any provider hint.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(retry.min(i32::MAX as u32) as i32);
        let secs = self.initial_backoff.as_secs_f64() * factor;
        let cap = self.max_backoff.max(self.initial_backoff);

        if !secs.is_finite() || secs >= cap.as_secs_f64() {
            cap
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Delay before the `retry`-th retry, preferring the provider's
    /// `Retry-After` hint when there is one. Hints are capped like computed delays.
    pub fn delay_for(&self, retry: u32, hint: Option<Duration>) -> Duration {
        match hint {
            Some(hint) => hint.min(self.max_backoff.max(self.initial_backoff)),
            None => self.backoff(retry),
        }
    }
}
