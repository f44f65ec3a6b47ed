//! Bounded retry against an eventually consistent resource.
//!
//! Fixed number of attempts with a fixed pause between them; no backoff and
//! no cancellation. Pauses go through a [`Clock`].

use std::time::Duration;

use thiserror::Error;

/// Source of blocking pauses between attempts.
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Clock backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Attempt budget for [`retry_with_delay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between two consecutive attempts.
    pub interval: Duration,
}

impl RetryPolicy {
    /// Budget used while waiting for a freshly minted case handle to become
    /// selectable: 20 attempts spaced 0.5 s apart (~10 s ceiling).
    pub const CASE_VISIBILITY: Self = Self {
        max_attempts: 20,
        interval: Duration::from_millis(500),
    };

    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on the time spent sleeping when every attempt fails.
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::CASE_VISIBILITY
    }
}

/// Every attempt failed.
#[derive(Error, Debug)]
#[error("gave up after {attempts} attempts: {last_error}")]
pub struct RetryExhausted<E: std::fmt::Display> {
    pub attempts: u32,
    pub last_error: E,
}

/// Run `action` until it succeeds or the policy's attempt budget is spent.
///
/// `action` receives the 1-based attempt number. The clock is asked to sleep
/// between attempts only, never after the last one.
pub fn retry_with_delay<T, E, F>(
    policy: RetryPolicy,
    clock: &mut dyn Clock,
    mut action: F,
) -> Result<T, RetryExhausted<E>>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match action(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => {
                return Err(RetryExhausted {
                    attempts: attempt,
                    last_error: err,
                });
            }
            Err(_) => {
                clock.sleep(policy.interval);
                attempt += 1;
            }
        }
    }
}
