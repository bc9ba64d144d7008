//! Retry with linear backoff for Hub API requests

use std::time::Duration;

/// Attempt budget and backoff unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Linear backoff: `backoff_unit * attempt` (10s, 20s, 30s, ...)
    ///
    /// `attempt` is the 1-based number of the attempt that just failed.
    pub fn wait_for(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

/// Where a retrying request stands.
///
/// `T` is the success payload.
#[derive(Debug, PartialEq)]
pub enum RetryState<T> {
    Attempting { attempt: u32 },
    Backoff { attempt: u32, wait: Duration },
    Succeeded(T),
    Exhausted { attempts: u32 },
}

impl<T> RetryState<T> {
    pub fn start() -> Self {
        Self::Attempting { attempt: 1 }
    }

    /// Next state after attempt `attempt` failed with a retryable error.
    ///
    /// The final attempt goes straight to `Exhausted` without waiting.
    pub fn after_failure(policy: &RetryPolicy, attempt: u32) -> Self {
        if attempt >= policy.max_attempts {
            Self::Exhausted { attempts: attempt }
        } else {
            Self::Backoff {
                attempt,
                wait: policy.wait_for(attempt),
            }
        }
    }
}

/// Blocking wait between attempts
pub trait Sleeper {
    fn sleep(&self, wait: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, wait: Duration) {
        std::thread::sleep(wait);
    }
}
