//! Retry budget and backoff for failed country fetches.
//!
//! The query cache consults [`RetryConfig`] after every failed attempt. The
//! default allows exactly one retry, one second after the first failure.

use std::time::Duration;

/// Wait between two fetch attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same wait before every retry.
    Fixed { delay: Duration },
    /// `initial * multiplier^retry`, never above `cap`. With `jitter` the
    /// result is scaled by a random factor in `[0.5, 1.5)`.
    Exponential {
        initial: Duration,
        multiplier: u32,
        cap: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            initial: Duration::from_secs(1),
            multiplier: 2,
            cap: Duration::from_secs(30),
            jitter: false,
        }
    }
}

impl Backoff {
    /// Wait before retry number `retry` (0 for the first retry).
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                initial,
                multiplier,
                cap,
                jitter,
            } => {
                let grown = multiplier
                    .checked_pow(retry)
                    .and_then(|factor| initial.checked_mul(factor))
                    .map_or(cap, |delay| delay.min(cap));

                if jitter {
                    grown.mul_f64(0.5 + fastrand::f64())
                } else {
                    grown
                }
            }
        }
    }
}

/// How often the query cache retries a failed fetch, and how long it waits.
///
/// All failure kinds are retried alike.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::exponential(1)
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            enabled: true,
            max_retries,
            backoff: Backoff::default(),
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            enabled: true,
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            backoff: Backoff::default(),
        }
    }

    /// Whether one more retry is allowed after `retries_so_far` retries.
    pub const fn should_retry(&self, retries_so_far: u32) -> bool {
        self.enabled && retries_so_far < self.max_retries
    }

    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }

    /// Upper bound on source calls for one fetch.
    pub const fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.max_retries.saturating_add(1)
        } else {
            1
        }
    }
}
