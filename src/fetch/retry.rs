//! Retry policy for images lookups
//!
//! Exponential backoff with an upper cap and optional jitter. Delays are
//! computed per attempt so the worker can sleep between retries of the same
//! job without any shared state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::duration_serde;
use crate::utils::jitter::jitter_percent;

/// Jitter ceiling as a percentage of the computed delay
const JITTER_PERCENT: u8 = 25;

/// Retry configuration for transient fetch failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per job, the first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt
    #[serde(default = "default_initial_delay", with = "duration_serde::duration")]
    pub initial_delay: Duration,
    /// Ceiling the exponential growth is capped at
    #[serde(default = "default_max_delay", with = "duration_serde::duration")]
    pub max_delay: Duration,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Spread delays so retries of independent jobs do not align
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay() -> Duration {
    Duration::from_millis(300)
}
fn default_max_delay() -> Duration {
    Duration::from_secs(5)
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_jitter() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl RetryConfig {
    /// Delay to sleep after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped_ms = (base_ms as u64).min(self.max_delay.as_millis() as u64);

        let total_ms = if self.jitter {
            capped_ms + jitter_percent(capped_ms, JITTER_PERCENT)
        } else {
            capped_ms
        };

        Duration::from_millis(total_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn no_jitter() -> RetryConfig {
        RetryConfig {
            jitter: false,
            ..RetryConfig::default()
        }
    }

    #[test]
    fn delays_grow_exponentially() {
        let config = no_jitter();
        assert_eq!(config.delay_for(1), Duration::from_millis(300));
        assert_eq!(config.delay_for(2), Duration::from_millis(600));
        assert_eq!(config.delay_for(3), Duration::from_millis(1200));
    }

    #[test]
    fn delays_are_capped_at_max_delay() {
        let config = no_jitter();
        assert_eq!(config.delay_for(10), Duration::from_secs(5));
    }

    #[test]
    fn jitter_stays_within_a_quarter_of_the_base() {
        let config = RetryConfig::default();
        for _ in 0..100 {
            let delay = config.delay_for(2);
            assert!(delay >= Duration::from_millis(600));
            assert!(delay <= Duration::from_millis(750));
        }
    }

    proptest! {
        #[test]
        fn delay_never_exceeds_max_plus_jitter(attempt in 1u32..20, max_ms in 100u64..10_000) {
            let config = RetryConfig {
                max_delay: Duration::from_millis(max_ms),
                ..RetryConfig::default()
            };
            let ceiling = max_ms + max_ms * JITTER_PERCENT as u64 / 100;
            prop_assert!(config.delay_for(attempt) <= Duration::from_millis(ceiling));
        }

        #[test]
        fn delays_are_monotone_without_jitter(attempt in 1u32..19) {
            let config = no_jitter();
            prop_assert!(config.delay_for(attempt) <= config.delay_for(attempt + 1));
        }
    }
}
