//! Configuration for the flush engine.

use crate::telemetry::MAX_EVENTS;
use std::time::Duration;

/// Configuration for the flush engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Telemetry source recorded on engine events, e.g. "pos" or "kiosk".
    pub source: String,
    /// Retry/backoff behavior for transient failures.
    pub retry: RetryConfig,
    /// Maximum telemetry events retained.
    pub telemetry_capacity: usize,
}

impl EngineConfig {
    /// Creates a configuration for the given telemetry source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            retry: RetryConfig::default(),
            telemetry_capacity: MAX_EVENTS,
        }
    }

    /// Sets the retry configuration.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the telemetry capacity.
    #[must_use]
    pub fn with_telemetry_capacity(mut self, capacity: usize) -> Self {
        self.telemetry_capacity = capacity;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("sync-log")
    }
}

/// Backoff applied to items that failed transiently.
///
/// Each failed attempt pushes the item's `next_attempt_at` further out so
/// repeated flushes don't hammer a genuinely down endpoint.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Ceiling on the computed delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub add_jitter: bool,
}

impl RetryConfig {
    /// Creates the default backoff: 5s doubling up to 10min, with jitter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(600),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    /// Disables backoff entirely; every flush retries immediately.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            add_jitter: false,
        }
    }

    /// Sets the initial delay.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates the delay after `attempt` failed attempts (1-indexed).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_delay = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);

        let delay_secs = base_delay.min(self.max_delay.as_secs_f64());

        if self.add_jitter {
            // Up to 25% jitter
            let jitter = delay_secs * 0.25 * rand_jitter();
            Duration::from_secs_f64(delay_secs + jitter)
        } else {
            Duration::from_secs_f64(delay_secs)
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple deterministic "jitter" (no external RNG dependency).
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_builder() {
        let config = EngineConfig::new("kiosk")
            .with_retry(RetryConfig::immediate())
            .with_telemetry_capacity(10);

        assert_eq!(config.source, "kiosk");
        assert_eq!(config.telemetry_capacity, 10);
        assert_eq!(config.retry.initial_delay, Duration::ZERO);
    }

    #[test]
    fn no_delay_before_first_attempt() {
        assert_eq!(RetryConfig::new().delay_for_attempt(0), Duration::ZERO);
    }

    #[test]
    fn delays_grow_exponentially() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            add_jitter: false,
        };

        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn delay_respects_max() {
        let config = RetryConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 10.0,
            add_jitter: false,
        };

        assert_eq!(config.delay_for_attempt(6), Duration::from_secs(5));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            add_jitter: true,
        };

        let delay = config.delay_for_attempt(1);
        assert!(delay >= Duration::from_millis(100));
        assert!(delay <= Duration::from_millis(125));
    }
}
