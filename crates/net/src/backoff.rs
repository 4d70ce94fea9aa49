//! Backoff calculations for repeated transport failures

use std::time::Duration;
use taskwatch_config::NetworkConfig;

/// Bounded exponential backoff with jitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Fraction of the delay used as random spread (0 disables jitter)
    pub jitter_factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&NetworkConfig::default())
    }
}

impl BackoffPolicy {
    #[must_use]
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_backoff_ms),
            max_delay: Duration::from_millis(config.max_backoff_ms),
            multiplier: config.backoff_multiplier,
            jitter_factor: config.jitter_factor,
        }
    }

    /// Same policy without the random spread
    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.jitter_factor = 0.0;
        self
    }

    /// Delay to wait after the `attempt`-th consecutive failure (1-based)
    ///
    /// Attempt 0 means no failure yet and yields a zero delay.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_delay = {
            // Precision loss acceptable for backoff calculations
            #[allow(clippy::cast_precision_loss)]
            {
                self.initial_delay.as_millis().min(u128::from(u64::MAX)) as f64
            }
        };
        let max_delay = {
            #[allow(clippy::cast_precision_loss)]
            {
                self.max_delay.as_millis().min(u128::from(u64::MAX)) as f64
            }
        };

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let delay = (base_delay * self.multiplier.powi(exponent)).min(max_delay);

        let jitter = if self.jitter_factor > 0.0 {
            delay * self.jitter_factor * (rand::random::<f64>() - 0.5)
        } else {
            0.0
        };
        let final_delay = {
            // Safe cast: max(0.0) ensures non-negative, round() handles fractional part
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                (delay + jitter).clamp(0.0, max_delay).round() as u64
            }
        };

        Duration::from_millis(final_delay)
    }
}
