use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Exponential backoff policy used by the coordinator and sentinel clients
/// when a shard or coordinator is transiently unreachable, grounded on the
/// original's ~100ms reconnect base doubling up to a 10s cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    pub const DEFAULT: RetryPolicy = RetryPolicy {
        base_delay_ms: 100,
        max_delay_ms: 10_000,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_delay_ms == 0 {
            return Err(ConfigError::ZeroField("base_delay_ms"));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(ConfigError::ZeroField("max_delay_ms"));
        }
        Ok(())
    }

    /// Doubles `current` (starting from `base_delay_ms` on the first call),
    /// capped at `max_delay_ms`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next = current.as_millis().saturating_mul(2).max(self.base_delay_ms as u128);
        Duration::from_millis(next.min(self.max_delay_ms as u128) as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
