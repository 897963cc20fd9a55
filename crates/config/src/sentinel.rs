use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Static-validity bounds a sentinel enforces on an incoming full transaction
/// before it ever produces a compact form, per `spec.md` §3's ctx invariant
/// ("inputs and outputs sizes are bounded, inputs are unique").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentinelConfig {
    pub max_inputs: usize,
    pub max_outputs: usize,
}

impl SentinelConfig {
    pub const DEFAULT: SentinelConfig = SentinelConfig {
        max_inputs: 256,
        max_outputs: 256,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_inputs == 0 {
            return Err(ConfigError::ZeroField("max_inputs"));
        }
        if self.max_outputs == 0 {
            return Err(ConfigError::ZeroField("max_outputs"));
        }
        Ok(())
    }
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_max_inputs() {
        let cfg = SentinelConfig { max_inputs: 0, max_outputs: 8 };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn default_is_valid() {
        assert!(SentinelConfig::DEFAULT.validate().is_ok());
    }
}
