#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("field {0} must be non-zero")]
    ZeroField(&'static str),

    #[error("invalid shard range: {0}")]
    InvalidShardRange(String),

    #[error("attestation threshold {threshold} exceeds attester count {attesters}")]
    ThresholdTooHigh { threshold: usize, attesters: usize },
}
