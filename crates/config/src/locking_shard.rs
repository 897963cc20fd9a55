use serde::{Deserialize, Serialize};
use uhsledger_primitives::ShardRange;

use crate::error::ConfigError;

/// Settings for a single locking shard, matching the constructor parameters
/// of `locking_shard.cpp` (range, preseed, attestation policy, audit cadence).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockingShardConfig {
    pub range: ShardRange,
    /// Minimum number of valid attestations a ctx must carry before its
    /// inputs can be locked.
    pub attestation_threshold: usize,
    /// Epoch interval at which the audit task computes and logs the running
    /// UHS value sum and prunes spent elements below it.
    pub audit_interval: u64,
    /// Capacity of the shard-local completed-tx cache (`completed_tx`),
    /// matching `completed_txs_cache_size` in `locking_shard.cpp`'s
    /// constructor — oldest entries are evicted once this is exceeded.
    pub completed_txs_cache_size: usize,
    /// Path to a preseed file of serialized UHS elements to load at startup,
    /// or `None` to start from an empty UHS.
    pub preseed_path: Option<String>,
    /// Path to append one `"{epoch} {summary}"` line to on every epoch the
    /// audit runs at, or `None` to skip writing the audit trail.
    pub audit_log_path: Option<String>,
}

impl LockingShardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audit_interval == 0 {
            return Err(ConfigError::ZeroField("audit_interval"));
        }
        Ok(())
    }
}
