//! # uhsledger-config
//!
//! Plain configuration structs consumed by the rest of the workspace.
//! Loading these from a file or environment is explicitly out of scope here
//! (see the top-level `SPEC_FULL.md`) — callers build these by hand or via
//! `serde` from whatever source they choose; this crate only defines the
//! shape and validates it.

mod error;
mod locking_shard;
mod retry;
mod sentinel;

pub use error::ConfigError;
pub use locking_shard::LockingShardConfig;
pub use retry::RetryPolicy;
pub use sentinel::SentinelConfig;

use serde::{Deserialize, Serialize};

/// Settings shared across the atomizer pipeline: how many blocks of spent
/// ids the atomizer keeps around to reject double-notifications, and how
/// long a ctx is allowed to wait for full attestation before eviction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomizerConfig {
    /// Depth (in blocks) of the rolling spent-id cache.
    pub spent_cache_depth: u64,
    /// Number of block heights a ctx's aggregate may lag behind the current
    /// watermark before it is evicted as incomplete.
    pub eviction_window: u64,
}

impl AtomizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spent_cache_depth == 0 {
            return Err(ConfigError::ZeroField("spent_cache_depth"));
        }
        if self.eviction_window == 0 {
            return Err(ConfigError::ZeroField("eviction_window"));
        }
        Ok(())
    }
}

/// Settings for the coordinator's 2PC driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    pub retry: RetryPolicy,
    /// Bound on the completed-dtx cache used to answer idempotent `get`s.
    pub completed_cache_capacity: usize,
}

impl CoordinatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate()?;
        if self.completed_cache_capacity == 0 {
            return Err(ConfigError::ZeroField("completed_cache_capacity"));
        }
        Ok(())
    }
}
