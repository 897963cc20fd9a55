//! # uhsledger-locking-shard
//!
//! The two-phase-commit locking shard from `spec.md` §4.3: one slice of the
//! UHS, keyed by shard range, with the lock/apply/discard lifecycle the
//! coordinator drives per dtx and a periodic audit that checksums the
//! unspent set and prunes spent elements below it.

mod audit;
mod command;
mod error;
mod preseed;
mod shard;
mod snapshot;
mod state_machine;

pub use audit::{run_audit, AuditOutcome};
pub use command::{LockingShardCommand, LockingShardResponse};
pub use error::LockError;
pub use preseed::{load_preseed_file, write_preseed_file, PreseedElement};
pub use shard::LockingShard;
pub use snapshot::ShardSnapshot;
pub use state_machine::LockingShardStateMachine;
