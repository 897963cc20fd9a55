//! # uhsledger-replog
//!
//! The replicated-log primitive every state machine in this workspace is
//! built on top of. The consensus algorithm itself is explicitly out of
//! scope (see `SPEC_FULL.md` section 4.1) — this crate assumes one exists
//! and gives the rest of the workspace a trait, [`ReplicatedLog`], to code
//! against, plus a single-process simulation, [`ReplicaSet`], good enough to
//! exercise leader failover and snapshot recovery in tests without a real
//! consensus library.

mod error;
mod replica_set;
mod snapshot;
mod state_machine;

pub use error::ReplogError;
pub use replica_set::{LocalReplicatedLog, ReplicaHandle, ReplicaSet};
pub use snapshot::{FileSnapshotStore, SnapshotStore};
pub use state_machine::StateMachine;

use async_trait::async_trait;

/// A replicated, ordered command log driving a [`StateMachine`]. Every
/// concrete component (atomizer, locking shard, coordinator) is generic over
/// this trait so a real consensus implementation can be substituted later
/// without touching business logic.
///
/// Parameterized over the `StateMachine` itself, not just its `Command`
/// type, so that `replicate` can hand back the actual response the state
/// machine produced — matching the callback a real consensus log invokes
/// once an entry commits, rather than leaving callers to re-derive the
/// result from a bare log index.
#[async_trait]
pub trait ReplicatedLog<SM>: Send + Sync
where
    SM: StateMachine,
{
    /// Submits `cmd` for replication. Resolves once a majority has durably
    /// accepted it, with the log index it was committed at and the state
    /// machine's response. Returns [`ReplogError::NotLeader`] immediately if
    /// this node isn't currently leading — callers are expected to
    /// redirect/retry elsewhere, matching the "not_leader" category in the
    /// error taxonomy.
    async fn replicate(&self, cmd: SM::Command) -> Result<(u64, SM::Response), ReplogError>;

    fn is_leader(&self) -> bool;

    fn last_commit_index(&self) -> u64;

    /// Installs a snapshot as this replica's starting point, matching
    /// `apply_snapshot` in the original: used during recovery/catch-up, not
    /// part of the steady-state replicate path.
    async fn install_snapshot(&self, log_index: u64, bytes: &[u8]) -> Result<(), ReplogError>;

    /// Reads the most recently installed/taken snapshot, if any.
    async fn read_snapshot(&self) -> Result<Option<(u64, Vec<u8>)>, ReplogError>;

    /// Reads this node's state machine directly, without going through
    /// `replicate` or spending a log index — the mechanism a newly-elected
    /// leader uses to rebuild in-flight work from its own already-applied
    /// state during recovery.
    fn read_state<R>(&self, f: impl FnOnce(&SM) -> R) -> R;
}
