use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ReplogError;
use crate::snapshot::SnapshotStore;
use crate::state_machine::StateMachine;
use crate::ReplicatedLog;

/// A trivial, always-leader, single-process [`ReplicatedLog`]. Useful as the
/// backing log for a component under test (or a single-node deployment)
/// where failover never needs to be exercised.
pub struct LocalReplicatedLog<SM: StateMachine> {
    inner: Mutex<SM>,
    next_index: AtomicU64,
    snapshots: Arc<dyn SnapshotStore>,
}

impl<SM: StateMachine> LocalReplicatedLog<SM> {
    pub fn new(state_machine: SM, snapshots: Arc<dyn SnapshotStore>) -> Self {
        LocalReplicatedLog {
            inner: Mutex::new(state_machine),
            next_index: AtomicU64::new(1),
            snapshots,
        }
    }

    /// Applies `cmd` and returns the state machine's response directly,
    /// bypassing the `Result<u64, ReplogError>` signature `replicate` must
    /// use to satisfy the shared trait. Most call sites that only ever talk
    /// to a `LocalReplicatedLog` want this.
    pub fn apply(&self, cmd: SM::Command) -> SM::Response {
        let idx = self.next_index.fetch_add(1, Ordering::SeqCst);
        let mut sm = self.inner.lock();
        sm.apply(idx, cmd)
    }

}

#[async_trait]
impl<SM> ReplicatedLog<SM> for LocalReplicatedLog<SM>
where
    SM: StateMachine,
{
    async fn replicate(&self, cmd: SM::Command) -> Result<(u64, SM::Response), ReplogError> {
        let idx = self.next_index.fetch_add(1, Ordering::SeqCst);
        let mut sm = self.inner.lock();
        let resp = sm.apply(idx, cmd);
        Ok((idx, resp))
    }

    fn is_leader(&self) -> bool {
        true
    }

    fn last_commit_index(&self) -> u64 {
        self.next_index.load(Ordering::SeqCst).saturating_sub(1)
    }

    async fn install_snapshot(&self, log_index: u64, bytes: &[u8]) -> Result<(), ReplogError> {
        let mut sm = self.inner.lock();
        sm.restore(bytes);
        self.next_index.store(log_index + 1, Ordering::SeqCst);
        Ok(())
    }

    async fn read_snapshot(&self) -> Result<Option<(u64, Vec<u8>)>, ReplogError> {
        let idx = self.last_commit_index();
        if idx == 0 {
            return Ok(None);
        }
        let bytes = self.inner.lock().snapshot();
        Ok(Some((idx, bytes)))
    }

    fn read_state<R>(&self, f: impl FnOnce(&SM) -> R) -> R {
        f(&self.inner.lock())
    }
}

struct ReplicaState<SM> {
    state_machine: SM,
    last_applied: u64,
}

struct ReplicaSetShared<SM> {
    leader: AtomicUsize,
    replicas: Vec<Mutex<ReplicaState<SM>>>,
    snapshots: Vec<Arc<dyn SnapshotStore>>,
}

/// A simulated multi-node replicated log: `n` replicas sharing one process,
/// one of them marked leader. `replicate` on the leader applies the command
/// to every replica's state machine before resolving, standing in for "a
/// majority has durably accepted it" without a real consensus transport.
///
/// This exists to exercise leader failover and snapshot catch-up
/// deterministically in tests; it is explicitly not a consensus
/// implementation (see `DESIGN.md`).
pub struct ReplicaSet<SM: StateMachine> {
    shared: Arc<ReplicaSetShared<SM>>,
}

/// A single node's view of a [`ReplicaSet`], implementing [`ReplicatedLog`].
pub struct ReplicaHandle<SM: StateMachine> {
    id: usize,
    shared: Arc<ReplicaSetShared<SM>>,
}

impl<SM: StateMachine> ReplicaSet<SM> {
    pub fn new(state_machines: Vec<SM>, snapshots: Vec<Arc<dyn SnapshotStore>>) -> Self {
        assert!(!state_machines.is_empty(), "a replica set needs at least one node");
        assert_eq!(state_machines.len(), snapshots.len());
        let replicas = state_machines
            .into_iter()
            .map(|sm| {
                Mutex::new(ReplicaState {
                    state_machine: sm,
                    last_applied: 0,
                })
            })
            .collect();
        ReplicaSet {
            shared: Arc::new(ReplicaSetShared {
                leader: AtomicUsize::new(0),
                replicas,
                snapshots,
            }),
        }
    }

    pub fn node_count(&self) -> usize {
        self.shared.replicas.len()
    }

    pub fn leader_id(&self) -> usize {
        self.shared.leader.load(Ordering::SeqCst)
    }

    /// Returns a handle for node `id`, implementing [`ReplicatedLog`] from
    /// that node's point of view (only the current leader's `replicate`
    /// calls succeed).
    pub fn handle(&self, id: usize) -> ReplicaHandle<SM> {
        assert!(id < self.node_count(), "node id out of range");
        ReplicaHandle {
            id,
            shared: self.shared.clone(),
        }
    }

    /// Simulates the current leader crashing/stepping down: no node is
    /// leader until [`force_elect`](Self::force_elect) runs, matching the
    /// window in spec.md's leader-failover scenario where in-flight
    /// `replicate` calls must fail rather than silently succeed.
    pub fn resign_leadership(&self) {
        self.shared.leader.store(usize::MAX, Ordering::SeqCst);
    }

    /// Forces node `id` to become leader, as a deterministic stand-in for a
    /// real election outcome.
    pub fn force_elect(&self, id: usize) {
        assert!(id < self.node_count(), "node id out of range");
        self.shared.leader.store(id, Ordering::SeqCst);
    }
}

impl<SM: StateMachine> ReplicaHandle<SM> {
    pub fn id(&self) -> usize {
        self.id
    }

}

#[async_trait]
impl<SM> ReplicatedLog<SM> for ReplicaHandle<SM>
where
    SM: StateMachine,
{
    async fn replicate(&self, cmd: SM::Command) -> Result<(u64, SM::Response), ReplogError> {
        if self.shared.leader.load(Ordering::SeqCst) != self.id {
            return Err(ReplogError::NotLeader);
        }
        let mut own_result = None;
        for (i, replica) in self.shared.replicas.iter().enumerate() {
            let mut state = replica.lock();
            let idx = state.last_applied + 1;
            let resp = state.state_machine.apply(idx, cmd.clone());
            state.last_applied = idx;
            if i == self.id {
                own_result = Some((idx, resp));
            }
        }
        own_result.ok_or(ReplogError::Timeout)
    }

    fn is_leader(&self) -> bool {
        self.shared.leader.load(Ordering::SeqCst) == self.id
    }

    fn last_commit_index(&self) -> u64 {
        self.shared.replicas[self.id].lock().last_applied
    }

    async fn install_snapshot(&self, log_index: u64, bytes: &[u8]) -> Result<(), ReplogError> {
        let mut state = self.shared.replicas[self.id].lock();
        state.state_machine.restore(bytes);
        state.last_applied = log_index;
        Ok(())
    }

    async fn read_snapshot(&self) -> Result<Option<(u64, Vec<u8>)>, ReplogError> {
        let state = self.shared.replicas[self.id].lock();
        if state.last_applied == 0 {
            return Ok(None);
        }
        let bytes = state.state_machine.snapshot();
        let idx = state.last_applied;
        drop(state);
        self.shared.snapshots[self.id].save(idx, &bytes)?;
        Ok(Some((idx, bytes)))
    }

    fn read_state<R>(&self, f: impl FnOnce(&SM) -> R) -> R {
        f(&self.shared.replicas[self.id].lock().state_machine)
    }
}
