use std::path::PathBuf;

use uhsledger_replog::StateMachine;

use crate::audit::run_audit;
use crate::command::{LockingShardCommand, LockingShardResponse};
use crate::shard::LockingShard;
use crate::snapshot::ShardSnapshot;

/// The replicated locking-shard state machine: dispatches
/// [`LockingShardCommand`]s committed by the log onto a [`LockingShard`].
///
/// Grounded on `locking_shard.cpp`'s command handlers; the audit cadence is
/// folded into `apply` (rather than a side timer) so every replica computes
/// the same audit outcome at the same committed epoch.
#[derive(Debug)]
pub struct LockingShardStateMachine {
    shard: LockingShard,
    audit_interval: u64,
    audit_log_path: Option<PathBuf>,
}

impl LockingShardStateMachine {
    pub fn new(shard: LockingShard, audit_interval: u64, audit_log_path: Option<PathBuf>) -> Self {
        LockingShardStateMachine { shard, audit_interval, audit_log_path }
    }

    pub fn shard(&self) -> &LockingShard {
        &self.shard
    }
}

impl StateMachine for LockingShardStateMachine {
    type Command = LockingShardCommand;
    type Response = LockingShardResponse;

    fn apply(&mut self, _log_index: u64, cmd: LockingShardCommand) -> LockingShardResponse {
        match cmd {
            LockingShardCommand::Lock { dtx_id, txs } => {
                let results = self.shard.lock_outputs(dtx_id, &txs);
                LockingShardResponse::Locked(results)
            }
            LockingShardCommand::Apply { dtx_id, txs, complete } => {
                self.shard.apply_outputs(dtx_id, &txs, &complete);
                LockingShardResponse::Applied
            }
            LockingShardCommand::Discard { dtx_id } => {
                self.shard.discard_dtx(dtx_id);
                LockingShardResponse::Discarded
            }
            LockingShardCommand::Audit { epoch } => {
                let outcome = run_audit(&mut self.shard, epoch, self.audit_interval, self.audit_log_path.as_deref())
                    .unwrap_or_else(|e| {
                        uhsledger_primitives::FatalError::new(format!("audit log I/O failed: {e}")).abort()
                    });
                LockingShardResponse::Audited(outcome)
            }
        }
    }

    fn snapshot(&self) -> Vec<u8> {
        use uhsledger_codec::Encode;
        self.shard.snapshot().encode_to_vec()
    }

    fn restore(&mut self, bytes: &[u8]) {
        use uhsledger_codec::Decode;
        let mut slice = bytes;
        let snap = ShardSnapshot::decode(&mut slice).expect("corrupt locking shard snapshot");
        self.shard = LockingShard::restore(snap);
    }
}
