use std::sync::Arc;

use async_trait::async_trait;
use uhsledger_locking_shard::{LockError, LockingShardCommand, LockingShardResponse, LockingShardStateMachine};
use uhsledger_primitives::{Ctx, Hash, ShardRange};
use uhsledger_replog::{ReplicatedLog, ReplogError};

/// The coordinator's view of one locking shard: just the handful of calls
/// `execute_transaction` needs, kept separate from `ReplicatedLog` so a
/// future real deployment can put an RPC hop here without the coordinator's
/// driver logic noticing. Grounded on spec.md §9's note that "shard-clients
/// own only transport handles" — the coordinator never reaches into a
/// shard's state directly.
#[async_trait]
pub trait ShardClient: Send + Sync {
    fn range(&self) -> ShardRange;

    async fn lock_outputs(&self, dtx_id: Hash, txs: &[Ctx]) -> Result<Vec<Result<(), LockError>>, ReplogError>;

    async fn apply_outputs(&self, dtx_id: Hash, txs: &[Ctx], complete: &[bool]) -> Result<(), ReplogError>;

    async fn discard_dtx(&self, dtx_id: Hash) -> Result<(), ReplogError>;
}

/// A [`ShardClient`] backed directly by an in-process [`ReplicatedLog`] —
/// the in-process stand-in for the RPC hop a real deployment would put here.
pub struct LocalShardClient<L> {
    log: Arc<L>,
    range: ShardRange,
}

impl<L> LocalShardClient<L>
where
    L: ReplicatedLog<LockingShardStateMachine>,
{
    pub fn new(log: Arc<L>, range: ShardRange) -> Self {
        LocalShardClient { log, range }
    }
}

#[async_trait]
impl<L> ShardClient for LocalShardClient<L>
where
    L: ReplicatedLog<LockingShardStateMachine>,
{
    fn range(&self) -> ShardRange {
        self.range
    }

    async fn lock_outputs(&self, dtx_id: Hash, txs: &[Ctx]) -> Result<Vec<Result<(), LockError>>, ReplogError> {
        let (_, resp) = self.log.replicate(LockingShardCommand::Lock { dtx_id, txs: txs.to_vec() }).await?;
        let LockingShardResponse::Locked(results) = resp else {
            uhsledger_primitives::FatalError::new("locking shard returned a non-Locked response to Lock").abort();
        };
        Ok(results)
    }

    async fn apply_outputs(&self, dtx_id: Hash, txs: &[Ctx], complete: &[bool]) -> Result<(), ReplogError> {
        self.log
            .replicate(LockingShardCommand::Apply { dtx_id, txs: txs.to_vec(), complete: complete.to_vec() })
            .await?;
        Ok(())
    }

    async fn discard_dtx(&self, dtx_id: Hash) -> Result<(), ReplogError> {
        self.log.replicate(LockingShardCommand::Discard { dtx_id }).await?;
        Ok(())
    }
}

/// The indices, into `shards`, of every shard owning at least one input or
/// output of `ctx` — the shard set `execute_transaction` fans out to.
pub fn relevant_shards(ctx: &Ctx, shards: &[Arc<dyn ShardClient>]) -> Vec<usize> {
    let ids: Vec<Hash> = ctx
        .inputs
        .iter()
        .map(|i| i.id)
        .chain(ctx.outputs.iter().map(uhsledger_primitives::uhs_id_of))
        .collect();
    shards
        .iter()
        .enumerate()
        .filter(|(_, shard)| ids.iter().any(|id| shard.range().contains(id)))
        .map(|(i, _)| i)
        .collect()
}
