use std::sync::Arc;

use async_trait::async_trait;
use uhsledger_config::RetryPolicy;
use uhsledger_coordinator::{CoordinatorError, CoordinatorStateMachine, ShardClient};
use uhsledger_primitives::Ctx;
use uhsledger_replog::ReplicatedLog;

/// The sentinel's view of "a coordinator": just enough to execute one ctx
/// through 2PC and learn whether it committed. Kept as a trait, same reason
/// as `uhsledger_coordinator::ShardClient` — a real deployment fans out over
/// RPC to "a random coordinator endpoint" (spec.md §4.6); this crate only
/// needs the call shape.
#[async_trait]
pub trait CoordinatorClient: Send + Sync {
    async fn execute(&self, ctx: Ctx) -> Result<bool, CoordinatorError>;
}

/// A [`CoordinatorClient`] backed directly by an in-process coordinator log
/// and its shard clients.
pub struct LocalCoordinatorClient<L> {
    log: Arc<L>,
    shards: Vec<Arc<dyn ShardClient>>,
    retry: RetryPolicy,
}

impl<L> LocalCoordinatorClient<L>
where
    L: ReplicatedLog<CoordinatorStateMachine>,
{
    pub fn new(log: Arc<L>, shards: Vec<Arc<dyn ShardClient>>, retry: RetryPolicy) -> Self {
        LocalCoordinatorClient { log, shards, retry }
    }
}

#[async_trait]
impl<L> CoordinatorClient for LocalCoordinatorClient<L>
where
    L: ReplicatedLog<CoordinatorStateMachine>,
{
    async fn execute(&self, ctx: Ctx) -> Result<bool, CoordinatorError> {
        uhsledger_coordinator::execute_transaction(self.log.as_ref(), &self.shards, self.retry, ctx).await
    }
}
