use std::sync::Arc;

use uhsledger_config::RetryPolicy;
use uhsledger_replog::ReplicatedLog;

use crate::command::CoordinatorCommand;
use crate::execute::with_retry;
use crate::shard_client::{relevant_shards, ShardClient};
use crate::state_machine::CoordinatorStateMachine;

/// Re-drives every dtx this replica finds in `Committed` status — the work a
/// newly-elected leader must resume per spec.md §4.5's failover rule:
/// `prepare`-only dtxs are safe to leave for a fresh `execute_transaction`
/// call, but a dtx whose commit/abort decision is already durable must still
/// reach every shard and finally `discard`, or it is stuck forever.
pub async fn recover<L>(log: &L, shards: &[Arc<dyn ShardClient>], retry: RetryPolicy)
where
    L: ReplicatedLog<CoordinatorStateMachine>,
{
    let committed = log.read_state(|sm| sm.committed_dtxs());
    for (dtx_id, ctxs, complete) in committed {
        for ctx in &ctxs {
            let owning = relevant_shards(ctx, shards);
            let is_complete = complete.first().copied().unwrap_or(false);
            for &i in &owning {
                with_retry(retry, || shards[i].apply_outputs(dtx_id, std::slice::from_ref(ctx), &[is_complete])).await;
            }
            for &i in &owning {
                with_retry(retry, || shards[i].discard_dtx(dtx_id)).await;
            }
        }
        if let Err(err) = log.replicate(CoordinatorCommand::Discard { dtx_id }).await {
            tracing::warn!(error = %err, dtx_id = %dtx_id, "failed to replicate recovery discard, will retry on next recover() pass");
        }
    }
}
