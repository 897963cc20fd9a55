use std::time::Duration;

use tokio::sync::mpsc;
use uhsledger_atomizer::{AtomizerCommand, AtomizerResponse, AtomizerStateMachine, CompleteAggregate};
use uhsledger_replog::ReplicatedLog;

use crate::ctx::ControllerCtx;
use crate::handle::TxNotify;

/// The controller's driver loop. Two responsibilities, matching
/// `controller.cpp`'s `notification_consumer` and `main_handler` loops, both
/// folded onto a single task here rather than a thread pool plus a timer
/// thread — see `DESIGN.md` for why tokio tasks stand in for the original's
/// OS threads throughout this workspace.
pub(crate) async fn run<L>(ctx: ControllerCtx<L>, mut notify_rx: mpsc::Receiver<TxNotify>, block_interval: Duration)
where
    L: ReplicatedLog<AtomizerStateMachine> + Send + Sync + 'static,
{
    let mut pending_aggs: Vec<CompleteAggregate> = Vec::new();
    let mut ticker = tokio::time::interval(block_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            notify = notify_rx.recv() => {
                match notify {
                    Some(TxNotify { ctx: tx, attestations }) => {
                        if let Some(agg) = ctx.table.lock().notify(tx, attestations) {
                            pending_aggs.push(agg);
                        }
                    }
                    None => {
                        tracing::info!("atomizer controller notification channel closed, shutting down");
                        return;
                    }
                }
            }
            _ = ticker.tick() => {
                if !ctx.log.is_leader() {
                    continue;
                }
                if let Err(err) = flush_pending(&ctx, &mut pending_aggs).await {
                    tracing::warn!(error = %err, "failed to replicate complete aggregates");
                    continue;
                }
                if let Err(err) = seal_block(&ctx).await {
                    tracing::warn!(error = %err, "failed to replicate make_block");
                }
            }
        }
    }
}

async fn flush_pending<L>(ctx: &ControllerCtx<L>, pending_aggs: &mut Vec<CompleteAggregate>) -> Result<(), uhsledger_replog::ReplogError>
where
    L: ReplicatedLog<AtomizerStateMachine>,
{
    if pending_aggs.is_empty() {
        return Ok(());
    }
    let batch = std::mem::take(pending_aggs);
    let (_, resp) = ctx.log.replicate(AtomizerCommand::InsertComplete(batch)).await?;
    if let AtomizerResponse::Inserted(errors) = resp {
        for e in errors {
            let _ = ctx.errors.send(e);
        }
    }
    Ok(())
}

async fn seal_block<L>(ctx: &ControllerCtx<L>) -> Result<(), uhsledger_replog::ReplogError>
where
    L: ReplicatedLog<AtomizerStateMachine>,
{
    let (_, resp) = ctx.log.replicate(AtomizerCommand::MakeBlock).await?;
    let AtomizerResponse::MadeBlock(block, errors) = resp else {
        return Ok(());
    };
    for e in errors {
        let _ = ctx.errors.send(e);
    }
    let evicted = ctx.table.lock().evict_stale(block.height, ctx.config.eviction_window);
    for e in evicted {
        let _ = ctx.errors.send(e);
    }
    tracing::info!(height = block.height.0, n_txs = block.transactions.len(), "controller sealed block");
    let _ = ctx.blocks.send(block);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use uhsledger_atomizer::{AtomizerStateMachine, TxError};
    use uhsledger_config::AtomizerConfig;
    use uhsledger_primitives::{BlockHeight, Ctx, Epoch, Hash, Input, Output};
    use uhsledger_replog::{FileSnapshotStore, LocalReplicatedLog};

    use crate::handle::{create_controller_task, TxNotify};

    fn local_log() -> Arc<LocalReplicatedLog<AtomizerStateMachine>> {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileSnapshotStore::new(dir.path()).unwrap());
        Arc::new(LocalReplicatedLog::new(AtomizerStateMachine::new(4), store))
    }

    fn two_input_ctx() -> Ctx {
        Ctx::new(
            vec![Input { id: Hash::from_bytes([1; 32]) }, Input { id: Hash::from_bytes([2; 32]) }],
            vec![Output { owner_uhs_id: Hash::from_bytes([9; 32]), value: 1 }],
            vec![],
            Epoch(0),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn complete_aggregate_seals_into_a_block() {
        let log = local_log();
        let config = AtomizerConfig { spent_cache_depth: 4, eviction_window: 2 };
        let (handle, task) = create_controller_task(log, config, Duration::from_millis(10));
        let mut blocks = handle.subscribe_blocks();
        tokio::spawn(task);

        let ctx = two_input_ctx();
        handle
            .notify(TxNotify { ctx: ctx.clone(), attestations: vec![(0, BlockHeight(0))] })
            .await;
        handle
            .notify(TxNotify { ctx: ctx.clone(), attestations: vec![(1, BlockHeight(0))] })
            .await;

        tokio::time::advance(Duration::from_millis(15)).await;
        let block = blocks.recv().await.unwrap();
        assert_eq!(block.transactions, vec![ctx]);
    }

    #[tokio::test(start_paused = true)]
    async fn incomplete_aggregate_is_eventually_evicted() {
        let log = local_log();
        let config = AtomizerConfig { spent_cache_depth: 4, eviction_window: 2 };
        let (handle, task) = create_controller_task(log, config, Duration::from_millis(10));
        let mut errors = handle.subscribe_errors();
        tokio::spawn(task);

        let ctx = two_input_ctx();
        handle
            .notify(TxNotify { ctx: ctx.clone(), attestations: vec![(0, BlockHeight(0))] })
            .await;

        // Three block cycles elapse with the second input never attesting.
        tokio::time::advance(Duration::from_millis(35)).await;
        let err = errors.recv().await.unwrap();
        assert_eq!(err, TxError::Incomplete(ctx.id));
    }
}
