use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use uhsledger_atomizer::{AtomizerStateMachine, Block, TxError};
use uhsledger_config::AtomizerConfig;
use uhsledger_primitives::{BlockHeight, Ctx};
use uhsledger_replog::ReplicatedLog;

use crate::ctx::ControllerCtx;
use crate::task::run;

/// A single already-attested input, as delivered by the sentinel/watchtower
/// side once it has gathered the signer attestations for one input of a ctx.
/// Matches the unit of work `tx_notify_handler`'s notification queue carries
/// in the original.
#[derive(Debug, Clone)]
pub struct TxNotify {
    pub ctx: Ctx,
    pub attestations: Vec<(usize, BlockHeight)>,
}

/// Handle to a running atomizer controller task. Cloneable; every clone
/// shares the same notification queue and broadcast subscriptions.
#[derive(Clone)]
pub struct ControllerHandle {
    notify_tx: mpsc::Sender<TxNotify>,
    blocks: broadcast::Sender<Block>,
    errors: broadcast::Sender<TxError>,
}

impl ControllerHandle {
    /// Enqueues a notification for the aggregation table. Backpressures the
    /// caller once the queue is full rather than dropping attestations.
    pub async fn notify(&self, notify: TxNotify) {
        if self.notify_tx.send(notify).await.is_err() {
            tracing::warn!("atomizer controller task is gone, dropping notification");
        }
    }

    /// Subscribes to sealed blocks as they're produced.
    pub fn subscribe_blocks(&self) -> broadcast::Receiver<Block> {
        self.blocks.subscribe()
    }

    /// Subscribes to ctx-level errors (stale attestations, double spends,
    /// evicted incomplete aggregates) as they occur.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<TxError> {
        self.errors.subscribe()
    }
}

/// Builds a controller task and a handle to drive it. The caller is
/// responsible for spawning the returned future (typically via
/// `tokio::spawn`) — this mirrors `batch_lifecycle`'s
/// `create_batch_lifecycle_task` split between ownership (the handle) and
/// execution (the task future).
pub fn create_controller_task<L>(
    log: Arc<L>,
    config: AtomizerConfig,
    block_interval: std::time::Duration,
) -> (ControllerHandle, impl std::future::Future<Output = ()>)
where
    L: ReplicatedLog<AtomizerStateMachine> + Send + Sync + 'static,
{
    let (notify_tx, notify_rx) = mpsc::channel(1024);
    let ctx = ControllerCtx::new(log, config);
    let handle = ControllerHandle {
        notify_tx,
        blocks: ctx.blocks.clone(),
        errors: ctx.errors.clone(),
    };
    (handle, run(ctx, notify_rx, block_interval))
}
