use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use uhsledger_atomizer::{AtomizerStateMachine, Block, TxError};
use uhsledger_config::AtomizerConfig;
use uhsledger_replog::ReplicatedLog;

use crate::aggregation::AggregationTable;

/// Shared state the controller task drives and the [`crate::ControllerHandle`]
/// reaches into. Grounded on `atomizer_raft.hpp`, which keeps its aggregation
/// table (`m_txs`) and the replicated log handle side by side as controller
/// members rather than inside the atomizer state machine itself.
pub(crate) struct ControllerCtx<L> {
    pub(crate) log: Arc<L>,
    pub(crate) config: AtomizerConfig,
    pub(crate) table: Mutex<AggregationTable>,
    pub(crate) blocks: broadcast::Sender<Block>,
    pub(crate) errors: broadcast::Sender<TxError>,
}

impl<L> ControllerCtx<L>
where
    L: ReplicatedLog<AtomizerStateMachine>,
{
    pub(crate) fn new(log: Arc<L>, config: AtomizerConfig) -> Self {
        let (blocks, _) = broadcast::channel(64);
        let (errors, _) = broadcast::channel(256);
        ControllerCtx {
            log,
            config,
            table: Mutex::new(AggregationTable::new()),
            blocks,
            errors,
        }
    }
}
