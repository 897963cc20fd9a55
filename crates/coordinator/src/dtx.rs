use uhsledger_primitives::Ctx;

/// A distributed transaction's lifecycle stage, mirroring the coordinator's
/// own `prepare_txs`/`commit_txs`/`discard_txs` maps in the original — here
/// folded into one status per dtx rather than three parallel maps, since a
/// dtx is always in exactly one of them at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DtxStatus {
    /// `prepare` has been recorded; shard locking is either in flight or
    /// hasn't started yet.
    Preparing,
    /// The commit/abort decision has been recorded for each ctx in the dtx,
    /// in the same order as `DtxRecord::ctxs`. Shards may or may not have
    /// applied it yet — that's what `recover` re-drives after a failover.
    Committed(Vec<bool>),
    /// Every shard has confirmed `apply_outputs`, and `discard_dtx` has been
    /// issued; kept around only to answer a delayed idempotent replay.
    Discarded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DtxRecord {
    pub ctxs: Vec<Ctx>,
    pub status: DtxStatus,
}
