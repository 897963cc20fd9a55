use std::collections::HashMap;

use uhsledger_atomizer::{CompleteAggregate, TxError};
use uhsledger_primitives::{BlockHeight, Ctx, Hash};

/// One ctx's in-progress attestation collection: the oldest block height
/// seen for each input index that has attested so far.
struct Entry {
    ctx: Ctx,
    indices: HashMap<usize, BlockHeight>,
}

impl Entry {
    fn oldest_height(&self) -> BlockHeight {
        self.indices.values().copied().min().unwrap_or(BlockHeight(0))
    }

    fn is_complete(&self) -> bool {
        self.indices.len() >= self.ctx.inputs.len()
    }
}

/// The leader-local aggregation table from `spec.md` §4.3: per-ctx sets of
/// `(input_index, attestation_height)`, keeping only the oldest height per
/// index. Never replicated — only a completed aggregate (and, separately,
/// an eviction decision) ever needs to reach the atomizer's replicated log.
#[derive(Default)]
pub struct AggregationTable {
    entries: HashMap<Hash, Entry>,
}

impl AggregationTable {
    pub fn new() -> Self {
        AggregationTable { entries: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upserts `(index, height)` pairs for `ctx`. Returns the completed
    /// aggregate and removes the entry if this notification pushed the
    /// per-input attestation count to `ctx.inputs.len()`.
    pub fn notify(&mut self, ctx: Ctx, attestations: Vec<(usize, BlockHeight)>) -> Option<CompleteAggregate> {
        let entry = self.entries.entry(ctx.id).or_insert_with(|| Entry { ctx: ctx.clone(), indices: HashMap::new() });
        for (index, height) in attestations {
            entry
                .indices
                .entry(index)
                .and_modify(|existing| {
                    if height.0 < existing.0 {
                        *existing = height;
                    }
                })
                .or_insert(height);
        }
        if entry.is_complete() {
            let oldest = entry.oldest_height();
            let ctx = entry.ctx.clone();
            self.entries.remove(&ctx.id);
            Some(CompleteAggregate { ctx, oldest_attestation: oldest })
        } else {
            None
        }
    }

    /// Evicts every entry whose oldest recorded attestation height is more
    /// than `window` block-intervals behind `current_height`, returning a
    /// [`TxError::Incomplete`] for each. This is the controller-side half of
    /// the eviction spec.md §4.2 describes as part of `make_block` — since
    /// incomplete aggregates never reach the replicated atomizer state
    /// machine, the eviction decision is made here, triggered by observing
    /// each new block height.
    pub fn evict_stale(&mut self, current_height: BlockHeight, window: u64) -> Vec<TxError> {
        let mut evicted = Vec::new();
        self.entries.retain(|id, entry| {
            let stale = entry.oldest_height().0.saturating_add(window) <= current_height.0;
            if stale {
                evicted.push(TxError::Incomplete(*id));
            }
            !stale
        });
        evicted
    }
}
