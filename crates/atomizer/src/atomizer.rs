use uhsledger_primitives::{BlockHeight, Ctx, Hash};

use crate::cache::SpentCache;
use crate::block::Block;
use crate::error::TxError;

/// The atomizer's core aggregation and block-sealing logic, matching
/// `spec.md` §4.2. Only ever receives ctx's whose attestation set has
/// already reached completeness — tracking *incomplete* aggregates is the
/// controller's job (see `uhsledger-atomizer-controller`), since it's a
/// leader-local concern that never needs to reach consensus.
#[derive(Debug)]
pub struct Atomizer {
    height: BlockHeight,
    /// Pending ctx's for the next block, in the order their aggregates
    /// first reached completeness — this insertion order is the tie-break
    /// rule for ordering within a block.
    pending: Vec<(Ctx, BlockHeight)>,
    cache: SpentCache,
}

impl Atomizer {
    pub fn new(starting_height: BlockHeight, spent_cache_depth: u64) -> Self {
        Atomizer {
            height: starting_height,
            pending: Vec::new(),
            cache: SpentCache::new(spent_cache_depth as usize),
        }
    }

    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Attempts to add `ctx` to the list of complete transactions pending
    /// for inclusion in the next block.
    pub fn insert_complete(&mut self, oldest_attestation: BlockHeight, ctx: Ctx) -> Result<(), TxError> {
        let depth = self.cache.depth() as u64;
        if oldest_attestation.0.saturating_add(depth) <= self.height.0 {
            return Err(TxError::StxoRange(ctx.id));
        }

        let spent: Vec<Hash> = ctx
            .inputs
            .iter()
            .map(|i| i.id)
            .filter(|id| self.cache.contains(id))
            .collect();
        if !spent.is_empty() {
            return Err(TxError::InputsSpent { ctx: ctx.id, inputs: spent });
        }

        for input in &ctx.inputs {
            self.cache.reserve(input.id);
        }
        self.pending.push((ctx, oldest_attestation));
        Ok(())
    }

    /// Seals the pending set into a new block and advances height, rotating
    /// the spent cache. The atomizer itself never evicts anything out of
    /// `pending` here (nothing in `pending` can be incomplete by
    /// construction); the returned error vector is always empty and exists
    /// to match the wire response shape the caller broadcasts alongside it.
    pub fn make_block(&mut self) -> (Block, Vec<TxError>) {
        let next_height = self.height.next();
        let transactions: Vec<Ctx> = self.pending.drain(..).map(|(ctx, _)| ctx).collect();
        self.cache.rotate();
        self.height = next_height;
        (
            Block {
                height: next_height,
                transactions,
            },
            Vec::new(),
        )
    }

    pub fn snapshot(&self) -> AtomizerSnapshot {
        AtomizerSnapshot {
            height: self.height,
            pending: self.pending.clone(),
            cache_depth: self.cache.depth(),
            cache_buckets: self.cache.snapshot_buckets(),
        }
    }

    pub fn restore(snapshot: AtomizerSnapshot) -> Self {
        Atomizer {
            height: snapshot.height,
            pending: snapshot.pending,
            cache: SpentCache::restore_buckets(snapshot.cache_depth, snapshot.cache_buckets),
        }
    }
}

/// Plain-data view of an [`Atomizer`]'s state, used by the state machine's
/// snapshot encoding.
pub struct AtomizerSnapshot {
    pub height: BlockHeight,
    pub pending: Vec<(Ctx, BlockHeight)>,
    pub cache_depth: usize,
    pub cache_buckets: Vec<Vec<Hash>>,
}

#[cfg(test)]
mod tests {
    use uhsledger_primitives::{Epoch, Input, Output};

    use super::*;

    fn ctx_spending(ids: &[u8]) -> Ctx {
        let inputs = ids.iter().map(|&b| Input { id: Hash::from_bytes([b; 32]) }).collect();
        Ctx::new(inputs, vec![Output { owner_uhs_id: Hash::from_bytes([0xee; 32]), value: 1 }], vec![], Epoch(0))
    }

    #[test]
    fn stale_attestation_rejected_at_exact_boundary() {
        // height 10, K=2: oldest == h - K is rejected, h - K + 1 accepted.
        let mut atomizer = Atomizer::new(BlockHeight(10), 2);
        let ctx_rejected = ctx_spending(&[1]);
        assert_eq!(
            atomizer.insert_complete(BlockHeight(8), ctx_rejected.clone()),
            Err(TxError::StxoRange(ctx_rejected.id))
        );

        let ctx_accepted = ctx_spending(&[2]);
        assert!(atomizer.insert_complete(BlockHeight(9), ctx_accepted).is_ok());
    }

    #[test]
    fn scenario_atomizer_stale_attestation() {
        // spec.md §8 scenario 4: K=2, height=10, oldest_attestation=7 -> stxo_range.
        let mut atomizer = Atomizer::new(BlockHeight(10), 2);
        let ctx = ctx_spending(&[9]);
        assert_eq!(
            atomizer.insert_complete(BlockHeight(7), ctx.clone()),
            Err(TxError::StxoRange(ctx.id))
        );
    }

    #[test]
    fn double_spend_within_cache_window_is_rejected() {
        let mut atomizer = Atomizer::new(BlockHeight(0), 3);
        let ctx1 = ctx_spending(&[5]);
        atomizer.insert_complete(BlockHeight(0), ctx1).unwrap();

        let ctx2 = ctx_spending(&[5]);
        let result = atomizer.insert_complete(BlockHeight(0), ctx2.clone());
        assert_eq!(
            result,
            Err(TxError::InputsSpent { ctx: ctx2.id, inputs: vec![Hash::from_bytes([5; 32])] })
        );
    }

    #[test]
    fn make_block_seals_pending_in_insertion_order() {
        let mut atomizer = Atomizer::new(BlockHeight(0), 3);
        let ctx_a = ctx_spending(&[1]);
        let ctx_b = ctx_spending(&[2]);
        atomizer.insert_complete(BlockHeight(0), ctx_a.clone()).unwrap();
        atomizer.insert_complete(BlockHeight(0), ctx_b.clone()).unwrap();

        let (block, errors) = atomizer.make_block();
        assert!(errors.is_empty());
        assert_eq!(block.height, BlockHeight(1));
        assert_eq!(block.transactions, vec![ctx_a, ctx_b]);
        assert_eq!(atomizer.height(), BlockHeight(1));
        assert_eq!(atomizer.pending_count(), 0);
    }

    #[test]
    fn heights_increase_by_exactly_one_per_block() {
        let mut atomizer = Atomizer::new(BlockHeight(0), 3);
        for _ in 0..5 {
            let (block, _) = atomizer.make_block();
            assert_eq!(block.height, atomizer.height());
        }
        assert_eq!(atomizer.height(), BlockHeight(5));
    }

    #[test]
    fn spent_cache_forgets_after_rotating_past_depth() {
        let mut atomizer = Atomizer::new(BlockHeight(0), 1);
        let ctx1 = ctx_spending(&[7]);
        atomizer.insert_complete(BlockHeight(0), ctx1).unwrap();
        atomizer.make_block();

        // depth 1: the spend from the sealed block has already aged out,
        // so the same input id can be reused by a new ctx.
        let ctx2 = ctx_spending(&[7]);
        assert!(atomizer.insert_complete(BlockHeight(1), ctx2).is_ok());
    }

    #[test]
    fn snapshot_round_trips() {
        let mut atomizer = Atomizer::new(BlockHeight(0), 3);
        let ctx = ctx_spending(&[1]);
        atomizer.insert_complete(BlockHeight(0), ctx).unwrap();
        let snap = atomizer.snapshot();
        let restored = Atomizer::restore(snap);
        assert_eq!(restored.height(), atomizer.height());
        assert_eq!(restored.pending_count(), atomizer.pending_count());
    }
}
