use std::collections::{HashMap, HashSet, VecDeque};

use uhsledger_primitives::{uhs_id_of, Ctx, Epoch, Hash, ShardRange, UhsElement};

use crate::error::LockError;
use crate::snapshot::{LockedEntry, PreparedEntry, ShardSnapshot, UnspentEntry};

/// One locking shard's UHS slice: unspent, locked (mid-2PC), and spent
/// elements whose ids fall within `range`, plus the dtx-level bookkeeping
/// that makes `lock_outputs`/`apply_outputs` safe to replay.
///
/// Grounded on `locking_shard.cpp`: the three-map layout (`m_uhs`, `m_locked`,
/// `m_spent`) and the `m_prepared_dtxs`/`m_applied_dtxs` idempotency memos are
/// carried over unchanged.
#[derive(Debug)]
pub struct LockingShard {
    range: ShardRange,
    attestation_threshold: usize,
    unspent: HashMap<Hash, UhsElement>,
    locked: HashMap<Hash, (UhsElement, Hash)>,
    spent: HashMap<Hash, UhsElement>,
    prepared: HashMap<Hash, Vec<Result<(), LockError>>>,
    applied: HashSet<Hash>,
    /// Ctx ids this shard has seen reach `apply_tx(complete = true)`, kept
    /// only for ctx ids that hash into this shard's own range — a
    /// shard-local, non-exhaustive record inherited verbatim from
    /// `completed_tx` in the original (see `DESIGN.md`). Bounded:
    /// insertion-order FIFO over `completed_tx_capacity`, same eviction
    /// shape as `CoordinatorStateMachine`'s `discarded_order`.
    completed_tx: HashSet<Hash>,
    completed_tx_order: VecDeque<Hash>,
    completed_tx_capacity: usize,
    highest_epoch: Epoch,
}

impl LockingShard {
    pub fn new(range: ShardRange, attestation_threshold: usize, completed_tx_capacity: usize) -> Self {
        LockingShard {
            range,
            attestation_threshold,
            unspent: HashMap::new(),
            locked: HashMap::new(),
            spent: HashMap::new(),
            prepared: HashMap::new(),
            applied: HashSet::new(),
            completed_tx: HashSet::new(),
            completed_tx_order: VecDeque::new(),
            completed_tx_capacity,
            highest_epoch: Epoch::GENESIS,
        }
    }

    pub fn range(&self) -> ShardRange {
        self.range
    }

    pub fn highest_epoch(&self) -> Epoch {
        self.highest_epoch
    }

    pub fn unspent_count(&self) -> usize {
        self.unspent.len()
    }

    pub fn locked_count(&self) -> usize {
        self.locked.len()
    }

    pub fn spent_count(&self) -> usize {
        self.spent.len()
    }

    pub fn is_unspent(&self, id: &Hash) -> bool {
        self.unspent.contains_key(id)
    }

    pub fn is_locked(&self, id: &Hash) -> bool {
        self.locked.contains_key(id)
    }

    pub fn is_spent(&self, id: &Hash) -> bool {
        self.spent.contains_key(id)
    }

    pub fn has_completed(&self, ctx_id: &Hash) -> bool {
        self.completed_tx.contains(ctx_id)
    }

    /// Seeds the unspent set directly, bypassing the lock/apply lifecycle.
    /// Used only at startup to load a preseed file — never part of the
    /// replicated command stream.
    pub fn preseed(&mut self, elements: impl IntoIterator<Item = (Hash, UhsElement)>) {
        for (id, element) in elements {
            self.unspent.insert(id, element);
        }
    }

    /// Attempts to lock every input this shard owns across `txs`, one result
    /// per ctx, in order. Idempotent: replaying a `dtx_id` already seen
    /// returns the exact same per-ctx outcomes without touching state again.
    pub fn lock_outputs(&mut self, dtx_id: Hash, txs: &[Ctx]) -> Vec<Result<(), LockError>> {
        if let Some(memo) = self.prepared.get(&dtx_id) {
            return memo.clone();
        }

        let mut results = Vec::with_capacity(txs.len());
        for ctx in txs {
            if ctx.epoch > self.highest_epoch {
                self.highest_epoch = ctx.epoch;
            }
            results.push(self.check_and_lock_tx(dtx_id, ctx));
        }
        self.prepared.insert(dtx_id, results.clone());
        results
    }

    /// Two-pass check-then-lock for the inputs of one ctx that fall within
    /// this shard's range: verify attestation threshold and availability
    /// first, without mutating anything, then move every owned input from
    /// unspent to locked only once the whole ctx is known to pass.
    fn check_and_lock_tx(&mut self, dtx_id: Hash, ctx: &Ctx) -> Result<(), LockError> {
        if ctx.attestations.len() < self.attestation_threshold {
            return Err(LockError::InsufficientAttestations {
                ctx: ctx.id,
                have: ctx.attestations.len(),
                required: self.attestation_threshold,
            });
        }

        let owned_inputs: Vec<Hash> = ctx.inputs.iter().map(|i| i.id).filter(|id| self.range.contains(id)).collect();
        for id in &owned_inputs {
            if !self.unspent.contains_key(id) {
                return Err(LockError::InputUnavailable { ctx: ctx.id, input: *id });
            }
        }

        for id in owned_inputs {
            let element = self.unspent.remove(&id).expect("checked present above");
            self.locked.insert(id, (element, dtx_id));
        }
        Ok(())
    }

    /// Applies the outcome of each ctx in `txs` (in the same order passed to
    /// `lock_outputs`) for `dtx_id`. Idempotent: a `dtx_id` already applied is
    /// a no-op. Fatal — the process aborts — if `dtx_id` was never prepared,
    /// or if the number of outcomes doesn't match what was prepared; both
    /// indicate a coordinator/shard protocol violation the original treats
    /// as unrecoverable.
    pub fn apply_outputs(&mut self, dtx_id: Hash, txs: &[Ctx], complete: &[bool]) {
        if self.applied.contains(&dtx_id) {
            return;
        }
        let Some(prepared_results) = self.prepared.get(&dtx_id).cloned() else {
            uhsledger_primitives::FatalError::new(format!("apply_outputs for unknown dtx {dtx_id}")).abort();
        };
        if prepared_results.len() != txs.len() || txs.len() != complete.len() {
            uhsledger_primitives::FatalError::new(format!(
                "apply_outputs length mismatch for dtx {dtx_id}: prepared {}, txs {}, complete {}",
                prepared_results.len(),
                txs.len(),
                complete.len()
            ))
            .abort();
        }

        for ((ctx, &is_complete), prepared_result) in txs.iter().zip(complete.iter()).zip(prepared_results.iter()) {
            if prepared_result.is_err() {
                continue;
            }
            self.apply_tx(dtx_id, ctx, is_complete);
        }
        self.applied.insert(dtx_id);
    }

    fn apply_tx(&mut self, dtx_id: Hash, ctx: &Ctx, complete: bool) {
        let owned_inputs: Vec<Hash> = ctx.inputs.iter().map(|i| i.id).filter(|id| self.range.contains(id)).collect();

        if complete {
            for id in &owned_inputs {
                if let Some((mut element, locked_dtx)) = self.locked.remove(id) {
                    debug_assert_eq!(locked_dtx, dtx_id, "locked input moved by a different dtx");
                    element.deletion_epoch = Some(ctx.epoch);
                    self.spent.insert(*id, element);
                }
            }
            for output in &ctx.outputs {
                let uhs_id = uhs_id_of(output);
                if self.range.contains(&uhs_id) {
                    self.unspent.insert(uhs_id, UhsElement::new(output.value, ctx.epoch));
                }
            }
            if self.range.contains(&ctx.id) {
                self.note_completed(ctx.id);
            }
        } else {
            for id in &owned_inputs {
                if let Some((element, _)) = self.locked.remove(id) {
                    self.unspent.insert(*id, element);
                }
            }
        }
    }

    /// Forgets `dtx_id`'s prepared/applied bookkeeping. Does not touch any
    /// locked or spent element — releasing locks on abort happens through
    /// `apply_outputs(dtx_id, ..., complete = false)`, same as the original's
    /// `discard_dtx`, which only erases the dtx from `m_applied_dtxs`/
    /// `m_prepared_dtxs` once the coordinator has told every shard the dtx is
    /// fully resolved and no further idempotent replay can arrive for it.
    pub fn discard_dtx(&mut self, dtx_id: Hash) {
        self.prepared.remove(&dtx_id);
        self.applied.remove(&dtx_id);
    }

    /// Records `ctx_id` as completed, evicting the oldest entry once the
    /// cache is over capacity. A no-op if already present.
    fn note_completed(&mut self, ctx_id: Hash) {
        if !self.completed_tx.insert(ctx_id) {
            return;
        }
        self.completed_tx_order.push_back(ctx_id);
        while self.completed_tx_order.len() > self.completed_tx_capacity {
            if let Some(oldest) = self.completed_tx_order.pop_front() {
                self.completed_tx.remove(&oldest);
            }
        }
    }

    /// Drops spent elements whose deletion epoch predates `floor`.
    pub fn prune(&mut self, floor: Epoch) {
        self.spent.retain(|_, e| e.deletion_epoch.map_or(true, |d| d >= floor));
    }

    /// The scalar value sum over every unspent element, the audit task's
    /// running checksum.
    pub fn unspent_value_sum(&self) -> u128 {
        self.unspent.values().map(|e| e.value as u128).sum()
    }

    pub fn snapshot(&self) -> ShardSnapshot {
        ShardSnapshot {
            range: self.range,
            attestation_threshold: self.attestation_threshold as u64,
            unspent: self.unspent.iter().map(|(id, e)| UnspentEntry { id: *id, element: e.clone() }).collect(),
            locked: self
                .locked
                .iter()
                .map(|(id, (e, dtx_id))| LockedEntry { id: *id, element: e.clone(), dtx_id: *dtx_id })
                .collect(),
            spent: self.spent.iter().map(|(id, e)| UnspentEntry { id: *id, element: e.clone() }).collect(),
            prepared: self
                .prepared
                .iter()
                .map(|(dtx_id, results)| PreparedEntry {
                    dtx_id: *dtx_id,
                    oks: results.iter().map(|r| r.is_ok()).collect(),
                })
                .collect(),
            applied: self.applied.iter().copied().collect(),
            completed_tx: self.completed_tx_order.iter().copied().collect(),
            completed_tx_capacity: self.completed_tx_capacity as u64,
            highest_epoch: self.highest_epoch,
        }
    }

    pub fn restore(snap: ShardSnapshot) -> Self {
        let prepared = snap
            .prepared
            .into_iter()
            .map(|entry| {
                let results = entry
                    .oks
                    .into_iter()
                    .map(|ok| {
                        if ok {
                            Ok(())
                        } else {
                            Err(LockError::InputUnavailable { ctx: Hash::ZERO, input: Hash::ZERO })
                        }
                    })
                    .collect();
                (entry.dtx_id, results)
            })
            .collect();

        LockingShard {
            range: snap.range,
            attestation_threshold: snap.attestation_threshold as usize,
            unspent: snap.unspent.into_iter().map(|e| (e.id, e.element)).collect(),
            locked: snap.locked.into_iter().map(|e| (e.id, (e.element, e.dtx_id))).collect(),
            spent: snap.spent.into_iter().map(|e| (e.id, e.element)).collect(),
            prepared,
            applied: snap.applied.into_iter().collect(),
            completed_tx: snap.completed_tx.iter().copied().collect(),
            completed_tx_order: snap.completed_tx.into_iter().collect(),
            completed_tx_capacity: snap.completed_tx_capacity as usize,
            highest_epoch: snap.highest_epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use uhsledger_primitives::{Attestation, Input, Output};

    use super::*;

    fn attested(inputs: Vec<Input>, outputs: Vec<Output>) -> Ctx {
        Ctx::new(
            inputs,
            outputs,
            vec![Attestation { signer: Hash::from_bytes([0xaa; 32]), signature: vec![1] }],
            Epoch(1),
        )
    }

    fn full_range_shard(threshold: usize) -> LockingShard {
        LockingShard::new(ShardRange::new(0, 255), threshold, 1024)
    }

    #[test]
    fn scenario_single_transfer_confirms_and_moves_value() {
        // spec.md §8 scenario 1.
        let u1 = Hash::from_bytes([1; 32]);
        let mut shard = full_range_shard(1);
        shard.preseed([(u1, UhsElement::new(10, Epoch(0)))]);

        let ctx = attested(vec![Input { id: u1 }], vec![Output { owner_uhs_id: Hash::from_bytes([2; 32]), value: 10 }]);
        let dtx_id = Hash::from_bytes([0xd1; 32]);
        let results = shard.lock_outputs(dtx_id, &[ctx.clone()]);
        assert_eq!(results, vec![Ok(())]);

        shard.apply_outputs(dtx_id, &[ctx.clone()], &[true]);
        assert!(!shard.is_unspent(&u1));
        assert!(shard.is_spent(&u1));
        assert_eq!(shard.unspent_value_sum(), 10);
        assert!(shard.has_completed(&ctx.id));
    }

    #[test]
    fn scenario_double_spend_one_wins_supply_unchanged() {
        // spec.md §8 scenario 2.
        let u1 = Hash::from_bytes([1; 32]);
        let mut shard = full_range_shard(1);
        shard.preseed([(u1, UhsElement::new(10, Epoch(0)))]);

        let ctx_a = attested(vec![Input { id: u1 }], vec![Output { owner_uhs_id: Hash::from_bytes([2; 32]), value: 10 }]);
        let ctx_b = attested(vec![Input { id: u1 }], vec![Output { owner_uhs_id: Hash::from_bytes([3; 32]), value: 10 }]);

        let dtx_a = Hash::from_bytes([0xa0; 32]);
        let dtx_b = Hash::from_bytes([0xb0; 32]);
        let results_a = shard.lock_outputs(dtx_a, &[ctx_a.clone()]);
        let results_b = shard.lock_outputs(dtx_b, &[ctx_b.clone()]);

        assert_eq!(results_a, vec![Ok(())]);
        assert!(matches!(results_b[0], Err(LockError::InputUnavailable { .. })));

        shard.apply_outputs(dtx_a, &[ctx_a], &[true]);
        assert_eq!(shard.unspent_value_sum(), 10);
    }

    #[test]
    fn idempotent_apply_does_not_duplicate_state() {
        // spec.md §8 scenario 6.
        let u1 = Hash::from_bytes([1; 32]);
        let mut shard = full_range_shard(1);
        shard.preseed([(u1, UhsElement::new(10, Epoch(0)))]);
        let ctx = attested(vec![Input { id: u1 }], vec![Output { owner_uhs_id: Hash::from_bytes([2; 32]), value: 10 }]);
        let dtx_id = Hash::from_bytes([0xd2; 32]);
        shard.lock_outputs(dtx_id, &[ctx.clone()]);

        shard.apply_outputs(dtx_id, &[ctx.clone()], &[true]);
        let after_first = shard.unspent_value_sum();
        shard.apply_outputs(dtx_id, &[ctx.clone()], &[true]);
        shard.apply_outputs(dtx_id, &[ctx], &[true]);
        assert_eq!(shard.unspent_value_sum(), after_first);
        assert_eq!(shard.spent_count(), 1);
    }

    #[test]
    fn completed_tx_cache_evicts_oldest_once_over_capacity() {
        let mut shard = LockingShard::new(ShardRange::new(0, 255), 1, 2);
        for i in 0..3u8 {
            let u = Hash::from_bytes([i + 1; 32]);
            shard.preseed([(u, UhsElement::new(1, Epoch(0)))]);
            let ctx = attested(vec![Input { id: u }], vec![Output { owner_uhs_id: Hash::from_bytes([0xff; 32]), value: 1 }]);
            let dtx_id = Hash::from_bytes([0xe0 + i; 32]);
            shard.lock_outputs(dtx_id, &[ctx.clone()]);
            shard.apply_outputs(dtx_id, &[ctx.clone()], &[true]);
            if i == 0 {
                assert!(shard.has_completed(&ctx.id), "first ctx tracked before eviction");
            }
        }
        // Only the two most recently completed ctxs fit in a capacity-2 cache.
        assert_eq!(shard.completed_tx.len(), 2);
    }

    #[test]
    fn discard_unknown_dtx_is_a_no_op() {
        let mut shard = full_range_shard(1);
        shard.discard_dtx(Hash::from_bytes([0x99; 32]));
    }

    #[test]
    fn lock_outputs_replay_returns_memoized_result() {
        let u1 = Hash::from_bytes([1; 32]);
        let mut shard = full_range_shard(1);
        shard.preseed([(u1, UhsElement::new(10, Epoch(0)))]);
        let ctx = attested(vec![Input { id: u1 }], vec![Output { owner_uhs_id: Hash::from_bytes([2; 32]), value: 10 }]);
        let dtx_id = Hash::from_bytes([0xd3; 32]);

        let first = shard.lock_outputs(dtx_id, &[ctx.clone()]);
        let second = shard.lock_outputs(dtx_id, &[ctx]);
        assert_eq!(first, second);
        assert_eq!(shard.locked_count(), 1, "replay must not lock twice");
    }

    #[test]
    fn abort_returns_locked_inputs_to_unspent() {
        let u1 = Hash::from_bytes([1; 32]);
        let mut shard = full_range_shard(1);
        shard.preseed([(u1, UhsElement::new(10, Epoch(0)))]);
        let ctx = attested(vec![Input { id: u1 }], vec![Output { owner_uhs_id: Hash::from_bytes([2; 32]), value: 10 }]);
        let dtx_id = Hash::from_bytes([0xd4; 32]);
        shard.lock_outputs(dtx_id, &[ctx.clone()]);

        shard.apply_outputs(dtx_id, &[ctx], &[false]);
        assert!(shard.is_unspent(&u1));
        assert_eq!(shard.locked_count(), 0);
    }

    #[test]
    fn snapshot_round_trips() {
        let u1 = Hash::from_bytes([1; 32]);
        let mut shard = full_range_shard(1);
        shard.preseed([(u1, UhsElement::new(10, Epoch(0)))]);
        let ctx = attested(vec![Input { id: u1 }], vec![Output { owner_uhs_id: Hash::from_bytes([2; 32]), value: 10 }]);
        let dtx_id = Hash::from_bytes([0xd5; 32]);
        shard.lock_outputs(dtx_id, &[ctx.clone()]);
        shard.apply_outputs(dtx_id, &[ctx], &[true]);

        let snap = shard.snapshot();
        let restored = LockingShard::restore(snap);
        assert_eq!(restored.unspent_value_sum(), shard.unspent_value_sum());
        assert_eq!(restored.spent_count(), shard.spent_count());
        assert_eq!(restored.highest_epoch(), shard.highest_epoch());
    }
}
