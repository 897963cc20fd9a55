use std::collections::BTreeMap;

use bytes::{Buf, BufMut};
use uhsledger_codec::{Decode, Encode};
use uhsledger_primitives::BlockHeight;
use uhsledger_replog::StateMachine;

use crate::atomizer::{Atomizer, AtomizerSnapshot};
use crate::block::Block;
use crate::command::{AtomizerCommand, AtomizerResponse};

/// The replicated atomizer state machine: dispatches [`AtomizerCommand`]s
/// committed by the log onto an [`Atomizer`], and maintains the block
/// cache (`get_block`/`prune`) alongside it.
///
/// Grounded on `state_machine.cpp::commit`'s `std::visit` dispatch over the
/// request variant.
#[derive(Debug)]
pub struct AtomizerStateMachine {
    atomizer: Atomizer,
    blocks: BTreeMap<u64, Block>,
}

impl AtomizerStateMachine {
    pub fn new(spent_cache_depth: u64) -> Self {
        AtomizerStateMachine {
            atomizer: Atomizer::new(BlockHeight::GENESIS, spent_cache_depth),
            blocks: BTreeMap::new(),
        }
    }

    pub fn height(&self) -> BlockHeight {
        self.atomizer.height()
    }
}

impl StateMachine for AtomizerStateMachine {
    type Command = AtomizerCommand;
    type Response = AtomizerResponse;

    fn apply(&mut self, _log_index: u64, cmd: AtomizerCommand) -> AtomizerResponse {
        match cmd {
            AtomizerCommand::InsertComplete(aggs) => {
                let mut errors = Vec::new();
                for agg in aggs {
                    if let Err(e) = self.atomizer.insert_complete(agg.oldest_attestation, agg.ctx) {
                        tracing::warn!(error = %e, "rejected complete aggregate");
                        errors.push(e);
                    }
                }
                AtomizerResponse::Inserted(errors)
            }
            AtomizerCommand::MakeBlock => {
                let (block, errors) = self.atomizer.make_block();
                self.blocks.insert(block.height.0, block.clone());
                tracing::info!(height = block.height.0, n_txs = block.transactions.len(), "sealed block");
                AtomizerResponse::MadeBlock(block, errors)
            }
            AtomizerCommand::GetBlock(height) => AtomizerResponse::Got(self.blocks.get(&height.0).cloned()),
            AtomizerCommand::Prune(below) => {
                self.blocks.retain(|&h, _| h >= below.0);
                AtomizerResponse::Pruned
            }
        }
    }

    fn snapshot(&self) -> Vec<u8> {
        let snap = self.atomizer.snapshot();
        let mut buf = Vec::new();
        encode_atomizer_snapshot(&snap, &mut buf);
        let block_list: Vec<(u64, Block)> = self.blocks.iter().map(|(h, b)| (*h, b.clone())).collect();
        block_list.encode(&mut buf);
        buf
    }

    fn restore(&mut self, bytes: &[u8]) {
        let mut slice = bytes;
        let snap = decode_atomizer_snapshot(&mut slice).expect("corrupt atomizer snapshot");
        self.atomizer = Atomizer::restore(snap);
        let block_list = Vec::<(u64, Block)>::decode(&mut slice).expect("corrupt atomizer snapshot block cache");
        self.blocks = block_list.into_iter().collect();
    }
}

fn encode_atomizer_snapshot(snap: &AtomizerSnapshot, buf: &mut impl BufMut) {
    snap.height.encode(buf);
    let pending: Vec<_> = snap
        .pending
        .iter()
        .map(|(ctx, h)| crate::command::CompleteAggregate { ctx: ctx.clone(), oldest_attestation: *h })
        .collect();
    pending.encode(buf);
    (snap.cache_depth as u64).encode(buf);
    snap.cache_buckets.encode(buf);
}

fn decode_atomizer_snapshot(buf: &mut impl Buf) -> uhsledger_codec::CodecResult<AtomizerSnapshot> {
    let height = BlockHeight::decode(buf)?;
    let pending_aggs = Vec::<crate::command::CompleteAggregate>::decode(buf)?;
    let cache_depth = u64::decode(buf)? as usize;
    let cache_buckets = Vec::<Vec<uhsledger_primitives::Hash>>::decode(buf)?;
    Ok(AtomizerSnapshot {
        height,
        pending: pending_aggs.into_iter().map(|a| (a.ctx, a.oldest_attestation)).collect(),
        cache_depth,
        cache_buckets,
    })
}
