use bytes::{Buf, BufMut};
use uhsledger_codec::{CodecError, CodecResult, Decode, Encode};
use uhsledger_primitives::{BlockHeight, Ctx};

use crate::block::Block;
use crate::error::TxError;

/// One already-complete aggregate: a ctx plus the height of its oldest
/// backing attestation, as replicated by the controller's
/// `aggregate_tx_notify_request`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompleteAggregate {
    pub ctx: Ctx,
    pub oldest_attestation: BlockHeight,
}

impl Encode for CompleteAggregate {
    fn encode(&self, buf: &mut impl BufMut) {
        self.ctx.encode(buf);
        self.oldest_attestation.encode(buf);
    }
}

impl Decode for CompleteAggregate {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(CompleteAggregate {
            ctx: Ctx::decode(buf)?,
            oldest_attestation: BlockHeight::decode(buf)?,
        })
    }
}

/// The atomizer state machine's command envelope, per `spec.md` §4.2/§6.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtomizerCommand {
    /// `aggregate_tx_notify_request` — one or more already-complete
    /// aggregates to fold into the pending block.
    InsertComplete(Vec<CompleteAggregate>),
    /// `make_block_request`.
    MakeBlock,
    /// `get_block_request`.
    GetBlock(BlockHeight),
    /// `prune_request`.
    Prune(BlockHeight),
}

const TAG_INSERT_COMPLETE: u8 = 0;
const TAG_MAKE_BLOCK: u8 = 1;
const TAG_GET_BLOCK: u8 = 2;
const TAG_PRUNE: u8 = 3;

impl Encode for AtomizerCommand {
    fn encode(&self, buf: &mut impl BufMut) {
        match self {
            AtomizerCommand::InsertComplete(aggs) => {
                buf.put_u8(TAG_INSERT_COMPLETE);
                aggs.encode(buf);
            }
            AtomizerCommand::MakeBlock => buf.put_u8(TAG_MAKE_BLOCK),
            AtomizerCommand::GetBlock(h) => {
                buf.put_u8(TAG_GET_BLOCK);
                h.encode(buf);
            }
            AtomizerCommand::Prune(h) => {
                buf.put_u8(TAG_PRUNE);
                h.encode(buf);
            }
        }
    }
}

impl Decode for AtomizerCommand {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        match u8::decode(buf)? {
            TAG_INSERT_COMPLETE => Ok(AtomizerCommand::InsertComplete(Vec::<CompleteAggregate>::decode(buf)?)),
            TAG_MAKE_BLOCK => Ok(AtomizerCommand::MakeBlock),
            TAG_GET_BLOCK => Ok(AtomizerCommand::GetBlock(BlockHeight::decode(buf)?)),
            TAG_PRUNE => Ok(AtomizerCommand::Prune(BlockHeight::decode(buf)?)),
            tag => Err(CodecError::InvalidTag(tag)),
        }
    }
}

/// The atomizer state machine's response envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtomizerResponse {
    /// Response to `InsertComplete`: any errors encountered, one per
    /// rejected aggregate (matches `errors()` in the original).
    Inserted(Vec<TxError>),
    /// `make_block_response{ block, errors[] }`.
    MadeBlock(Block, Vec<TxError>),
    /// `get_block_response{ block }`, or `None` if the height isn't cached.
    Got(Option<Block>),
    /// `prune_request` has no response payload.
    Pruned,
}
