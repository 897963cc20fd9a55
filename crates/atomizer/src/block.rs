use bytes::{Buf, BufMut};
use uhsledger_codec::{CodecResult, Decode, Encode};
use uhsledger_primitives::{BlockHeight, Ctx};

/// An ordered batch of ctx sealed by the atomizer at a given height,
/// broadcast to shards and clients. Height 0 is the empty genesis block;
/// the first `make_block` call produces height 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub height: BlockHeight,
    pub transactions: Vec<Ctx>,
}

impl Encode for Block {
    fn encode(&self, buf: &mut impl BufMut) {
        self.height.encode(buf);
        self.transactions.encode(buf);
    }
}

impl Decode for Block {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(Block {
            height: BlockHeight::decode(buf)?,
            transactions: Vec::<Ctx>::decode(buf)?,
        })
    }
}
