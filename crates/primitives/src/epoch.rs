use serde::{Deserialize, Serialize};

/// A monotone audit epoch. Elements created/destroyed in the UHS are stamped
/// with the epoch they were created/deleted in, and the locking shard's
/// `prune` discards spent elements whose deletion epoch is below a
/// caller-supplied watermark.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize)]
pub struct Epoch(pub u64);

impl Epoch {
    pub const GENESIS: Epoch = Epoch(0);

    pub fn next(self) -> Epoch {
        Epoch(self.0 + 1)
    }

    pub fn is_divisible_by(self, interval: u64) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

/// A block height produced by the atomizer. Height 0 is the (empty) genesis
/// block; the first call to `make_block` produces height 1.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    pub const GENESIS: BlockHeight = BlockHeight(0);

    pub fn next(self) -> BlockHeight {
        BlockHeight(self.0 + 1)
    }
}
