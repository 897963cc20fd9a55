use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// The inclusive range of leading hash bytes a locking shard is responsible
/// for: `lo <= hash.leading_byte() <= hi`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRange {
    pub lo: u8,
    pub hi: u8,
}

impl ShardRange {
    pub fn new(lo: u8, hi: u8) -> Self {
        assert!(lo <= hi, "shard range must be non-empty: lo <= hi");
        ShardRange { lo, hi }
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        let b = hash.leading_byte();
        b >= self.lo && b <= self.hi
    }

    /// Splits the full `[0, 255]` byte space into `n` contiguous,
    /// non-overlapping ranges covering every possible leading byte.
    pub fn partition(n: u8) -> Vec<ShardRange> {
        assert!(n > 0, "partition count must be positive");
        let span = 256u16 / n as u16;
        let mut ranges = Vec::with_capacity(n as usize);
        let mut lo = 0u16;
        for i in 0..n {
            let hi = if i == n - 1 { 255 } else { lo + span - 1 };
            ranges.push(ShardRange {
                lo: lo as u8,
                hi: hi as u8,
            });
            lo = hi + 1;
        }
        ranges
    }
}
