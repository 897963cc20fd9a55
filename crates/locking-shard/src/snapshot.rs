use bytes::{Buf, BufMut};
use uhsledger_codec::{CodecResult, Decode, Encode};
use uhsledger_primitives::{Epoch, Hash, ShardRange, UhsElement};

macro_rules! plain_struct_codec {
    ($name:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: $ty),+
        }

        impl Encode for $name {
            fn encode(&self, buf: &mut impl BufMut) {
                $(self.$field.encode(buf);)+
            }
        }

        impl Decode for $name {
            fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
                Ok($name { $($field: Decode::decode(buf)?),+ })
            }
        }
    };
}

plain_struct_codec!(UnspentEntry { id: Hash, element: UhsElement });
plain_struct_codec!(LockedEntry { id: Hash, element: UhsElement, dtx_id: Hash });
plain_struct_codec!(PreparedEntry { dtx_id: Hash, oks: Vec<bool> });

/// Plain-data view of a [`crate::LockingShard`]'s full state, used by the
/// state machine's snapshot encoding. `prepared` is lossily flattened to
/// per-ctx ok/err flags — enough to keep `apply_outputs` deterministic after
/// a restore, though a replayed `lock_outputs` on a restored replica returns
/// a generic placeholder error rather than the exact original one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardSnapshot {
    pub range: ShardRange,
    pub attestation_threshold: u64,
    pub unspent: Vec<UnspentEntry>,
    pub locked: Vec<LockedEntry>,
    pub spent: Vec<UnspentEntry>,
    pub prepared: Vec<PreparedEntry>,
    pub applied: Vec<Hash>,
    /// Oldest-first: `completed_tx[0]` is the next entry `note_completed`
    /// would evict.
    pub completed_tx: Vec<Hash>,
    pub completed_tx_capacity: u64,
    pub highest_epoch: Epoch,
}

impl Encode for ShardSnapshot {
    fn encode(&self, buf: &mut impl BufMut) {
        self.range.encode(buf);
        self.attestation_threshold.encode(buf);
        self.unspent.encode(buf);
        self.locked.encode(buf);
        self.spent.encode(buf);
        self.prepared.encode(buf);
        self.applied.encode(buf);
        self.completed_tx.encode(buf);
        self.completed_tx_capacity.encode(buf);
        self.highest_epoch.encode(buf);
    }
}

impl Decode for ShardSnapshot {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(ShardSnapshot {
            range: ShardRange::decode(buf)?,
            attestation_threshold: u64::decode(buf)?,
            unspent: Vec::<UnspentEntry>::decode(buf)?,
            locked: Vec::<LockedEntry>::decode(buf)?,
            spent: Vec::<UnspentEntry>::decode(buf)?,
            prepared: Vec::<PreparedEntry>::decode(buf)?,
            applied: Vec::<Hash>::decode(buf)?,
            completed_tx: Vec::<Hash>::decode(buf)?,
            completed_tx_capacity: u64::decode(buf)?,
            highest_epoch: Epoch::decode(buf)?,
        })
    }
}
