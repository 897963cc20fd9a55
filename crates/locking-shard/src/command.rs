use bytes::{Buf, BufMut};
use uhsledger_codec::{CodecError, CodecResult, Decode, Encode};
use uhsledger_primitives::{Ctx, Epoch, Hash};

use crate::audit::AuditOutcome;
use crate::error::LockError;

/// The locking shard's command envelope, per `spec.md` §4 (2PC pipeline) and
/// §6.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockingShardCommand {
    /// `lock_outputs(dtx_id, txs)`.
    Lock { dtx_id: Hash, txs: Vec<Ctx> },
    /// `apply_outputs(dtx_id, txs, complete)` — `complete[i]` is whether
    /// `txs[i]` should commit (`true`) or abort (`false`).
    Apply { dtx_id: Hash, txs: Vec<Ctx>, complete: Vec<bool> },
    /// `discard_dtx(dtx_id)`.
    Discard { dtx_id: Hash },
    /// Periodic audit tick, driven by the owning process observing a new
    /// epoch rather than by client traffic.
    Audit { epoch: Epoch },
}

const TAG_LOCK: u8 = 0;
const TAG_APPLY: u8 = 1;
const TAG_DISCARD: u8 = 2;
const TAG_AUDIT: u8 = 3;

impl Encode for LockingShardCommand {
    fn encode(&self, buf: &mut impl BufMut) {
        match self {
            LockingShardCommand::Lock { dtx_id, txs } => {
                buf.put_u8(TAG_LOCK);
                dtx_id.encode(buf);
                txs.encode(buf);
            }
            LockingShardCommand::Apply { dtx_id, txs, complete } => {
                buf.put_u8(TAG_APPLY);
                dtx_id.encode(buf);
                txs.encode(buf);
                complete.encode(buf);
            }
            LockingShardCommand::Discard { dtx_id } => {
                buf.put_u8(TAG_DISCARD);
                dtx_id.encode(buf);
            }
            LockingShardCommand::Audit { epoch } => {
                buf.put_u8(TAG_AUDIT);
                epoch.encode(buf);
            }
        }
    }
}

impl Decode for LockingShardCommand {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        match u8::decode(buf)? {
            TAG_LOCK => Ok(LockingShardCommand::Lock { dtx_id: Hash::decode(buf)?, txs: Vec::<Ctx>::decode(buf)? }),
            TAG_APPLY => Ok(LockingShardCommand::Apply {
                dtx_id: Hash::decode(buf)?,
                txs: Vec::<Ctx>::decode(buf)?,
                complete: Vec::<bool>::decode(buf)?,
            }),
            TAG_DISCARD => Ok(LockingShardCommand::Discard { dtx_id: Hash::decode(buf)? }),
            TAG_AUDIT => Ok(LockingShardCommand::Audit { epoch: Epoch::decode(buf)? }),
            tag => Err(CodecError::InvalidTag(tag)),
        }
    }
}

/// The locking shard's response envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockingShardResponse {
    Locked(Vec<Result<(), LockError>>),
    Applied,
    Discarded,
    Audited(AuditOutcome),
}
