use bytes::{Buf, BufMut};
use uhsledger_codec::{CodecError, CodecResult, Decode, Encode};
use uhsledger_primitives::{Ctx, Hash};

/// The coordinator's command envelope. Reads (`get`) are deliberately not a
/// command here — a dtx record is read directly off the leader's own state
/// (see `uhsledger_replog::LocalReplicatedLog::read_state`/`ReplicaHandle::
/// read_state`) rather than spending a log index on every status check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoordinatorCommand {
    Prepare { dtx_id: Hash, ctxs: Vec<Ctx> },
    Commit { dtx_id: Hash, complete: Vec<bool> },
    Discard { dtx_id: Hash },
}

const TAG_PREPARE: u8 = 0;
const TAG_COMMIT: u8 = 1;
const TAG_DISCARD: u8 = 2;

impl Encode for CoordinatorCommand {
    fn encode(&self, buf: &mut impl BufMut) {
        match self {
            CoordinatorCommand::Prepare { dtx_id, ctxs } => {
                buf.put_u8(TAG_PREPARE);
                dtx_id.encode(buf);
                ctxs.encode(buf);
            }
            CoordinatorCommand::Commit { dtx_id, complete } => {
                buf.put_u8(TAG_COMMIT);
                dtx_id.encode(buf);
                complete.encode(buf);
            }
            CoordinatorCommand::Discard { dtx_id } => {
                buf.put_u8(TAG_DISCARD);
                dtx_id.encode(buf);
            }
        }
    }
}

impl Decode for CoordinatorCommand {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        match u8::decode(buf)? {
            TAG_PREPARE => Ok(CoordinatorCommand::Prepare { dtx_id: Hash::decode(buf)?, ctxs: Vec::<Ctx>::decode(buf)? }),
            TAG_COMMIT => Ok(CoordinatorCommand::Commit {
                dtx_id: Hash::decode(buf)?,
                complete: Vec::<bool>::decode(buf)?,
            }),
            TAG_DISCARD => Ok(CoordinatorCommand::Discard { dtx_id: Hash::decode(buf)? }),
            tag => Err(CodecError::InvalidTag(tag)),
        }
    }
}

/// The coordinator's response envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoordinatorResponse {
    Prepared,
    Committed,
    Discarded,
    /// `Prepare`/`Commit` on a dtx_id already past that stage — the command
    /// was a no-op replay, not a fresh transition.
    AlreadyRecorded,
}
