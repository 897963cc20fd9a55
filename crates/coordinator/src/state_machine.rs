use std::collections::{HashMap, VecDeque};

use bytes::{Buf, BufMut};
use uhsledger_codec::{CodecResult, Decode, Encode};
use uhsledger_primitives::{Ctx, Hash};
use uhsledger_replog::StateMachine;

use crate::command::{CoordinatorCommand, CoordinatorResponse};
use crate::dtx::{DtxRecord, DtxStatus};

/// The replicated coordinator state machine: `prepare`/`commit`/`discard`
/// transitions over one dtx record per id, plus a capacity-bounded
/// discarded-dtx cache so a delayed replay of an already-resolved dtx still
/// gets an idempotent answer instead of a fatal "unknown dtx" error.
#[derive(Debug)]
pub struct CoordinatorStateMachine {
    records: HashMap<Hash, DtxRecord>,
    discarded_order: VecDeque<Hash>,
    completed_cache_capacity: usize,
}

impl CoordinatorStateMachine {
    pub fn new(completed_cache_capacity: usize) -> Self {
        CoordinatorStateMachine {
            records: HashMap::new(),
            discarded_order: VecDeque::new(),
            completed_cache_capacity,
        }
    }

    pub fn get(&self, dtx_id: &Hash) -> Option<&DtxRecord> {
        self.records.get(dtx_id)
    }

    /// Every dtx currently in `Committed` status — the set a newly-elected
    /// leader must re-drive through `apply_outputs`/`discard` during
    /// recovery, since a crash between `Commit` and `Discard` leaves no
    /// other record of unfinished work.
    pub fn committed_dtxs(&self) -> Vec<(Hash, Vec<Ctx>, Vec<bool>)> {
        self.records
            .iter()
            .filter_map(|(id, rec)| match &rec.status {
                DtxStatus::Committed(complete) => Some((*id, rec.ctxs.clone(), complete.clone())),
                _ => None,
            })
            .collect()
    }

    fn evict_if_over_capacity(&mut self) {
        while self.discarded_order.len() > self.completed_cache_capacity {
            if let Some(oldest) = self.discarded_order.pop_front() {
                self.records.remove(&oldest);
            }
        }
    }
}

impl StateMachine for CoordinatorStateMachine {
    type Command = CoordinatorCommand;
    type Response = CoordinatorResponse;

    fn apply(&mut self, _log_index: u64, cmd: CoordinatorCommand) -> CoordinatorResponse {
        match cmd {
            CoordinatorCommand::Prepare { dtx_id, ctxs } => {
                if self.records.contains_key(&dtx_id) {
                    return CoordinatorResponse::AlreadyRecorded;
                }
                self.records.insert(dtx_id, DtxRecord { ctxs, status: DtxStatus::Preparing });
                CoordinatorResponse::Prepared
            }
            CoordinatorCommand::Commit { dtx_id, complete } => {
                let Some(record) = self.records.get_mut(&dtx_id) else {
                    uhsledger_primitives::FatalError::new(format!("commit for unprepared dtx {dtx_id}")).abort();
                };
                if record.status != DtxStatus::Preparing {
                    return CoordinatorResponse::AlreadyRecorded;
                }
                record.status = DtxStatus::Committed(complete);
                CoordinatorResponse::Committed
            }
            CoordinatorCommand::Discard { dtx_id } => {
                if let Some(record) = self.records.get_mut(&dtx_id) {
                    if record.status != DtxStatus::Discarded {
                        record.status = DtxStatus::Discarded;
                        self.discarded_order.push_back(dtx_id);
                        self.evict_if_over_capacity();
                    }
                }
                CoordinatorResponse::Discarded
            }
        }
    }

    fn snapshot(&self) -> Vec<u8> {
        let entries: Vec<RecordEntry> = self
            .records
            .iter()
            .map(|(id, rec)| RecordEntry { dtx_id: *id, ctxs: rec.ctxs.clone(), status: StatusWire::from(&rec.status) })
            .collect();
        let mut buf = Vec::new();
        entries.encode(&mut buf);
        self.discarded_order.iter().copied().collect::<Vec<_>>().encode(&mut buf);
        (self.completed_cache_capacity as u64).encode(&mut buf);
        buf
    }

    fn restore(&mut self, bytes: &[u8]) {
        let mut slice = bytes;
        let entries = Vec::<RecordEntry>::decode(&mut slice).expect("corrupt coordinator snapshot");
        let discarded_order = Vec::<Hash>::decode(&mut slice).expect("corrupt coordinator snapshot discard order");
        let capacity = u64::decode(&mut slice).expect("corrupt coordinator snapshot capacity");

        self.records = entries
            .into_iter()
            .map(|e| (e.dtx_id, DtxRecord { ctxs: e.ctxs, status: e.status.into() }))
            .collect();
        self.discarded_order = discarded_order.into_iter().collect();
        self.completed_cache_capacity = capacity as usize;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum StatusWire {
    Preparing,
    Committed(Vec<bool>),
    Discarded,
}

impl From<&DtxStatus> for StatusWire {
    fn from(s: &DtxStatus) -> Self {
        match s {
            DtxStatus::Preparing => StatusWire::Preparing,
            DtxStatus::Committed(c) => StatusWire::Committed(c.clone()),
            DtxStatus::Discarded => StatusWire::Discarded,
        }
    }
}

impl From<StatusWire> for DtxStatus {
    fn from(s: StatusWire) -> Self {
        match s {
            StatusWire::Preparing => DtxStatus::Preparing,
            StatusWire::Committed(c) => DtxStatus::Committed(c),
            StatusWire::Discarded => DtxStatus::Discarded,
        }
    }
}

const STATUS_TAG_PREPARING: u8 = 0;
const STATUS_TAG_COMMITTED: u8 = 1;
const STATUS_TAG_DISCARDED: u8 = 2;

impl Encode for StatusWire {
    fn encode(&self, buf: &mut impl BufMut) {
        match self {
            StatusWire::Preparing => buf.put_u8(STATUS_TAG_PREPARING),
            StatusWire::Committed(c) => {
                buf.put_u8(STATUS_TAG_COMMITTED);
                c.encode(buf);
            }
            StatusWire::Discarded => buf.put_u8(STATUS_TAG_DISCARDED),
        }
    }
}

impl Decode for StatusWire {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        match u8::decode(buf)? {
            STATUS_TAG_PREPARING => Ok(StatusWire::Preparing),
            STATUS_TAG_COMMITTED => Ok(StatusWire::Committed(Vec::<bool>::decode(buf)?)),
            STATUS_TAG_DISCARDED => Ok(StatusWire::Discarded),
            tag => Err(uhsledger_codec::CodecError::InvalidTag(tag)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct RecordEntry {
    dtx_id: Hash,
    ctxs: Vec<Ctx>,
    status: StatusWire,
}

impl Encode for RecordEntry {
    fn encode(&self, buf: &mut impl BufMut) {
        self.dtx_id.encode(buf);
        self.ctxs.encode(buf);
        self.status.encode(buf);
    }
}

impl Decode for RecordEntry {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(RecordEntry {
            dtx_id: Hash::decode(buf)?,
            ctxs: Vec::<Ctx>::decode(buf)?,
            status: StatusWire::decode(buf)?,
        })
    }
}
