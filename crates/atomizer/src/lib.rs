//! # uhsledger-atomizer
//!
//! The atomizer state machine from `spec.md` §4.2: aggregates already-complete
//! ctx's into an ordered pending set, seals them into height-ordered blocks,
//! and maintains the rolling spent-UHS-ID cache that lets it reject stale or
//! double-spending attestations without re-deriving the whole UHS. Runs
//! behind a `uhsledger_replog::ReplicatedLog<AtomizerStateMachine>`; only the leader's copy ever
//! serves RPCs, but every replica applies the same command sequence.

mod atomizer;
mod block;
mod cache;
mod command;
mod error;
mod state_machine;

pub use atomizer::{Atomizer, AtomizerSnapshot};
pub use block::Block;
pub use cache::SpentCache;
pub use command::{AtomizerCommand, AtomizerResponse, CompleteAggregate};
pub use error::TxError;
pub use state_machine::AtomizerStateMachine;
