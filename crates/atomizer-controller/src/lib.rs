//! # uhsledger-atomizer-controller
//!
//! The leader-side driver that sits in front of the replicated
//! `uhsledger-atomizer` state machine: collects per-input attestations into
//! complete ctx's, replicates them, runs the block-sealing timer, and evicts
//! aggregates that never finish attesting within their window.
//!
//! Grounded on `atomizer_raft.hpp`/`controller.cpp` — the original keeps this
//! bookkeeping in the raft wrapper rather than the atomizer state machine
//! itself, so the same split is kept here (see `DESIGN.md`).

mod aggregation;
mod ctx;
mod handle;
mod task;

pub use aggregation::AggregationTable;
pub use handle::{create_controller_task, ControllerHandle, TxNotify};
