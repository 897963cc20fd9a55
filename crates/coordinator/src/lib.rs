//! # uhsledger-coordinator
//!
//! The distributed-transaction orchestrator from `spec.md` §4.5: itself a
//! replicated state machine (`prepare`/`commit`/`discard`/`get`) plus the
//! leader-side `execute_transaction` driver that fans a ctx out to every
//! shard it touches and the `recover` routine a freshly-elected leader runs
//! to resume any dtx stranded mid-protocol by the previous leader.

mod command;
mod dtx;
mod error;
mod execute;
mod recovery;
mod shard_client;
mod state_machine;

pub use command::{CoordinatorCommand, CoordinatorResponse};
pub use dtx::{DtxRecord, DtxStatus};
pub use error::CoordinatorError;
pub use execute::execute_transaction;
pub use recovery::recover;
pub use shard_client::{relevant_shards, LocalShardClient, ShardClient};
pub use state_machine::CoordinatorStateMachine;
