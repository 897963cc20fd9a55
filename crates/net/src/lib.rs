//! # uhsledger-net
//!
//! Network/RPC framing per `SPEC_FULL.md` section 4.7/6: a length-prefixed
//! message envelope over any `AsyncRead + AsyncWrite` transport, and a
//! reconnect-with-backoff client loop grounded on
//! `util/network/connection_manager.hpp`. Actual TCP socket plumbing is out
//! of scope (see section 1's non-goals) — this crate defines the framing and
//! retry behavior plus an in-memory transport good enough to test against.

mod client;
mod envelope;
mod error;
mod memory;

pub use client::RpcClient;
pub use envelope::{read_frame, write_frame};
pub use error::NetError;
pub use memory::{memory_pair, MemoryConnection};
