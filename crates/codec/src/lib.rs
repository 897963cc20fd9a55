//! # uhsledger-codec
//!
//! The wire encoding shared by every RPC and persisted-state format in this
//! workspace: little-endian fixed-width integers, `u64`-length-prefixed
//! variable-length sequences, and a `u8` tag followed by a body for sum
//! types. Every component (atomizer, locking shard, coordinator, net) builds
//! its own message enums on top of the [`Encode`]/[`Decode`] traits defined
//! here rather than re-deriving framing rules.

mod error;
mod primitive_impls;

pub use error::{CodecError, CodecResult};

use bytes::{Buf, BufMut};

/// Writes `self` in canonical wire form.
pub trait Encode {
    fn encode(&self, buf: &mut impl BufMut);

    /// Convenience: encode into a freshly allocated buffer.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// Reads `Self` from canonical wire form, consuming exactly the bytes that
/// belong to it and leaving the rest of `buf` for the next field.
pub trait Decode: Sized {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self>;
}
