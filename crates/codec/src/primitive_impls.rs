use bytes::{Buf, BufMut};
use uhsledger_primitives::{Attestation, BlockHeight, Ctx, Epoch, Hash, Input, Output, ShardRange, UhsElement};

use crate::{CodecError, CodecResult, Decode, Encode};

macro_rules! impl_le_int {
    ($ty:ty, $get:ident, $put:ident) => {
        impl Encode for $ty {
            fn encode(&self, buf: &mut impl BufMut) {
                buf.$put(*self);
            }
        }

        impl Decode for $ty {
            fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
                if buf.remaining() < std::mem::size_of::<$ty>() {
                    return Err(CodecError::UnexpectedEof);
                }
                Ok(buf.$get())
            }
        }
    };
}

impl_le_int!(u16, get_u16_le, put_u16_le);
impl_le_int!(u32, get_u32_le, put_u32_le);
impl_le_int!(u64, get_u64_le, put_u64_le);

impl Encode for u8 {
    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(*self);
    }
}

impl Decode for u8 {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        if buf.remaining() < 1 {
            return Err(CodecError::UnexpectedEof);
        }
        Ok(buf.get_u8())
    }
}

impl Encode for bool {
    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(if *self { 1 } else { 0 });
    }
}

impl Decode for bool {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(u8::decode(buf)? != 0)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, buf: &mut impl BufMut) {
        (self.len() as u64).encode(buf);
        for item in self {
            item.encode(buf);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        let len = read_len_prefix_count(buf)?;
        let mut out = Vec::with_capacity(len.min(1 << 20));
        for _ in 0..len {
            out.push(T::decode(buf)?);
        }
        Ok(out)
    }
}

/// Reads a `u64` item-count prefix for a `Vec<T>`, bounds-checked against the
/// remaining buffer under the assumption that every element is at least one
/// byte, so a corrupt/malicious count can't trigger an unbounded allocation.
fn read_len_prefix_count(buf: &mut impl Buf) -> CodecResult<usize> {
    if buf.remaining() < 8 {
        return Err(CodecError::UnexpectedEof);
    }
    let len = buf.get_u64_le() as usize;
    if len > buf.remaining() {
        return Err(CodecError::LengthPrefixTooLarge {
            claimed: len,
            remaining: buf.remaining(),
        });
    }
    Ok(len)
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, buf: &mut impl BufMut) {
        match self {
            None => buf.put_u8(0),
            Some(v) => {
                buf.put_u8(1);
                v.encode(buf);
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        match u8::decode(buf)? {
            0 => Ok(None),
            1 => Ok(Some(T::decode(buf)?)),
            tag => Err(CodecError::InvalidTag(tag)),
        }
    }
}

impl Encode for Hash {
    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_slice(self.as_bytes());
    }
}

impl Decode for Hash {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        if buf.remaining() < 32 {
            return Err(CodecError::UnexpectedEof);
        }
        let mut bytes = [0u8; 32];
        buf.copy_to_slice(&mut bytes);
        Ok(Hash::from_bytes(bytes))
    }
}

impl Encode for Epoch {
    fn encode(&self, buf: &mut impl BufMut) {
        self.0.encode(buf);
    }
}

impl Decode for Epoch {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(Epoch(u64::decode(buf)?))
    }
}

impl Encode for BlockHeight {
    fn encode(&self, buf: &mut impl BufMut) {
        self.0.encode(buf);
    }
}

impl Decode for BlockHeight {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(BlockHeight(u64::decode(buf)?))
    }
}

impl Encode for ShardRange {
    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.lo);
        buf.put_u8(self.hi);
    }
}

impl Decode for ShardRange {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        let lo = u8::decode(buf)?;
        let hi = u8::decode(buf)?;
        Ok(ShardRange::new(lo, hi))
    }
}

impl Encode for Output {
    fn encode(&self, buf: &mut impl BufMut) {
        self.owner_uhs_id.encode(buf);
        self.value.encode(buf);
    }
}

impl Decode for Output {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(Output {
            owner_uhs_id: Hash::decode(buf)?,
            value: u64::decode(buf)?,
        })
    }
}

impl Encode for Input {
    fn encode(&self, buf: &mut impl BufMut) {
        self.id.encode(buf);
    }
}

impl Decode for Input {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(Input { id: Hash::decode(buf)? })
    }
}

impl Encode for Attestation {
    fn encode(&self, buf: &mut impl BufMut) {
        self.signer.encode(buf);
        self.signature.encode(buf);
    }
}

impl Decode for Attestation {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(Attestation {
            signer: Hash::decode(buf)?,
            signature: Vec::<u8>::decode(buf)?,
        })
    }
}

impl Encode for Ctx {
    fn encode(&self, buf: &mut impl BufMut) {
        self.id.encode(buf);
        self.inputs.encode(buf);
        self.outputs.encode(buf);
        self.attestations.encode(buf);
        self.epoch.encode(buf);
    }
}

impl Decode for Ctx {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(Ctx {
            id: Hash::decode(buf)?,
            inputs: Vec::<Input>::decode(buf)?,
            outputs: Vec::<Output>::decode(buf)?,
            attestations: Vec::<Attestation>::decode(buf)?,
            epoch: Epoch::decode(buf)?,
        })
    }
}

impl Encode for UhsElement {
    fn encode(&self, buf: &mut impl BufMut) {
        self.value.encode(buf);
        self.creation_epoch.encode(buf);
        self.deletion_epoch.encode(buf);
    }
}

impl Decode for UhsElement {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(UhsElement {
            value: u64::decode(buf)?,
            creation_epoch: Epoch::decode(buf)?,
            deletion_epoch: Option::<Epoch>::decode(buf)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn roundtrip<T: Encode + Decode + PartialEq + std::fmt::Debug>(v: T) {
        let bytes = v.encode_to_vec();
        let mut slice = bytes.as_slice();
        let decoded = T::decode(&mut slice).expect("decode");
        assert_eq!(v, decoded);
        assert!(slice.is_empty(), "decode must consume the whole buffer");
    }

    #[test]
    fn hash_roundtrip() {
        roundtrip(Hash::digest(b"round trip me"));
    }

    #[test]
    fn ctx_roundtrip() {
        let ctx = Ctx::new(
            vec![Input { id: Hash::digest(b"in") }],
            vec![Output {
                owner_uhs_id: Hash::digest(b"owner"),
                value: 42,
            }],
            vec![Attestation {
                signer: Hash::digest(b"signer"),
                signature: vec![9, 9, 9],
            }],
            Epoch(7),
        );
        roundtrip(ctx);
    }

    #[test]
    fn truncated_buffer_errors_instead_of_panicking() {
        let bytes = Hash::digest(b"x").encode_to_vec();
        let mut slice = &bytes[..bytes.len() - 1];
        assert_eq!(Hash::decode(&mut slice), Err(CodecError::UnexpectedEof));
    }

    #[test]
    fn oversized_length_prefix_is_rejected_not_allocated() {
        let mut bytes = Vec::new();
        (u64::MAX).encode(&mut bytes);
        let mut slice = bytes.as_slice();
        let result = Vec::<u8>::decode(&mut slice);
        assert!(matches!(result, Err(CodecError::LengthPrefixTooLarge { .. })));
    }

    proptest! {
        #[test]
        fn u64_roundtrip(n: u64) {
            roundtrip(n);
        }

        #[test]
        fn vec_u8_roundtrip(v: Vec<u8>) {
            roundtrip(v);
        }
    }
}
