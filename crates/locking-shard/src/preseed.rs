use std::{fs, io, path::Path};

use bytes::{Buf, BufMut};
use uhsledger_codec::{CodecResult, Decode, Encode};
use uhsledger_primitives::{Hash, UhsElement};

/// One entry of a preseed file: a UHS id paired with the element behind it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreseedElement {
    pub id: Hash,
    pub element: UhsElement,
}

impl Encode for PreseedElement {
    fn encode(&self, buf: &mut impl BufMut) {
        self.id.encode(buf);
        self.element.encode(buf);
    }
}

impl Decode for PreseedElement {
    fn decode(buf: &mut impl Buf) -> CodecResult<Self> {
        Ok(PreseedElement {
            id: Hash::decode(buf)?,
            element: UhsElement::decode(buf)?,
        })
    }
}

/// Reads a preseed file written by [`write_preseed_file`]: a length-prefixed
/// list of [`PreseedElement`]s in the workspace's standard wire encoding.
pub fn load_preseed_file(path: impl AsRef<Path>) -> io::Result<Vec<PreseedElement>> {
    let bytes = fs::read(path)?;
    let mut slice = bytes.as_slice();
    Vec::<PreseedElement>::decode(&mut slice).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

/// Writes a preseed file, the inverse of [`load_preseed_file`]. Mostly useful
/// for tests and operational tooling that stage a shard's starting UHS.
pub fn write_preseed_file(path: impl AsRef<Path>, elements: &[PreseedElement]) -> io::Result<()> {
    fs::write(path, elements.to_vec().encode_to_vec())
}
