use serde::{Deserialize, Serialize};

use crate::epoch::Epoch;
use crate::hash::Hash;

/// A new UHS element a transaction wants to create, simple (non-confidential)
/// variant: a plain owner id and value rather than a Pedersen commitment.
///
/// The confidential variant (commitment + rangeproof) is intentionally not
/// implemented here; see `DESIGN.md` for the rationale and the reserved
/// `confidential` feature gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub owner_uhs_id: Hash,
    pub value: u64,
}

/// A reference to an existing UHS element a transaction wants to spend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub id: Hash,
}

/// A signature-like attestation authorizing the spend of one or more inputs.
/// The sentinel's static validator is responsible for producing these; the
/// locking shard only checks that enough of them are present (threshold) and
/// well-formed, it does not itself verify cryptographic validity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub signer: Hash,
    pub signature: Vec<u8>,
}

/// A compact transaction: the unit the atomizer and locking shards operate
/// on once the sentinel has produced it from a client request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ctx {
    pub id: Hash,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub attestations: Vec<Attestation>,
    pub epoch: Epoch,
}

impl Ctx {
    /// Builds a ctx and derives its id from inputs/outputs, matching the
    /// canonical encoding rule: id is stable regardless of attestations, so
    /// re-attesting a ctx never changes its identity.
    pub fn new(
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        attestations: Vec<Attestation>,
        epoch: Epoch,
    ) -> Self {
        let id = compute_ctx_id(&inputs, &outputs);
        Ctx {
            id,
            inputs,
            outputs,
            attestations,
            epoch,
        }
    }
}

/// Derives the UHS id of an output: `SHA256` of its canonical field encoding.
/// Exposed as a free function (rather than only via `Ctx::new`) so a future
/// confidential variant can reuse the same call site shape.
pub fn uhs_id_of(output: &Output) -> Hash {
    let mut buf = Vec::with_capacity(40);
    buf.extend_from_slice(output.owner_uhs_id.as_bytes());
    buf.extend_from_slice(&output.value.to_le_bytes());
    Hash::digest(&buf)
}

fn compute_ctx_id(inputs: &[Input], outputs: &[Output]) -> Hash {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(inputs.len() as u64).to_le_bytes());
    for input in inputs {
        buf.extend_from_slice(input.id.as_bytes());
    }
    buf.extend_from_slice(&(outputs.len() as u64).to_le_bytes());
    for output in outputs {
        buf.extend_from_slice(uhs_id_of(output).as_bytes());
    }
    Hash::digest(&buf)
}
