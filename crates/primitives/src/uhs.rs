use serde::{Deserialize, Serialize};

use crate::epoch::Epoch;

/// An element of the unspent-hash-set: the proof-bearing value behind an
/// opaque id, plus the epochs it was created in and (once spent) deleted in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UhsElement {
    /// Simple-variant auxiliary data: the plain value. A confidential variant
    /// would replace this with a commitment + rangeproof blob.
    pub value: u64,
    pub creation_epoch: Epoch,
    pub deletion_epoch: Option<Epoch>,
}

impl UhsElement {
    pub fn new(value: u64, creation_epoch: Epoch) -> Self {
        UhsElement {
            value,
            creation_epoch,
            deletion_epoch: None,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.deletion_epoch.is_some()
    }
}
