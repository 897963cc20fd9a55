use uhsledger_primitives::Hash;

/// Error taxonomy entries the atomizer can surface, matching `spec.md` §7:
/// `stxo_range`, `inputs_spent(ids)`, and `incomplete`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    /// The oldest attestation backing this ctx predates the spent-cache
    /// window, so the atomizer can no longer prove its inputs aren't a
    /// double spend.
    #[error("attestation too old for ctx {0}: outside the spent-cache window")]
    StxoRange(Hash),

    /// One or more inputs already appear in the spent cache.
    #[error("ctx {ctx} spends inputs already present in the spent cache: {inputs:?}")]
    InputsSpent { ctx: Hash, inputs: Vec<Hash> },

    /// A ctx's attestation set never reached completeness before its
    /// aggregation entry aged out of the controller's tracking window.
    #[error("ctx {0} evicted before reaching full attestation")]
    Incomplete(Hash),
}

impl TxError {
    pub fn ctx_id(&self) -> Hash {
        match self {
            TxError::StxoRange(id) => *id,
            TxError::InputsSpent { ctx, .. } => *ctx,
            TxError::Incomplete(id) => *id,
        }
    }
}
