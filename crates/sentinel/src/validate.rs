use std::collections::HashSet;

use uhsledger_config::SentinelConfig;
use uhsledger_primitives::{Ctx, Epoch, Hash, Input, Output};

use crate::error::SentinelError;

/// A client-submitted transaction before it has been compacted and attested:
/// inputs carry the value being spent (needed for the balance check), which
/// the compact [`Ctx`] form deliberately drops once attested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullTxInput {
    pub uhs_id: Hash,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullTx {
    pub inputs: Vec<FullTxInput>,
    pub outputs: Vec<Output>,
}

/// Runs the sentinel's static validity checks (spec.md §4.6 / §7
/// *static_invalid*): input uniqueness, size bounds, and — the simple
/// (non-confidential) variant's balance rule — input value sum equals output
/// value sum. Does not check signatures; a full transaction has none until
/// the client-facing layer that isn't part of this core attaches one.
pub fn check_static_validity(tx: &FullTx, cfg: &SentinelConfig) -> Result<(), SentinelError> {
    if tx.inputs.is_empty() {
        return Err(SentinelError::NoInputs);
    }
    if tx.inputs.len() > cfg.max_inputs {
        return Err(SentinelError::TooManyInputs { have: tx.inputs.len(), max: cfg.max_inputs });
    }
    if tx.outputs.len() > cfg.max_outputs {
        return Err(SentinelError::TooManyOutputs { have: tx.outputs.len(), max: cfg.max_outputs });
    }

    let mut seen = HashSet::with_capacity(tx.inputs.len());
    for input in &tx.inputs {
        if !seen.insert(input.uhs_id) {
            return Err(SentinelError::DuplicateInput(input.uhs_id));
        }
    }

    let input_sum: u128 = tx.inputs.iter().map(|i| i.value as u128).sum();
    let output_sum: u128 = tx.outputs.iter().map(|o| o.value as u128).sum();
    if input_sum != output_sum {
        return Err(SentinelError::BalanceMismatch { input_sum, output_sum });
    }

    Ok(())
}

/// Produces the compact transaction form for an already-statically-valid
/// full transaction, with no attestations yet attached.
pub fn compact(tx: &FullTx, epoch: Epoch) -> Ctx {
    let inputs = tx.inputs.iter().map(|i| Input { id: i.uhs_id }).collect();
    Ctx::new(inputs, tx.outputs.clone(), vec![], epoch)
}
