use uhsledger_primitives::Hash;

/// The error taxonomy a sentinel surfaces, per `spec.md` §7: the
/// *static_invalid* cases a sentinel itself rejects before ever attesting,
/// plus the transport/state failures that can come back once a ctx has been
/// handed to the coordinator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SentinelError {
    #[error("transaction has duplicate input {0}")]
    DuplicateInput(Hash),

    #[error("transaction has {have} inputs, exceeding the bound of {max}")]
    TooManyInputs { have: usize, max: usize },

    #[error("transaction has {have} outputs, exceeding the bound of {max}")]
    TooManyOutputs { have: usize, max: usize },

    #[error("transaction has no inputs")]
    NoInputs,

    #[error("input value sum {input_sum} does not equal output value sum {output_sum}")]
    BalanceMismatch { input_sum: u128, output_sum: u128 },

    #[error("coordinator rejected ctx {0}: inputs locked elsewhere or already spent")]
    StateInvalid(Hash),

    #[error("coordinator unreachable while executing ctx {0}")]
    CoordinatorUnreachable(Hash),
}
