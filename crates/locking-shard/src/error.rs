use uhsledger_primitives::Hash;

/// Rejections a locking shard can hand back for one ctx within a `lock_outputs`
/// batch, matching `check_and_lock_tx`'s two failure paths in the original:
/// not enough attestations, or an input this shard owns that isn't sitting in
/// its unspent set (never existed, already locked, or already spent).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("ctx {ctx} has {have} attestations, needs at least {required}")]
    InsufficientAttestations { ctx: Hash, have: usize, required: usize },

    #[error("ctx {ctx} references input {input} that is not unspent in this shard")]
    InputUnavailable { ctx: Hash, input: Hash },
}
