use uhsledger_locking_shard::LockError;
use uhsledger_primitives::Hash;

/// Coordinator-surfaced errors, per `spec.md` §7's error taxonomy: the ones
/// relevant once a dtx has passed the sentinel's static checks and reached
/// the 2PC pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("this coordinator replica is not the current leader")]
    NotLeader,

    #[error("timed out waiting on a shard for dtx {0}")]
    Timeout(Hash),

    #[error("a shard holding dtx {0} is unreachable")]
    ShardUnreachable(Hash),

    #[error("ctx {ctx} rejected by its locking shard: {source}")]
    StateInvalid { ctx: Hash, source: LockError },
}
