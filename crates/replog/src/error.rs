#[derive(thiserror::Error, Debug)]
pub enum ReplogError {
    #[error("this node is not the current leader")]
    NotLeader,

    #[error("replication timed out waiting for a majority")]
    Timeout,

    #[error("snapshot I/O failed: {0}")]
    SnapshotIo(String),
}
