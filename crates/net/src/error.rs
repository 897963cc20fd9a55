#[derive(thiserror::Error, Debug)]
pub enum NetError {
    #[error("connection closed")]
    Closed,

    #[error("frame exceeds maximum size: {0} bytes")]
    FrameTooLarge(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] uhsledger_codec::CodecError),

    #[error("peer unreachable after exhausting retries")]
    Unreachable,
}
