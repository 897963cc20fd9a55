#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of buffer")]
    UnexpectedEof,

    #[error("length prefix {claimed} exceeds remaining buffer of {remaining} bytes")]
    LengthPrefixTooLarge { claimed: usize, remaining: usize },

    #[error("invalid tag byte {0} for sum type")]
    InvalidTag(u8),
}

pub type CodecResult<T> = Result<T, CodecError>;
