use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::NetError;

/// Hard cap on a single frame's body, matching the codec's own length-prefix
/// sanity checks: a corrupt/hostile length prefix must never be used to
/// drive an unbounded allocation.
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Writes `body` as one length-prefixed frame: an 8-byte little-endian
/// length followed by the bytes themselves.
pub async fn write_frame<W: AsyncWrite + Unpin>(w: &mut W, body: &[u8]) -> Result<(), NetError> {
    if body.len() > MAX_FRAME_BYTES {
        return Err(NetError::FrameTooLarge(body.len()));
    }
    w.write_u64_le(body.len() as u64).await?;
    w.write_all(body).await?;
    w.flush().await?;
    Ok(())
}

/// Reads one length-prefixed frame written by [`write_frame`]. Returns
/// [`NetError::Closed`] if the peer closed the connection before the length
/// prefix could be read at all (a clean EOF between frames), and
/// [`NetError::Io`] for anything else, including a truncated body.
pub async fn read_frame<R: AsyncRead + Unpin>(r: &mut R) -> Result<Vec<u8>, NetError> {
    let mut len_buf = [0u8; 8];
    match r.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(NetError::Closed),
        Err(e) => return Err(e.into()),
    }
    let len = u64::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(NetError::FrameTooLarge(len));
    }
    let mut body = vec![0u8; len];
    r.read_exact(&mut body).await?;
    Ok(body)
}
