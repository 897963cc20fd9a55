use tokio::io::DuplexStream;

/// An in-memory, in-process transport standing in for a TCP connection in
/// tests: `AsyncRead + AsyncWrite` over a pair of connected buffers, which
/// is all [`crate::RpcClient`] and the framing functions require.
pub type MemoryConnection = DuplexStream;

/// Creates a connected pair of [`MemoryConnection`]s, analogous to a client
/// socket and the server-side accepted socket for the same connection.
pub fn memory_pair(buffer_size: usize) -> (MemoryConnection, MemoryConnection) {
    tokio::io::duplex(buffer_size)
}
