use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use uhsledger_codec::{Decode, Encode};
use uhsledger_config::RetryPolicy;

use crate::envelope::{read_frame, write_frame};
use crate::error::NetError;

/// Establishes a fresh connection on demand. Implementations hide whatever
/// transport they actually use (TCP, the in-memory pair, ...); the client
/// only needs something `AsyncRead + AsyncWrite`.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: AsyncRead + AsyncWrite + Unpin + Send;

    async fn connect(&self) -> Result<Self::Connection, NetError>;
}

/// A request/response client that reconnects with exponential backoff when
/// the peer is unreachable, mirroring `sentinel_2pc/controller.cpp`'s
/// `execute_transaction` retry loop: this layer only retries *transport*
/// failures (connect/write/read), never re-interprets or retries business
/// logic — a well-formed rejection response is returned as-is on the first
/// successful round trip.
pub struct RpcClient<C: Connector> {
    connector: C,
    retry: RetryPolicy,
    /// Caps the number of connect attempts; `None` retries forever, matching
    /// the original's unbounded reconnect loop.
    max_attempts: Option<u32>,
}

impl<C: Connector> RpcClient<C> {
    pub fn new(connector: C, retry: RetryPolicy) -> Self {
        RpcClient {
            connector,
            retry,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub async fn call<Req: Encode + Sync, Resp: Decode>(&self, req: &Req) -> Result<Resp, NetError> {
        let body = req.encode_to_vec();
        let mut delay = Duration::ZERO;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.try_once(&body).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "rpc attempt failed, retrying");
                    if let Some(max) = self.max_attempts {
                        if attempt >= max {
                            return Err(NetError::Unreachable);
                        }
                    }
                    delay = self.retry.next_delay(delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn try_once<Resp: Decode>(&self, body: &[u8]) -> Result<Resp, NetError> {
        let mut conn = self.connector.connect().await?;
        write_frame(&mut conn, body).await?;
        let resp_bytes = read_frame(&mut conn).await?;
        Resp::decode(&mut resp_bytes.as_slice()).map_err(NetError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::memory::{memory_pair, MemoryConnection};

    struct EchoConnector {
        attempts: Arc<AtomicU32>,
        fail_first: u32,
    }

    #[async_trait]
    impl Connector for EchoConnector {
        type Connection = MemoryConnection;

        async fn connect(&self) -> Result<Self::Connection, NetError> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(NetError::Closed);
            }
            let (client, server) = memory_pair(4096);
            tokio::spawn(async move {
                let mut server = server;
                if let Ok(body) = read_frame(&mut server).await {
                    let _ = write_frame(&mut server, &body).await;
                }
            });
            Ok(client)
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_when_reachable() {
        let connector = EchoConnector {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_first: 0,
        };
        let client = RpcClient::new(connector, RetryPolicy::DEFAULT);
        let resp: u32 = client.call(&42u32).await.unwrap();
        assert_eq!(resp, 42);
    }

    #[tokio::test]
    async fn retries_through_transient_unreachability() {
        let connector = EchoConnector {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_first: 2,
        };
        let client = RpcClient::new(connector, RetryPolicy {
            base_delay_ms: 1,
            max_delay_ms: 5,
        });
        let resp: u32 = client.call(&7u32).await.unwrap();
        assert_eq!(resp, 7);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let connector = EchoConnector {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_first: 100,
        };
        let client = RpcClient::new(connector, RetryPolicy {
            base_delay_ms: 1,
            max_delay_ms: 2,
        })
        .with_max_attempts(3);
        let result: Result<u32, NetError> = client.call(&1u32).await;
        assert!(matches!(result, Err(NetError::Unreachable)));
    }
}
