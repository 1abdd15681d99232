use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use dns_codec::protocol::types::MESSAGE_MAX_LEN;

/// Something which can carry one serialised request to a nameserver
/// and bring back one serialised response.
pub trait Transport {
    fn exchange(
        &self,
        request: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

/// Plain DNS over UDP, with no handling of truncated responses.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    pub nameserver: SocketAddr,

    /// 0 picks an ephemeral port.
    pub source_port: u16,

    /// How long to wait for each response.
    pub timeout: Duration,

    /// How many more times to send the request if no response comes
    /// back in time.
    pub retries: u32,
}

impl UdpTransport {
    fn bind_address(&self) -> SocketAddr {
        if self.nameserver.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, self.source_port).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, self.source_port).into()
        }
    }
}

impl Transport for UdpTransport {
    async fn exchange(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let sock = UdpSocket::bind(self.bind_address()).await?;
        sock.connect(self.nameserver).await?;

        let attempts = self.retries.saturating_add(1);
        for attempt in 1..=attempts {
            tracing::debug!(nameserver = %self.nameserver, %attempt, length = %request.len(), "sending request");
            sock.send(request).await?;

            let mut buf = vec![0u8; MESSAGE_MAX_LEN];
            match timeout(self.timeout, sock.recv(&mut buf)).await {
                Ok(Ok(size)) => {
                    tracing::debug!(nameserver = %self.nameserver, %size, "got response");
                    buf.truncate(size);
                    return Ok(buf);
                }
                Ok(Err(error)) => return Err(error.into()),
                Err(_) => {
                    tracing::warn!(nameserver = %self.nameserver, %attempt, %attempts, "timed out");
                }
            }
        }

        Err(TransportError::Timeout { attempts })
    }
}

/// An error that can occur when talking to a nameserver.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Io(#[from] io::Error),

    #[error("no response after {attempts} attempt(s)")]
    Timeout { attempts: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fake_nameserver() -> (UdpSocket, SocketAddr) {
        let sock = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let address = sock.local_addr().unwrap();
        (sock, address)
    }

    fn transport(nameserver: SocketAddr, retries: u32) -> UdpTransport {
        UdpTransport {
            nameserver,
            source_port: 0,
            timeout: Duration::from_millis(100),
            retries,
        }
    }

    #[tokio::test]
    async fn exchange_returns_response() {
        let (server, address) = fake_nameserver().await;

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (size, peer) = server.recv_from(&mut buf).await.unwrap();
            let mut response = buf[..size].to_vec();
            response.extend_from_slice(b"reply");
            server.send_to(&response, peer).await.unwrap();
        });

        let response = transport(address, 0).exchange(b"hello").await.unwrap();
        responder.await.unwrap();

        assert_eq!(b"helloreply".to_vec(), response);
    }

    #[tokio::test]
    async fn exchange_returns_only_received_octets() {
        let (server, address) = fake_nameserver().await;

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (_, peer) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&[1, 2, 3], peer).await.unwrap();
        });

        let response = transport(address, 0).exchange(&[0; 12]).await.unwrap();
        responder.await.unwrap();

        assert_eq!(vec![1, 2, 3], response);
    }

    #[tokio::test]
    async fn exchange_retries_then_times_out() {
        let (server, address) = fake_nameserver().await;

        let result = transport(address, 2).exchange(b"anyone there?").await;
        assert!(matches!(result, Err(TransportError::Timeout { attempts: 3 })));

        // every attempt reached the nameserver
        let mut buf = [0u8; 512];
        for _ in 0..3 {
            let size = timeout(Duration::from_secs(1), server.recv(&mut buf))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(b"anyone there?", &buf[..size]);
        }
    }

    #[tokio::test]
    async fn exchange_answers_a_retry() {
        let (server, address) = fake_nameserver().await;

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 512];
            // ignore the first attempt
            server.recv_from(&mut buf).await.unwrap();
            let (size, peer) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&buf[..size], peer).await.unwrap();
        });

        let response = transport(address, 1).exchange(b"again").await.unwrap();
        responder.await.unwrap();

        assert_eq!(b"again".to_vec(), response);
    }
}
