//! Single TCP connect attempt.
//!
//! A probe performs exactly one bounded connect to a (host, port) pair and
//! classifies the result. Retrying is the caller's business.

use crate::error::{ProbeError, ProbeResult};
use crate::scanner::resolver::HostResolver;
use crate::types::Port;
use async_trait::async_trait;
use socket2::SockRef;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Definitive answer from a connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The three-way handshake completed.
    Connected,
    /// The remote end rejected the connection.
    Refused,
}

/// One connect attempt against a host.
///
/// Implementations must release any socket they open before returning,
/// whatever the outcome.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Check that `host` can be resolved, before any port is dispatched.
    async fn resolve(&self, _host: &str) -> ProbeResult<()> {
        Ok(())
    }

    /// Attempt a single connection to `host:port`, giving up after `timeout`.
    async fn probe(&self, host: &str, port: Port, timeout: Duration)
        -> ProbeResult<ConnectOutcome>;
}

/// Probe backed by the operating system's TCP connect.
///
/// Does not require elevated privileges.
pub struct TcpConnectProbe {
    resolver: HostResolver,
}

impl TcpConnectProbe {
    pub fn new(resolver: HostResolver) -> Self {
        Self { resolver }
    }
}

impl Default for TcpConnectProbe {
    fn default() -> Self {
        Self::new(HostResolver::default())
    }
}

#[async_trait]
impl Probe for TcpConnectProbe {
    async fn resolve(&self, host: &str) -> ProbeResult<()> {
        self.resolver.resolve(host).await.map(|_| ())
    }

    async fn probe(
        &self,
        host: &str,
        port: Port,
        connect_timeout: Duration,
    ) -> ProbeResult<ConnectOutcome> {
        let ip = self.resolver.resolve(host).await?;
        let addr = SocketAddr::new(ip, port.as_u16());

        // A timed-out connect future is dropped here, which closes its socket.
        match timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                let _conn = ScopedConnection::new(stream, addr);
                Ok(ConnectOutcome::Connected)
            }
            Ok(Err(e)) => match e.kind() {
                ErrorKind::ConnectionRefused => Ok(ConnectOutcome::Refused),
                ErrorKind::TimedOut => Err(ProbeError::TimedOut),
                _ => Err(ProbeError::Unreachable(e)),
            },
            Err(_) => Err(ProbeError::TimedOut),
        }
    }
}

/// Established connection that is shut down and closed when dropped.
struct ScopedConnection {
    stream: TcpStream,
    addr: SocketAddr,
}

impl ScopedConnection {
    fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self { stream, addr }
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if let Err(e) = SockRef::from(&self.stream).shutdown(Shutdown::Both) {
            tracing::trace!(addr = %self.addr, error = %e, "shutdown on close failed");
        }
    }
}
