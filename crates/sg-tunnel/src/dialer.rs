//! The dial capability and the per-call SSH tunnel dialer

use std::any::Any;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::endpoint::TunnelEndpoint;
use crate::error::TunnelError;
use crate::ssh::RusshConnector;

/// Byte stream returned by a dial
pub trait TunnelIo: AsyncRead + AsyncWrite + Send {}

impl<T: AsyncRead + AsyncWrite + Send + ?Sized> TunnelIo for T {}

/// Owned, type-erased connection
pub type BoxedStream = Pin<Box<dyn TunnelIo>>;

/// Opens application-level connections for an HTTP transport
///
/// `network` and `address` are what the HTTP layer derived from the request
/// URI. Implementations pinned to a fixed target may ignore them.
#[async_trait]
pub trait Dial: Send + Sync {
    async fn dial(&self, network: &str, address: &str) -> Result<BoxedStream, TunnelError>;
}

#[async_trait]
impl<D: Dial + ?Sized> Dial for Arc<D> {
    async fn dial(&self, network: &str, address: &str) -> Result<BoxedStream, TunnelError> {
        (**self).dial(network, address).await
    }
}

/// Establishes authenticated SSH sessions
#[async_trait]
pub trait SshConnect: Send + Sync + 'static {
    type Session: SshSession;

    /// Connect, verify the host key and authenticate
    async fn connect(&self, endpoint: &TunnelEndpoint) -> Result<Self::Session, TunnelError>;
}

/// An authenticated SSH session able to forward unix-socket streams
#[async_trait]
pub trait SshSession: Send + Sync + 'static {
    /// Open a stream to `socket_path` on the remote host
    async fn open_socket(&self, socket_path: &str) -> Result<BoxedStream, TunnelError>;

    /// Whether the session can still carry new streams
    fn is_alive(&self) -> bool {
        true
    }
}

/// Dials the remote socket through a fresh SSH session on every call
///
/// The `network`/`address` passed by the HTTP layer are ignored: every
/// connection made through this dialer goes to the configured endpoint.
/// Sessions are not reused; see [`crate::PooledTunnelDialer`] for that.
pub struct TunnelDialer<C: SshConnect = RusshConnector> {
    endpoint: TunnelEndpoint,
    connector: C,
}

impl TunnelDialer<RusshConnector> {
    /// Create a dialer using russh, loading credentials up front
    pub fn new(endpoint: TunnelEndpoint) -> Result<Self, TunnelError> {
        endpoint.ssh_address()?;
        let connector = RusshConnector::new(endpoint.ssh())?;
        Ok(Self::with_connector(endpoint, connector))
    }
}

impl<C: SshConnect> TunnelDialer<C> {
    /// Create a dialer over a custom SSH layer
    pub fn with_connector(endpoint: TunnelEndpoint, connector: C) -> Self {
        Self {
            endpoint,
            connector,
        }
    }

    /// The endpoint every dial targets
    pub fn endpoint(&self) -> &TunnelEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl<C: SshConnect> Dial for TunnelDialer<C> {
    async fn dial(&self, network: &str, address: &str) -> Result<BoxedStream, TunnelError> {
        tracing::trace!(
            network,
            address,
            "Dialing {} via {}",
            self.endpoint.socket_path(),
            self.endpoint.host()
        );

        let session = Arc::new(self.connector.connect(&self.endpoint).await?);
        let stream = session.open_socket(self.endpoint.socket_path()).await?;

        tracing::debug!(
            "Opened {} on {}",
            self.endpoint.socket_path(),
            self.endpoint.host()
        );
        Ok(bind_session(stream, session))
    }
}

/// Tie a stream to the session it was opened on
///
/// The session stays alive for as long as the stream does.
pub(crate) fn bind_session<S: SshSession>(stream: BoxedStream, session: Arc<S>) -> BoxedStream {
    Box::pin(SessionStream {
        inner: stream,
        _session: session,
    })
}

struct SessionStream {
    inner: BoxedStream,
    _session: Arc<dyn Any + Send + Sync>,
}

impl AsyncRead for SessionStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

impl AsyncWrite for SessionStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.inner.as_mut().poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.inner.as_mut().poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.inner.as_mut().poll_shutdown(cx)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::sync::atomic::Ordering;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_handshake_failure_yields_no_connection() {
        let dialer = TunnelDialer::with_connector(endpoint(), FakeSsh::new(Script::FailHandshake));

        let err = dialer.dial("tcp", "docker:80").await.err().unwrap();
        assert!(err.is_handshake());
    }

    #[tokio::test]
    async fn test_socket_failure_yields_no_connection() {
        let fake = FakeSsh::new(Script::FailSocket);
        let counters = Arc::clone(&fake.counters);
        let dialer = TunnelDialer::with_connector(endpoint(), fake);

        let err = dialer.dial("tcp", "docker:80").await.err().unwrap();
        assert!(
            matches!(err, TunnelError::OpenSocket { ref path, .. } if path == "/var/run/docker.sock")
        );
        assert!(!err.is_handshake());
        assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_successful_dial_is_usable() {
        let fake = FakeSsh::new(Script::Succeed);
        let remotes = Arc::clone(&fake.remotes);
        let dialer = TunnelDialer::with_connector(endpoint(), fake);

        // The requested address is not where the stream goes
        let mut conn = dialer.dial("tcp", "elsewhere:9999").await.unwrap();
        let mut remote = remotes.lock().await.pop().unwrap();

        conn.write_all(b"GET /_ping HTTP/1.1\r\n\r\n").await.unwrap();
        let mut buf = [0u8; 9];
        remote.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"GET /_pin");

        remote.write_all(b"OK").await.unwrap();
        let mut reply = [0u8; 2];
        conn.read_exact(&mut reply).await.unwrap();
        assert_eq!(&reply, b"OK");
    }

    #[tokio::test]
    async fn test_every_dial_opens_a_new_session() {
        let fake = FakeSsh::new(Script::Succeed);
        let counters = Arc::clone(&fake.counters);
        let dialer = TunnelDialer::with_connector(endpoint(), fake);

        let _a = dialer.dial("tcp", "docker:80").await.unwrap();
        let _b = dialer.dial("tcp", "docker:80").await.unwrap();

        assert_eq!(counters.connects.load(Ordering::SeqCst), 2);
        assert_eq!(counters.opens.load(Ordering::SeqCst), 2);
    }
}
