//! Dialers for daemons reachable without a tunnel

#[cfg(unix)]
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::dialer::{BoxedStream, Dial};
use crate::error::TunnelError;

/// Connects to a local unix socket, ignoring the requested address
#[cfg(unix)]
#[derive(Debug, Clone)]
pub struct UnixDialer {
    path: PathBuf,
}

#[cfg(unix)]
impl UnixDialer {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
#[async_trait]
impl Dial for UnixDialer {
    async fn dial(&self, _network: &str, _address: &str) -> Result<BoxedStream, TunnelError> {
        tracing::debug!("Connecting to unix socket {}", self.path.display());
        let stream = tokio::net::UnixStream::connect(&self.path).await?;
        Ok(Box::pin(stream))
    }
}

/// Connects over TCP to the address the HTTP layer asks for
#[derive(Debug, Clone, Default)]
pub struct TcpDialer;

#[async_trait]
impl Dial for TcpDialer {
    async fn dial(&self, _network: &str, address: &str) -> Result<BoxedStream, TunnelError> {
        tracing::debug!("Connecting to {}", address);
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_tcp_dialer_uses_requested_address() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"hi").await.unwrap();
        });

        let mut conn = TcpDialer.dial("tcp", &addr).await.unwrap();
        let mut buf = [0u8; 2];
        conn.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hi");
        server.await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unix_dialer_missing_socket() {
        let dialer = UnixDialer::new("/nonexistent/swarmgate.sock");
        let err = dialer.dial("tcp", "docker:80").await.err().unwrap();
        assert!(matches!(err, TunnelError::Io(_)));
    }
}
