//! Session-reusing tunnel dialer
//!
//! Keeps one live SSH session per endpoint and multiplexes every dial over
//! it as a separate forwarded stream. A dead or failing session is dropped
//! and replaced once; the replacement's errors are returned as-is.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::dialer::{bind_session, BoxedStream, Dial, SshConnect, SshSession};
use crate::endpoint::TunnelEndpoint;
use crate::error::TunnelError;
use crate::ssh::RusshConnector;

/// Dials the remote socket over a cached SSH session
pub struct PooledTunnelDialer<C: SshConnect = RusshConnector> {
    endpoint: TunnelEndpoint,
    connector: C,
    cached: Mutex<Option<Arc<C::Session>>>,
}

impl PooledTunnelDialer<RusshConnector> {
    /// Create a pooled dialer using russh
    pub fn new(endpoint: TunnelEndpoint) -> Result<Self, TunnelError> {
        endpoint.ssh_address()?;
        let connector = RusshConnector::new(endpoint.ssh())?;
        Ok(Self::with_connector(endpoint, connector))
    }
}

impl<C: SshConnect> PooledTunnelDialer<C> {
    /// Create a pooled dialer over a custom SSH layer
    pub fn with_connector(endpoint: TunnelEndpoint, connector: C) -> Self {
        Self {
            endpoint,
            connector,
            cached: Mutex::new(None),
        }
    }

    /// The endpoint every dial targets
    pub fn endpoint(&self) -> &TunnelEndpoint {
        &self.endpoint
    }

    /// Drop the cached session, if any
    pub async fn reset(&self) {
        self.cached.lock().await.take();
    }
}

#[async_trait]
impl<C: SshConnect> Dial for PooledTunnelDialer<C> {
    async fn dial(&self, _network: &str, _address: &str) -> Result<BoxedStream, TunnelError> {
        let socket_path = self.endpoint.socket_path();

        // Held across connect so concurrent dials share one new session
        let mut cached = self.cached.lock().await;

        if let Some(session) = cached.as_ref().filter(|s| s.is_alive()).cloned() {
            match session.open_socket(socket_path).await {
                Ok(stream) => return Ok(bind_session(stream, session)),
                Err(e) => {
                    tracing::debug!(
                        "Cached session to {} failed ({}), reconnecting",
                        self.endpoint.host(),
                        e
                    );
                }
            }
        }
        cached.take();

        let session = Arc::new(self.connector.connect(&self.endpoint).await?);
        let stream = session.open_socket(socket_path).await?;
        *cached = Some(Arc::clone(&session));

        Ok(bind_session(stream, session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialer::testing::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_dials_share_one_session() {
        let fake = FakeSsh::new(Script::Succeed);
        let counters = Arc::clone(&fake.counters);
        let dialer = PooledTunnelDialer::with_connector(endpoint(), fake);

        let _a = dialer.dial("tcp", "docker:80").await.unwrap();
        let _b = dialer.dial("tcp", "docker:80").await.unwrap();
        let _c = dialer.dial("tcp", "docker:80").await.unwrap();

        assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
        assert_eq!(counters.opens.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_dead_session_is_replaced() {
        let fake = FakeSsh::new(Script::Succeed);
        let counters = Arc::clone(&fake.counters);
        let alive = Arc::clone(&fake.alive);
        let dialer = PooledTunnelDialer::with_connector(endpoint(), fake);

        let _a = dialer.dial("tcp", "docker:80").await.unwrap();
        alive.store(false, Ordering::SeqCst);
        let _b = dialer.dial("tcp", "docker:80").await.unwrap();

        assert_eq!(counters.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let fake = FakeSsh::new(Script::FailSocket);
        let counters = Arc::clone(&fake.counters);
        let dialer = PooledTunnelDialer::with_connector(endpoint(), fake);

        assert!(dialer.dial("tcp", "docker:80").await.is_err());
        assert!(dialer.dial("tcp", "docker:80").await.is_err());

        assert_eq!(counters.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reset_forces_new_session() {
        let fake = FakeSsh::new(Script::Succeed);
        let counters = Arc::clone(&fake.counters);
        let dialer = PooledTunnelDialer::with_connector(endpoint(), fake);

        let _a = dialer.dial("tcp", "docker:80").await.unwrap();
        dialer.reset().await;
        let _b = dialer.dial("tcp", "docker:80").await.unwrap();

        assert_eq!(counters.connects.load(Ordering::SeqCst), 2);
    }
}
