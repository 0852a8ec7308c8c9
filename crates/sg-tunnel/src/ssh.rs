//! russh-backed SSH layer
//!
//! Connects to the remote host, verifies its key against the configured
//! policy, authenticates with a key file or the ssh-agent, and forwards
//! streams to remote unix sockets (`direct-streamlocal@openssh.com`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use russh::client::{self, Config, Handle};
use russh_keys::agent::client::AgentClient;
use russh_keys::key::{KeyPair, PublicKey};

use sg_core::config::{HostKeyPolicy, SshAuth, SshConfig};

use crate::dialer::{BoxedStream, SshConnect, SshSession};
use crate::endpoint::TunnelEndpoint;
use crate::error::TunnelError;

/// Credentials resolved at construction time
#[derive(Clone)]
enum Credentials {
    Key(Arc<KeyPair>),
    Agent,
}

/// Opens SSH sessions with russh
#[derive(Clone)]
pub struct RusshConnector {
    credentials: Credentials,
}

impl RusshConnector {
    /// Create a connector, loading the private key if one is configured
    pub fn new(config: &SshConfig) -> Result<Self, TunnelError> {
        let credentials = match &config.auth {
            SshAuth::KeyFile { path, passphrase } => {
                if !path.exists() {
                    return Err(TunnelError::KeyNotFound {
                        path: path.display().to_string(),
                        source: anyhow::anyhow!("File does not exist"),
                    });
                }

                let key = russh_keys::load_secret_key(path, passphrase.as_deref()).map_err(|e| {
                    TunnelError::KeyNotFound {
                        path: path.display().to_string(),
                        source: anyhow::anyhow!("Failed to load key: {}", e),
                    }
                })?;
                Credentials::Key(Arc::new(key))
            }
            SshAuth::Agent => Credentials::Agent,
        };

        Ok(Self { credentials })
    }

    async fn authenticate(
        &self,
        session: &mut Handle<ClientHandler>,
        host: &str,
        user: &str,
    ) -> Result<(), TunnelError> {
        tracing::debug!("Authenticating as user '{}'", user);

        let authenticated = match &self.credentials {
            Credentials::Key(key) => session
                .authenticate_publickey(user, Arc::clone(key))
                .await
                .map_err(|e| TunnelError::Connect {
                    host: host.to_string(),
                    source: anyhow::anyhow!("Authentication error: {}", e),
                })?,
            Credentials::Agent => authenticate_with_agent(session, user).await?,
        };

        if !authenticated {
            return Err(TunnelError::AuthRejected {
                user: user.to_string(),
            });
        }

        Ok(())
    }
}

/// Offer each agent identity in turn until one is accepted
async fn authenticate_with_agent(
    session: &mut Handle<ClientHandler>,
    user: &str,
) -> Result<bool, TunnelError> {
    let mut agent = AgentClient::connect_env()
        .await
        .map_err(|e| TunnelError::Agent(e.to_string()))?;

    let identities = agent
        .request_identities()
        .await
        .map_err(|e| TunnelError::Agent(e.to_string()))?;

    if identities.is_empty() {
        return Err(TunnelError::Agent("agent holds no identities".to_string()));
    }

    for key in identities {
        let (returned, result) = session.authenticate_future(user, key, agent).await;
        agent = returned;
        if result.map_err(|e| TunnelError::Agent(e.to_string()))? {
            return Ok(true);
        }
    }

    Ok(false)
}

#[async_trait]
impl SshConnect for RusshConnector {
    type Session = RusshSession;

    async fn connect(&self, endpoint: &TunnelEndpoint) -> Result<RusshSession, TunnelError> {
        let (host, port) = endpoint.ssh_address()?;
        let ssh = endpoint.ssh();

        let rejection = Arc::new(Mutex::new(None));
        let handler = ClientHandler {
            host: host.clone(),
            port,
            policy: ssh.host_key.clone(),
            rejection: Arc::clone(&rejection),
        };

        let config = Arc::new(Config {
            keepalive_interval: ssh.keepalive_interval,
            ..Default::default()
        });

        let establish = async {
            tracing::debug!("Connecting to {}:{}", host, port);
            let mut session = client::connect(config, (host.as_str(), port), handler)
                .await
                .map_err(|e| {
                    let rejected = rejection.lock().ok().and_then(|mut slot| slot.take());
                    match rejected {
                        Some(message) => TunnelError::HostKeyRejected { message },
                        None => TunnelError::Connect {
                            host: endpoint.host().to_string(),
                            source: e,
                        },
                    }
                })?;

            self.authenticate(&mut session, endpoint.host(), &ssh.user)
                .await?;
            Ok::<_, TunnelError>(session)
        };

        let handle = tokio::time::timeout(ssh.connect_timeout, establish)
            .await
            .map_err(|_| TunnelError::Timeout {
                host: endpoint.host().to_string(),
            })??;

        tracing::debug!("SSH session established with {}", endpoint.host());
        Ok(RusshSession { handle })
    }
}

/// Authenticated russh session
pub struct RusshSession {
    handle: Handle<ClientHandler>,
}

#[async_trait]
impl SshSession for RusshSession {
    async fn open_socket(&self, socket_path: &str) -> Result<BoxedStream, TunnelError> {
        let channel = self
            .handle
            .channel_open_direct_streamlocal(socket_path)
            .await
            .map_err(|e| TunnelError::OpenSocket {
                path: socket_path.to_string(),
                source: e.into(),
            })?;

        Ok(Box::pin(channel.into_stream()))
    }

    fn is_alive(&self) -> bool {
        !self.handle.is_closed()
    }
}

/// SSH client handler enforcing the host key policy
struct ClientHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    /// Why the key was refused, read back after a failed connect
    rejection: Arc<Mutex<Option<String>>>,
}

impl ClientHandler {
    fn verify(&self, server_public_key: &PublicKey, fingerprint: &str) -> Result<(), String> {
        match &self.policy {
            HostKeyPolicy::AcceptAny => Ok(()),
            HostKeyPolicy::Fingerprint { fingerprint: expected } => {
                if fingerprints_match(expected, fingerprint) {
                    Ok(())
                } else {
                    Err(format!(
                        "expected fingerprint {}, got {}",
                        expected, fingerprint
                    ))
                }
            }
            HostKeyPolicy::KnownHosts => {
                match russh_keys::check_known_hosts(&self.host, self.port, server_public_key) {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(format!("{} is not in known_hosts", self.host)),
                    Err(e) => Err(format!("known_hosts check failed: {}", e)),
                }
            }
        }
    }
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = anyhow::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint();
        tracing::debug!("Server host key for {}: {}", self.host, fingerprint);

        match self.verify(server_public_key, &fingerprint) {
            Ok(()) => Ok(true),
            Err(message) => {
                tracing::warn!("Rejecting host key for {}: {}", self.host, message);
                if let Ok(mut slot) = self.rejection.lock() {
                    *slot = Some(message);
                }
                Ok(false)
            }
        }
    }
}

/// Compare fingerprints, tolerating an optional `SHA256:` prefix
fn fingerprints_match(expected: &str, actual: &str) -> bool {
    let strip = |s: &str| s.trim().trim_start_matches("SHA256:").to_string();
    strip(expected) == strip(actual)
}
