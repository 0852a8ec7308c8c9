//! Tunnel error types

use thiserror::Error;

/// Errors raised while dialing through the tunnel
///
/// Handshake-stage failures (`Connect`, `Timeout`, `AuthRejected`,
/// `HostKeyRejected`) are distinct from `OpenSocket`, which means the SSH
/// session came up but the remote socket could not be reached.
#[derive(Debug, Error)]
pub enum TunnelError {
    /// Private key file missing or unreadable
    #[error("Private key not found at {path}: {source}")]
    KeyNotFound {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// ssh-agent could not be reached or refused to sign
    #[error("ssh-agent error: {0}")]
    Agent(String),

    /// SSH host string could not be parsed
    #[error("Invalid SSH host '{0}'")]
    InvalidHost(String),

    /// TCP connect or SSH handshake failed
    #[error("Failed to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: anyhow::Error,
    },

    /// Connect and authentication did not finish in time
    #[error("Connection to {host} timed out")]
    Timeout { host: String },

    /// Server refused every offered credential
    #[error("Authentication rejected for user '{user}'")]
    AuthRejected { user: String },

    /// Server host key failed the configured policy
    #[error("Host key verification failed: {message}")]
    HostKeyRejected { message: String },

    /// SSH session is up but the remote socket could not be opened
    #[error("Failed to open remote socket {path}: {source}")]
    OpenSocket {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// Dial aborted by cancellation
    #[error("Dial cancelled")]
    Cancelled,

    /// Local I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TunnelError {
    /// Whether the failure happened while establishing the SSH session
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            TunnelError::Connect { .. }
                | TunnelError::Timeout { .. }
                | TunnelError::AuthRejected { .. }
                | TunnelError::HostKeyRejected { .. }
        )
    }
}
