//! SSH client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::serde_utils::{duration_secs, option_duration_secs};

/// How the client authenticates to the SSH server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SshAuth {
    /// Private key loaded from disk
    KeyFile {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        passphrase: Option<String>,
    },
    /// Identities offered by the running ssh-agent (`SSH_AUTH_SOCK`)
    Agent,
}

impl Default for SshAuth {
    fn default() -> Self {
        SshAuth::KeyFile {
            path: dirs::home_dir()
                .unwrap_or_default()
                .join(".ssh")
                .join("id_ed25519"),
            passphrase: None,
        }
    }
}

/// How the server's host key is verified
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum HostKeyPolicy {
    /// Check against the user's `~/.ssh/known_hosts`
    #[default]
    KnownHosts,
    /// Require this exact SHA256 fingerprint
    Fingerprint { fingerprint: String },
    /// Accept any key (the fingerprint is still logged)
    AcceptAny,
}

/// Configuration for SSH connections to the daemon host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Username for SSH authentication
    pub user: String,

    /// Connection timeout, covering TCP connect and handshake
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Interval between keepalive requests on an open session
    #[serde(
        default,
        with = "option_duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub keepalive_interval: Option<Duration>,

    /// Authentication method
    pub auth: SshAuth,

    /// Host key verification policy
    pub host_key: HostKeyPolicy,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: whoami::username(),
            connect_timeout: Duration::from_secs(30),
            keepalive_interval: None,
            auth: SshAuth::default(),
            host_key: HostKeyPolicy::default(),
        }
    }
}

impl SshConfig {
    /// Key-file authenticated configuration for `user`
    pub fn with_key_file(user: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            auth: SshAuth::KeyFile {
                path: path.into(),
                passphrase: None,
            },
            ..Default::default()
        }
    }

    /// Agent authenticated configuration for `user`
    pub fn with_agent(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            auth: SshAuth::Agent,
            ..Default::default()
        }
    }
}
