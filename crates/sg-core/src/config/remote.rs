//! Remote daemon configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::option_duration_secs;
use super::ssh::SshConfig;
use crate::error::ConfigError;

/// Where the remote daemon lives and how to reach it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// SSH host, optionally with port (`host`, `host:port`, `[v6]:port`)
    pub host: String,

    /// Daemon socket path on the remote host
    pub socket_path: String,

    /// Daemon API version (`MAJOR.MINOR`)
    pub api_version: String,

    /// SSH client settings
    pub ssh: SshConfig,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            socket_path: "/var/run/docker.sock".to_string(),
            api_version: "1.41".to_string(),
            ssh: SshConfig::default(),
        }
    }
}

impl RemoteConfig {
    /// Remote config for `host` with defaults elsewhere
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Check the fields needed to build a tunnel
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField("remote.host".to_string()));
        }
        if !self.socket_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "remote.socket_path must be absolute, got '{}'",
                self.socket_path
            )));
        }
        if self.ssh.user.is_empty() {
            return Err(ConfigError::MissingField("remote.ssh.user".to_string()));
        }
        Ok(())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Deadline applied to every call made through a client
    #[serde(
        with = "option_duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_timeout: Option<Duration>,

    /// Remote daemon reached over SSH; absent means use the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}
