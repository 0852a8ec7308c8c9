//! Tunnel endpoint: where the remote socket lives and how to reach it

use sg_core::config::{RemoteConfig, SshConfig};

use crate::error::TunnelError;

/// Port used when the host string carries none
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Remote host, remote socket path and SSH settings
///
/// Immutable once built; each dialer owns its own copy.
#[derive(Debug, Clone)]
pub struct TunnelEndpoint {
    host: String,
    socket_path: String,
    ssh: SshConfig,
}

impl TunnelEndpoint {
    /// Create an endpoint
    pub fn new(host: impl Into<String>, socket_path: impl Into<String>, ssh: SshConfig) -> Self {
        Self {
            host: host.into(),
            socket_path: socket_path.into(),
            ssh,
        }
    }

    /// SSH host as given (may include a port)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Socket path on the remote host
    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// SSH client settings
    pub fn ssh(&self) -> &SshConfig {
        &self.ssh
    }

    /// Host and port to open the SSH connection to
    pub fn ssh_address(&self) -> Result<(String, u16), TunnelError> {
        parse_host_port(&self.host)
    }
}

impl From<&RemoteConfig> for TunnelEndpoint {
    fn from(config: &RemoteConfig) -> Self {
        Self::new(
            config.host.clone(),
            config.socket_path.clone(),
            config.ssh.clone(),
        )
    }
}

/// Split `host`, `host:port`, `[v6]` or `[v6]:port` into host and port
///
/// A bare IPv6 address without brackets is taken as a host with the default
/// port.
pub fn parse_host_port(input: &str) -> Result<(String, u16), TunnelError> {
    let invalid = || TunnelError::InvalidHost(input.to_string());
    let s = input.trim();
    if s.is_empty() {
        return Err(invalid());
    }

    if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = match tail {
            "" => DEFAULT_SSH_PORT,
            _ => tail
                .strip_prefix(':')
                .and_then(|p| p.parse().ok())
                .ok_or_else(invalid)?,
        };
        return Ok((host.to_string(), port));
    }

    match s.matches(':').count() {
        0 => Ok((s.to_string(), DEFAULT_SSH_PORT)),
        1 => {
            let (host, port) = s.split_once(':').ok_or_else(invalid)?;
            if host.is_empty() {
                return Err(invalid());
            }
            let port = port.parse().map_err(|_| invalid())?;
            Ok((host.to_string(), port))
        }
        _ => Ok((s.to_string(), DEFAULT_SSH_PORT)),
    }
}
