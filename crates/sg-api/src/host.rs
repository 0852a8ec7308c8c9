//! Daemon address parsing
//!
//! Daemon addresses follow the `scheme://target` convention used by the
//! container tooling: `unix:///var/run/docker.sock` for a local or tunneled
//! socket, `tcp://host:port` for plain TCP.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ApiError;

/// Well-known daemon socket path
pub const DEFAULT_UNIX_SOCKET: &str = "/var/run/docker.sock";

/// Authority used in request URIs when the daemon sits behind a socket
const SOCKET_AUTHORITY: &str = "docker";

/// Parsed daemon address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonHost {
    /// Unix-domain socket (local, or remote when tunneled)
    Unix(PathBuf),
    /// TCP `host:port`
    Tcp(String),
}

impl DaemonHost {
    /// Address for a unix socket path
    pub fn unix(path: impl AsRef<Path>) -> Self {
        Self::Unix(path.as_ref().to_path_buf())
    }

    /// Authority placed in request URIs
    pub fn authority(&self) -> &str {
        match self {
            DaemonHost::Unix(_) => SOCKET_AUTHORITY,
            DaemonHost::Tcp(addr) => addr,
        }
    }

    /// Base URI for HTTP requests to this daemon
    pub fn base_uri(&self) -> String {
        format!("http://{}", self.authority())
    }
}

impl Default for DaemonHost {
    fn default() -> Self {
        Self::unix(DEFAULT_UNIX_SOCKET)
    }
}

impl FromStr for DaemonHost {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ApiError::InvalidHost {
            host: s.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, target) = s
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;

        match scheme {
            "unix" => {
                if target.is_empty() {
                    return Err(invalid("empty socket path"));
                }
                Ok(DaemonHost::Unix(PathBuf::from(target)))
            }
            "tcp" | "http" => {
                let addr = target.trim_end_matches('/');
                if addr.is_empty() || addr.contains('/') {
                    return Err(invalid("expected host:port"));
                }
                if !addr.contains(':') {
                    return Err(invalid("missing port"));
                }
                Ok(DaemonHost::Tcp(addr.to_string()))
            }
            other => Err(invalid(&format!("unsupported scheme '{}'", other))),
        }
    }
}

impl fmt::Display for DaemonHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaemonHost::Unix(path) => write!(f, "unix://{}", path.display()),
            DaemonHost::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}
