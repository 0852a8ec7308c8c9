//! Daemon settings taken from the process environment

use sg_api::{ApiVersion, DaemonHost};

use crate::error::ClientError;

pub const ENV_HOST: &str = "DOCKER_HOST";
pub const ENV_API_VERSION: &str = "DOCKER_API_VERSION";
pub const ENV_TLS_VERIFY: &str = "DOCKER_TLS_VERIFY";

/// Daemon address and API version resolved from environment variables
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvSettings {
    pub host: DaemonHost,
    pub version: ApiVersion,
}

impl EnvSettings {
    /// Resolve from the current process environment
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` to read variables
    ///
    /// Unset or empty variables fall back to the defaults. TLS is not
    /// supported, so a non-empty `DOCKER_TLS_VERIFY` is rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if read(ENV_TLS_VERIFY).is_some() {
            return Err(ClientError::Construction(format!(
                "{} is set but TLS connections are not supported",
                ENV_TLS_VERIFY
            )));
        }

        let host = match read(ENV_HOST) {
            Some(value) => value.trim().parse()?,
            None => DaemonHost::default(),
        };

        let version = match read(ENV_API_VERSION) {
            Some(value) => value.trim().parse()?,
            None => ApiVersion::default(),
        };

        Ok(Self { host, version })
    }
}
