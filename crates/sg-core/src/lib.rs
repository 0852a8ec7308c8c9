//! sg-core: Core configuration and error types for swarmgate
//!
//! This crate provides the configuration structures shared by the tunnel,
//! client and CLI components, along with their error types.

pub mod config;
pub mod error;

pub use config::{ConfigFile, HostKeyPolicy, RemoteConfig, SshAuth, SshConfig};
pub use error::ConfigError;
