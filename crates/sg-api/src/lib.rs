//! sg-api: Orchestrator API value types for swarmgate
//!
//! This crate defines the values exchanged with the container daemon:
//! resource records returned by listing calls, filter expressions passed
//! to them, and the addressing/versioning values used to build requests.

pub mod error;
pub mod filters;
pub mod host;
pub mod models;
pub mod resource;
pub mod version;

pub use error::ApiError;
pub use filters::{FilterArgs, ListOptions};
pub use host::{DaemonHost, DEFAULT_UNIX_SOCKET};
pub use models::{
    Annotations, Container, Network, Node, NodeDescription, NodeSpec, NodeStatus, ObjectVersion,
    Service, ServiceSpec, Task, TaskStatus,
};
pub use resource::{Resource, ResourceKind};
pub use version::{ApiVersion, DEFAULT_API_VERSION};
