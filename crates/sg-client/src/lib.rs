//! sg-client: Orchestrator client handle and resource query layer
//!
//! A [`ClientHandle`] owns an orchestrator API client bound to a transport
//! (SSH tunnel, local socket or TCP) and a [`CallContext`] that every call
//! observes for cancellation and deadlines. On top of the handle, the query
//! layer lists, looks up and prunes services, tasks, nodes, networks and
//! containers.

pub mod api;
pub mod context;
pub mod env;
pub mod error;
pub mod handle;
pub mod http;
pub mod query;

pub use api::DockerApi;
pub use context::CallContext;
pub use env::EnvSettings;
pub use error::ClientError;
pub use handle::ClientHandle;
pub use http::HttpDockerApi;
pub use query::{find_by_id, find_services_by_name, find_tasks_by_service_id, list_options};

pub use sg_api::{
    ApiVersion, Container, DaemonHost, FilterArgs, ListOptions, Network, Node, Resource,
    ResourceKind, Service, Task,
};
