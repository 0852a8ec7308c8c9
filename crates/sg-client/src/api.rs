//! Orchestrator API surface consumed by the client handle

use std::sync::Arc;

use async_trait::async_trait;
use sg_api::{Container, ListOptions, Network, Node, Service, Task};

use crate::error::ClientError;

/// Calls offered by the orchestrator API client
///
/// Every listing call takes [`ListOptions`]; only its filter set is
/// populated by this crate.
#[async_trait]
pub trait DockerApi: Send + Sync {
    /// Check that the daemon answers
    async fn ping(&self) -> Result<String, ClientError>;

    async fn service_list(&self, options: ListOptions) -> Result<Vec<Service>, ClientError>;

    async fn service_remove(&self, service_id: &str) -> Result<(), ClientError>;

    async fn task_list(&self, options: ListOptions) -> Result<Vec<Task>, ClientError>;

    async fn node_list(&self, options: ListOptions) -> Result<Vec<Node>, ClientError>;

    async fn node_remove(&self, node_id: &str, force: bool) -> Result<(), ClientError>;

    async fn network_list(&self, options: ListOptions) -> Result<Vec<Network>, ClientError>;

    async fn network_remove(&self, network_id: &str) -> Result<(), ClientError>;

    async fn container_list(&self, options: ListOptions) -> Result<Vec<Container>, ClientError>;

    async fn container_remove(&self, container_id: &str, force: bool)
        -> Result<(), ClientError>;
}

#[async_trait]
impl<A: DockerApi + ?Sized> DockerApi for Arc<A> {
    async fn ping(&self) -> Result<String, ClientError> {
        (**self).ping().await
    }

    async fn service_list(&self, options: ListOptions) -> Result<Vec<Service>, ClientError> {
        (**self).service_list(options).await
    }

    async fn service_remove(&self, service_id: &str) -> Result<(), ClientError> {
        (**self).service_remove(service_id).await
    }

    async fn task_list(&self, options: ListOptions) -> Result<Vec<Task>, ClientError> {
        (**self).task_list(options).await
    }

    async fn node_list(&self, options: ListOptions) -> Result<Vec<Node>, ClientError> {
        (**self).node_list(options).await
    }

    async fn node_remove(&self, node_id: &str, force: bool) -> Result<(), ClientError> {
        (**self).node_remove(node_id, force).await
    }

    async fn network_list(&self, options: ListOptions) -> Result<Vec<Network>, ClientError> {
        (**self).network_list(options).await
    }

    async fn network_remove(&self, network_id: &str) -> Result<(), ClientError> {
        (**self).network_remove(network_id).await
    }

    async fn container_list(&self, options: ListOptions) -> Result<Vec<Container>, ClientError> {
        (**self).container_list(options).await
    }

    async fn container_remove(
        &self,
        container_id: &str,
        force: bool,
    ) -> Result<(), ClientError> {
        (**self).container_remove(container_id, force).await
    }
}
