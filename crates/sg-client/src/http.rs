//! Orchestrator API over HTTP
//!
//! Requests are addressed to the daemon's versioned REST endpoints and sent
//! through an [`HttpClient`], whose connector decides where bytes actually
//! go (tunnel, local socket or TCP).

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, USER_AGENT};
use hyper::{Method, Request};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use sg_api::{
    ApiVersion, Container, DaemonHost, ListOptions, Network, Node, Service, Task,
};
use sg_tunnel::HttpClient;

use crate::api::DockerApi;
use crate::error::ClientError;

const CLIENT_USER_AGENT: &str = concat!("swarmgate/", env!("CARGO_PKG_VERSION"));

/// Daemon error body
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`DockerApi`] implementation speaking the daemon's REST API
#[derive(Clone)]
pub struct HttpDockerApi {
    http: HttpClient,
    host: DaemonHost,
    version: ApiVersion,
}

impl HttpDockerApi {
    /// Bind an HTTP client to a daemon address and API version
    pub fn new(host: DaemonHost, version: ApiVersion, http: HttpClient) -> Self {
        Self {
            http,
            host,
            version,
        }
    }

    /// Daemon address requests are made against
    pub fn host(&self) -> &DaemonHost {
        &self.host
    }

    /// API version used as the request prefix
    pub fn version(&self) -> ApiVersion {
        self.version
    }

    fn url(&self, path: &str, query: Option<String>) -> String {
        let mut url = format!(
            "{}{}{}",
            self.host.base_uri(),
            self.version.path_prefix(),
            path
        );
        if let Some(query) = query {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    async fn send(&self, method: Method, url: String) -> Result<Bytes, ClientError> {
        tracing::debug!("{} {}", method, url);

        let request = Request::builder()
            .method(method)
            .uri(url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "application/json")
            .body(Full::new(Bytes::new()))?;

        let response = self
            .http
            .request(request)
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &ListOptions,
    ) -> Result<T, ClientError> {
        let body = self.send(Method::GET, self.url(path, options.query())).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn delete(&self, path: &str, query: Option<String>) -> Result<(), ClientError> {
        self.send(Method::DELETE, self.url(path, query)).await?;
        Ok(())
    }
}

/// Extract the daemon's `{"message": ...}`, falling back to the raw body
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err) => err.message,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}

fn force_query(force: bool) -> Option<String> {
    force.then(|| "force=1".to_string())
}

fn resource_path(collection: &str, id: &str) -> String {
    format!("/{}/{}", collection, urlencoding::encode(id))
}

#[async_trait]
impl DockerApi for HttpDockerApi {
    async fn ping(&self) -> Result<String, ClientError> {
        let body = self.send(Method::GET, self.url("/_ping", None)).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn service_list(&self, options: ListOptions) -> Result<Vec<Service>, ClientError> {
        self.get_json("/services", &options).await
    }

    async fn service_remove(&self, service_id: &str) -> Result<(), ClientError> {
        self.delete(&resource_path("services", service_id), None)
            .await
    }

    async fn task_list(&self, options: ListOptions) -> Result<Vec<Task>, ClientError> {
        self.get_json("/tasks", &options).await
    }

    async fn node_list(&self, options: ListOptions) -> Result<Vec<Node>, ClientError> {
        self.get_json("/nodes", &options).await
    }

    async fn node_remove(&self, node_id: &str, force: bool) -> Result<(), ClientError> {
        self.delete(&resource_path("nodes", node_id), force_query(force))
            .await
    }

    async fn network_list(&self, options: ListOptions) -> Result<Vec<Network>, ClientError> {
        self.get_json("/networks", &options).await
    }

    async fn network_remove(&self, network_id: &str) -> Result<(), ClientError> {
        self.delete(&resource_path("networks", network_id), None)
            .await
    }

    async fn container_list(&self, options: ListOptions) -> Result<Vec<Container>, ClientError> {
        self.get_json("/containers/json", &options).await
    }

    async fn container_remove(
        &self,
        container_id: &str,
        force: bool,
    ) -> Result<(), ClientError> {
        self.delete(&resource_path("containers", container_id), force_query(force))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json() {
        assert_eq!(
            error_message(br#"{"message":"service web not found"}"#),
            "service web not found"
        );
        assert_eq!(error_message(b"page not found\n"), "page not found");
    }

    #[test]
    fn test_resource_path_escapes_ids() {
        assert_eq!(resource_path("networks", "my net"), "/networks/my%20net");
        assert_eq!(resource_path("services", "abc123"), "/services/abc123");
    }
}
