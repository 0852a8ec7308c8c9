//! Client handle: an owned API client plus the context every call observes

use sg_api::{
    ApiVersion, Container, DaemonHost, ListOptions, Network, Node, Service, Task,
};
use sg_core::{RemoteConfig, SshConfig};
use sg_tunnel::{
    http_client, Dial, DialConnector, HttpClient, PooledTunnelDialer, TcpDialer, TunnelDialer,
    TunnelEndpoint,
};

use crate::api::DockerApi;
use crate::context::CallContext;
use crate::env::EnvSettings;
use crate::error::ClientError;
use crate::http::HttpDockerApi;

/// Handle owning an orchestrator API client and its call context
///
/// Every collaborator call made through the handle runs under the shared
/// [`CallContext`]: once the context is cancelled, in-flight calls abort and
/// later calls fail immediately with [`ClientError::Cancelled`].
///
/// The handle holds no per-call state and may be cloned or shared across
/// tasks freely.
#[derive(Clone)]
pub struct ClientHandle<A = HttpDockerApi> {
    api: A,
    ctx: CallContext,
}

impl ClientHandle<HttpDockerApi> {
    /// Tunneled construction
    ///
    /// Every connection opens a fresh SSH session to `host` and forwards to
    /// `socket_path` on that machine. The tunnel is not probed here: the
    /// first call surfaces any connectivity problem.
    pub fn connect_ssh(
        ctx: CallContext,
        host: &str,
        socket_path: &str,
        api_version: &str,
        ssh: SshConfig,
    ) -> Result<Self, ClientError> {
        let version: ApiVersion = api_version.parse()?;
        let endpoint = TunnelEndpoint::new(host, socket_path, ssh);
        let dialer = TunnelDialer::new(endpoint)?;
        Ok(Self::over_dialer(
            ctx,
            dialer,
            DaemonHost::unix(socket_path),
            version,
        ))
    }

    /// Tunneled construction reusing one SSH session across connections
    pub fn connect_ssh_pooled(
        ctx: CallContext,
        host: &str,
        socket_path: &str,
        api_version: &str,
        ssh: SshConfig,
    ) -> Result<Self, ClientError> {
        let version: ApiVersion = api_version.parse()?;
        let endpoint = TunnelEndpoint::new(host, socket_path, ssh);
        let dialer = PooledTunnelDialer::new(endpoint)?;
        Ok(Self::over_dialer(
            ctx,
            dialer,
            DaemonHost::unix(socket_path),
            version,
        ))
    }

    /// Tunneled construction from a validated remote configuration
    pub fn from_remote(
        ctx: CallContext,
        remote: &RemoteConfig,
        pooled: bool,
    ) -> Result<Self, ClientError> {
        remote.validate()?;

        let ssh = remote.ssh.clone();
        if pooled {
            Self::connect_ssh_pooled(
                ctx,
                &remote.host,
                &remote.socket_path,
                &remote.api_version,
                ssh,
            )
        } else {
            Self::connect_ssh(
                ctx,
                &remote.host,
                &remote.socket_path,
                &remote.api_version,
                ssh,
            )
        }
    }

    /// Direct construction over a caller-supplied HTTP client
    pub fn with_http_client(
        ctx: CallContext,
        host: &str,
        api_version: &str,
        http: HttpClient,
    ) -> Result<Self, ClientError> {
        let host: DaemonHost = host.parse()?;
        let version: ApiVersion = api_version.parse()?;
        Ok(Self::from_api(HttpDockerApi::new(host, version, http), ctx))
    }

    /// Environment-derived construction
    ///
    /// Reads `DOCKER_HOST` and `DOCKER_API_VERSION`.
    pub fn from_env(ctx: CallContext) -> Result<Self, ClientError> {
        Self::from_settings(ctx, EnvSettings::from_env()?)
    }

    /// Construction from already resolved daemon settings
    pub fn from_settings(ctx: CallContext, settings: EnvSettings) -> Result<Self, ClientError> {
        let EnvSettings { host, version } = settings;
        match &host {
            #[cfg(unix)]
            DaemonHost::Unix(path) => {
                let dialer = sg_tunnel::UnixDialer::new(path);
                Ok(Self::over_dialer(ctx, dialer, host.clone(), version))
            }
            #[cfg(not(unix))]
            DaemonHost::Unix(_) => Err(ClientError::Construction(format!(
                "{} is not reachable on this platform",
                host
            ))),
            DaemonHost::Tcp(_) => Ok(Self::over_dialer(ctx, TcpDialer, host.clone(), version)),
        }
    }

    /// Construction over any dialer
    ///
    /// Dials in progress abort when the context is cancelled.
    pub fn over_dialer<D: Dial + 'static>(
        ctx: CallContext,
        dialer: D,
        host: DaemonHost,
        version: ApiVersion,
    ) -> Self {
        let connector = DialConnector::new(dialer).with_cancellation(ctx.token().child_token());
        let api = HttpDockerApi::new(host, version, http_client(connector));
        Self::from_api(api, ctx)
    }
}

impl<A: DockerApi> ClientHandle<A> {
    /// Wrap an existing API client
    pub fn from_api(api: A, ctx: CallContext) -> Self {
        Self { api, ctx }
    }

    /// The owned API client
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The context shared by every call
    pub fn context(&self) -> &CallContext {
        &self.ctx
    }

    /// Cancel the handle's context
    pub fn cancel(&self) {
        self.ctx.cancel();
    }

    pub async fn ping(&self) -> Result<String, ClientError> {
        self.ctx.run(self.api.ping()).await
    }

    pub async fn service_list(&self, options: ListOptions) -> Result<Vec<Service>, ClientError> {
        self.ctx.run(self.api.service_list(options)).await
    }

    pub async fn service_remove(&self, service_id: &str) -> Result<(), ClientError> {
        self.ctx.run(self.api.service_remove(service_id)).await
    }

    pub async fn task_list(&self, options: ListOptions) -> Result<Vec<Task>, ClientError> {
        self.ctx.run(self.api.task_list(options)).await
    }

    pub async fn node_list(&self, options: ListOptions) -> Result<Vec<Node>, ClientError> {
        self.ctx.run(self.api.node_list(options)).await
    }

    pub async fn node_remove(&self, node_id: &str, force: bool) -> Result<(), ClientError> {
        self.ctx.run(self.api.node_remove(node_id, force)).await
    }

    pub async fn network_list(&self, options: ListOptions) -> Result<Vec<Network>, ClientError> {
        self.ctx.run(self.api.network_list(options)).await
    }

    pub async fn network_remove(&self, network_id: &str) -> Result<(), ClientError> {
        self.ctx.run(self.api.network_remove(network_id)).await
    }

    pub async fn container_list(
        &self,
        options: ListOptions,
    ) -> Result<Vec<Container>, ClientError> {
        self.ctx.run(self.api.container_list(options)).await
    }

    pub async fn container_remove(
        &self,
        container_id: &str,
        force: bool,
    ) -> Result<(), ClientError> {
        self.ctx
            .run(self.api.container_remove(container_id, force))
            .await
    }
}
