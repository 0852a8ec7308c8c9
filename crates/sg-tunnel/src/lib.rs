//! sg-tunnel: SSH-tunneled transport for remote unix sockets
//!
//! A [`TunnelDialer`] opens an SSH connection to a remote host and, over it,
//! a stream to a unix-domain socket on that host. The [`DialConnector`]
//! plugs any [`Dial`] implementation into a hyper client so that ordinary
//! HTTP requests travel through the tunnel.

pub mod dialer;
pub mod endpoint;
pub mod error;
pub mod local;
pub mod pool;
pub mod ssh;
pub mod transport;

pub use dialer::{BoxedStream, Dial, SshConnect, SshSession, TunnelDialer, TunnelIo};
pub use endpoint::{parse_host_port, TunnelEndpoint, DEFAULT_SSH_PORT};
pub use error::TunnelError;
pub use local::TcpDialer;
#[cfg(unix)]
pub use local::UnixDialer;
pub use pool::PooledTunnelDialer;
pub use ssh::{RusshConnector, RusshSession};
pub use transport::{http_client, DialConnector, HttpClient, TunnelConnection};
