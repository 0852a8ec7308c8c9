//! HTTP transport over a [`Dial`] implementation
//!
//! [`DialConnector`] is the connection-dialing hook of a hyper client: each
//! new connection the client wants is obtained by calling the dialer. The
//! client itself keeps hyper's defaults for pooling, timeouts and the rest.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::future::BoxFuture;
use http_body_util::Full;
use hyper::Uri;
use hyper_util::client::legacy::connect::{Connected, Connection};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio_util::sync::CancellationToken;
use tower::Service;

use crate::dialer::{BoxedStream, Dial};
use crate::error::TunnelError;

/// hyper client whose connections come from a [`DialConnector`]
pub type HttpClient = Client<DialConnector, Full<Bytes>>;

/// Build an HTTP client that dials through `connector`
pub fn http_client(connector: DialConnector) -> HttpClient {
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Connector handing every new connection request to a dialer
#[derive(Clone)]
pub struct DialConnector {
    dialer: Arc<dyn Dial>,
    cancel: Option<CancellationToken>,
}

impl DialConnector {
    /// Wrap a dialer
    pub fn new<D: Dial + 'static>(dialer: D) -> Self {
        Self::from_arc(Arc::new(dialer))
    }

    /// Wrap a shared dialer
    pub fn from_arc(dialer: Arc<dyn Dial>) -> Self {
        Self {
            dialer,
            cancel: None,
        }
    }

    /// Abort in-progress dials once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl fmt::Debug for DialConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialConnector")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl Service<Uri> for DialConnector {
    type Response = TunnelConnection;
    type Error = TunnelError;
    type Future = BoxFuture<'static, Result<TunnelConnection, TunnelError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let dialer = Arc::clone(&self.dialer);
        let cancel = self.cancel.clone();
        let address = dial_address(&uri);

        Box::pin(async move {
            if let Some(token) = &cancel {
                if token.is_cancelled() {
                    return Err(TunnelError::Cancelled);
                }
            }

            let dial = dialer.dial("tcp", &address);
            let stream = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(TunnelError::Cancelled),
                    result = dial => result?,
                },
                None => dial.await?,
            };

            Ok(TunnelConnection::new(stream))
        })
    }
}

/// `host:port` the HTTP layer would dial for `uri`
fn dial_address(uri: &Uri) -> String {
    let host = uri.host().unwrap_or_default();
    let port = uri.port_u16().unwrap_or(match uri.scheme_str() {
        Some("https") => 443,
        _ => 80,
    });
    format!("{}:{}", host, port)
}

/// A dialed connection as seen by hyper
pub struct TunnelConnection {
    io: TokioIo<BoxedStream>,
}

impl TunnelConnection {
    fn new(stream: BoxedStream) -> Self {
        Self {
            io: TokioIo::new(stream),
        }
    }
}

impl Connection for TunnelConnection {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}

impl hyper::rt::Read for TunnelConnection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: hyper::rt::ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        hyper::rt::Read::poll_read(Pin::new(&mut self.io), cx, buf)
    }
}

impl hyper::rt::Write for TunnelConnection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        hyper::rt::Write::poll_write(Pin::new(&mut self.io), cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        hyper::rt::Write::poll_flush(Pin::new(&mut self.io), cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        hyper::rt::Write::poll_shutdown(Pin::new(&mut self.io), cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response};

    /// Serves each dialed connection with a tiny echo-the-request-line server
    #[derive(Default)]
    struct ServingDialer {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Dial for ServingDialer {
        async fn dial(&self, network: &str, address: &str) -> Result<BoxedStream, TunnelError> {
            self.seen
                .lock()
                .unwrap()
                .push((network.to_string(), address.to_string()));

            let (client_io, server_io) = tokio::io::duplex(8192);
            tokio::spawn(async move {
                let service = service_fn(|req: Request<hyper::body::Incoming>| async move {
                    let line = format!("{} {}", req.method(), req.uri());
                    Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(line))))
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(server_io), service)
                    .await;
            });
            Ok(Box::pin(client_io))
        }
    }

    /// Never finishes dialing
    struct HangingDialer;

    #[async_trait]
    impl Dial for HangingDialer {
        async fn dial(&self, _network: &str, _address: &str) -> Result<BoxedStream, TunnelError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_dial_address_defaults_port() {
        let uri: Uri = "http://docker/v1.41/_ping".parse().unwrap();
        assert_eq!(dial_address(&uri), "docker:80");

        let uri: Uri = "http://10.0.0.1:2375/_ping".parse().unwrap();
        assert_eq!(dial_address(&uri), "10.0.0.1:2375");
    }

    #[tokio::test]
    async fn test_http_requests_travel_through_dialer() {
        let dialer = Arc::new(ServingDialer::default());
        let client = http_client(DialConnector::from_arc(dialer.clone()));

        let request = Request::get("http://docker/v1.41/services?filters=x")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = client.request(request).await.unwrap();
        assert!(response.status().is_success());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"GET /v1.41/services?filters=x");

        let seen = dialer.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![("tcp".to_string(), "docker:80".to_string())]);
    }

    #[tokio::test]
    async fn test_dial_errors_surface_through_client() {
        struct Refusing;

        #[async_trait]
        impl Dial for Refusing {
            async fn dial(&self, _: &str, _: &str) -> Result<BoxedStream, TunnelError> {
                Err(TunnelError::AuthRejected {
                    user: "deploy".to_string(),
                })
            }
        }

        let client = http_client(DialConnector::new(Refusing));
        let request = Request::get("http://docker/_ping")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let err = client.request(request).await.unwrap_err();
        assert!(err.is_connect());
    }

    #[tokio::test]
    async fn test_cancellation_aborts_dial() {
        let token = CancellationToken::new();
        let mut connector = DialConnector::new(HangingDialer).with_cancellation(token.clone());

        let uri: Uri = "http://docker/_ping".parse().unwrap();
        let pending = tokio::spawn(connector.call(uri));
        token.cancel();

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(TunnelError::Cancelled)));
    }
}
