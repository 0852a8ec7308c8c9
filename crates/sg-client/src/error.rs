//! Client error types

use std::error::Error as StdError;

use sg_api::{ApiError, ResourceKind, Service};
use sg_core::ConfigError;
use sg_tunnel::TunnelError;
use thiserror::Error;

/// Errors returned by the client handle and query layer
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client could not be constructed
    #[error("Invalid client configuration: {0}")]
    Construction(String),

    /// Malformed API version or daemon address
    #[error("Invalid client configuration: {0}")]
    InvalidValue(#[from] ApiError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tunnel could not be set up (e.g. unreadable private key)
    #[error("Tunnel error: {0}")]
    Tunnel(#[from] TunnelError),

    /// Connection-level failure while sending a request
    #[error("Transport error: {}", describe_chain(.0))]
    Transport(#[source] hyper_util::client::legacy::Error),

    /// Request could not be built
    #[error("Failed to build request: {0}")]
    Request(#[from] hyper::http::Error),

    /// Response body could not be read
    #[error("Failed to read response: {0}")]
    Body(#[from] hyper::Error),

    /// Daemon answered with a non-success status
    #[error("Daemon returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Exact-ID lookup found nothing
    #[error("No {kind} with ID {id} found")]
    NotFound { kind: ResourceKind, id: String },

    /// Name pattern is not a valid regular expression
    #[error("Invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Compound delete stopped partway through
    #[error(
        "Removed {} service(s) before failing on {failed_id}: {source}",
        .removed.len()
    )]
    PartialDelete {
        removed: Vec<Service>,
        failed_id: String,
        #[source]
        source: Box<ClientError>,
    },

    /// The handle's context was cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// The handle's deadline passed
    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl ClientError {
    /// Whether the resource is absent (as opposed to unreachable)
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::NotFound { .. } => true,
            ClientError::Api { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Whether the failure came from cancellation or an expired deadline
    pub fn is_cancelled(&self) -> bool {
        match self {
            ClientError::Cancelled | ClientError::DeadlineExceeded => true,
            ClientError::PartialDelete { source, .. } => source.is_cancelled(),
            _ => matches!(self.tunnel_error(), Some(TunnelError::Cancelled)),
        }
    }

    /// The tunnel failure behind this error, if there is one
    pub fn tunnel_error(&self) -> Option<&TunnelError> {
        match self {
            ClientError::Tunnel(e) => Some(e),
            ClientError::Transport(e) => {
                let mut source = e.source();
                while let Some(err) = source {
                    if let Some(tunnel) = err.downcast_ref::<TunnelError>() {
                        return Some(tunnel);
                    }
                    source = err.source();
                }
                None
            }
            ClientError::PartialDelete { source, .. } => source.tunnel_error(),
            _ => None,
        }
    }

    /// Services removed before a compound delete failed
    pub fn removed(&self) -> &[Service] {
        match self {
            ClientError::PartialDelete { removed, .. } => removed,
            _ => &[],
        }
    }
}

/// Render an error and its causes as `outer: inner: ...`
fn describe_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = ClientError::NotFound {
            kind: ResourceKind::Service,
            id: "abc".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No service with ID abc found");

        let err = ClientError::Api {
            status: 404,
            message: "service abc not found".to_string(),
        };
        assert!(err.is_not_found());

        let err = ClientError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_partial_delete_reports_removed() {
        let removed = vec![Service {
            id: "s1".to_string(),
            ..Default::default()
        }];
        let err = ClientError::PartialDelete {
            removed,
            failed_id: "s2".to_string(),
            source: Box::new(ClientError::Cancelled),
        };

        assert_eq!(err.removed().len(), 1);
        assert!(err.is_cancelled());
        assert_eq!(
            err.to_string(),
            "Removed 1 service(s) before failing on s2: Operation cancelled"
        );
    }

    #[test]
    fn test_tunnel_error_is_exposed() {
        let err = ClientError::Tunnel(TunnelError::AuthRejected {
            user: "deploy".to_string(),
        });
        assert!(err.tunnel_error().is_some_and(TunnelError::is_handshake));
        assert!(!err.is_not_found());
    }
}
