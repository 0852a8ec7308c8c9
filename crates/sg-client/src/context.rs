//! Cancellation and deadline context shared by every call on a handle

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Long-lived context observed by every call made through a handle
///
/// Cancelling the token makes in-flight and later calls fail with
/// [`ClientError::Cancelled`]. An absolute deadline or a per-call timeout
/// makes calls fail with [`ClientError::DeadlineExceeded`].
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    call_timeout: Option<Duration>,
}

impl CallContext {
    /// Context with a fresh token and no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an existing token
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            ..Default::default()
        }
    }

    /// Fail every call started or still running after `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Bound each individual call to `timeout`
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// The cancellation token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel the context
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the context has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `call` under this context
    pub async fn run<F, T>(&self, call: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        if self.token.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let now = Instant::now();
        let deadline = match (self.deadline, self.call_timeout.map(|t| now + t)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        if deadline.is_some_and(|d| d <= now) {
            return Err(ClientError::DeadlineExceeded);
        }

        let expiry = async {
            match deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ClientError::Cancelled),
            _ = expiry => Err(ClientError::DeadlineExceeded),
            result = call => result,
        }
    }
}
