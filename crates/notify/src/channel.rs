use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Per-request timeout of a delivery attempt unless overridden.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// A failed delivery on one channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request never got a response.
    #[error("{channel} transport error: {source}")]
    Transport {
        /// Channel name.
        channel: &'static str,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered with a non-success status.
    #[error("{channel} rejected message with status {status}: {body}")]
    Rejected {
        /// Channel name.
        channel: &'static str,
        /// HTTP status.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// Retries did not finish before the delivery deadline.
    #[error("{channel} delivery did not finish within {after:?}")]
    Timeout {
        /// Channel name.
        channel: &'static str,
        /// Deadline that elapsed.
        after: Duration,
    },
}

impl NotifyError {
    /// Whether trying again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { source, .. } => primitives::retries::is_retryable_http(source),
            Self::Rejected { status, .. } => {
                *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
            }
            Self::Timeout { .. } => false,
        }
    }

    pub(crate) async fn check(channel: &'static str, resp: Response) -> Result<(), Self> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Self::Rejected { channel, status: status.as_u16(), body })
    }
}

/// A notification transport such as a chat bot or an e-mail relay.
#[async_trait]
pub trait Channel: Send + Sync + Debug {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Deliver `message`.
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
