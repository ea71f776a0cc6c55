use std::time::Duration;

use reqwest::{Error as ReqwestError, StatusCode};
use tokio_retry::{RetryIf, strategy::ExponentialBackoff};

/// The default maximum number of retries for an outbound HTTP call.
///
/// With a `DEFAULT_INITIAL_BACKOFF_MS` of 10ms and a factor of 2 the last retry
/// happens roughly 10 seconds after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 9;

/// The default initial backoff time in milliseconds.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 10;

/// Upper bound for a single backoff step.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(5);

/// A retry strategy trait.
pub trait Strategy: Iterator<Item = Duration> + Clone + Send + Sync + 'static {}

/// Implement the Strategy trait for any type that is an iterator of Durations (i.e. all backoffs
/// exported by `tokio_retry`)
impl<T> Strategy for T where T: Iterator<Item = Duration> + Clone + Send + Sync + 'static {}

/// The default exponential backoff used by [`retry_with_backoff_if`].
pub fn default_backoff() -> impl Strategy {
    ExponentialBackoff::from_millis(2)
        .factor(DEFAULT_INITIAL_BACKOFF_MS / 2)
        .max_delay(DEFAULT_MAX_BACKOFF)
        .take(DEFAULT_MAX_RETRIES as usize)
}

/// Checks whether the error message contains "connection refused".
#[inline]
pub fn is_connection_refused<S: ToString>(e: S) -> bool {
    e.to_string().to_lowercase().contains("connection refused")
}

/// Whether a reqwest error is worth retrying: timeouts, connection failures, 5xx and 429.
pub fn is_retryable_http(err: &ReqwestError) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    if let Some(status) = err.status() {
        return status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
    }
    is_connection_refused(err)
}

/// Retry the provided async operation using [`ExponentialBackoff`].
///
/// Retries are attempted as long as the provided `condition` returns `true` for
/// the error produced by the operation.
pub async fn retry_with_backoff_if<F, Fut, T, E, C>(op: F, condition: C) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
{
    retry_with_strategy_if(default_backoff(), op, condition).await
}

/// Same as [`retry_with_backoff_if`] with a caller-provided backoff strategy.
pub async fn retry_with_strategy_if<S, F, Fut, T, E, C>(
    strategy: S,
    op: F,
    condition: C,
) -> Result<T, E>
where
    S: Strategy,
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
{
    RetryIf::spawn(strategy, op, condition).await
}
