use std::time::Duration;

use primitives::retries::{Strategy, default_backoff, retry_with_strategy_if};
use tokio::time;

use crate::channel::NotifyError;

/// Total time a delivery may take across all attempts, given the per-request timeout.
pub(crate) const fn send_deadline(timeout: Duration) -> Duration {
    timeout.saturating_mul(3)
}

/// Retry a channel delivery with exponential backoff while the error is transient,
/// giving up once `deadline` has elapsed.
pub(crate) async fn retry_send<F, Fut>(
    channel: &'static str,
    max_retries: usize,
    deadline: Duration,
    op: F,
) -> Result<(), NotifyError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), NotifyError>>,
{
    time::timeout(deadline, retry_with_strategy_if(backoff(max_retries), op, NotifyError::is_retryable))
        .await
        .map_err(|_| NotifyError::Timeout { channel, after: deadline })?
}

fn backoff(max_retries: usize) -> impl Strategy {
    default_backoff().take(max_retries)
}
