use std::{
    future::Future,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use futures::FutureExt;
use tokio::signal::unix::{Signal, SignalKind};
use tracing::debug;

type Trigger = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A `ShutdownSignal` is an helper struct that listens for various shutdown signals sources.
pub struct ShutdownSignal {
    /// A future that resolves when a SIGINT signal is received.
    ctrl_c: Pin<Box<dyn Future<Output = io::Result<()>> + Send>>,
    /// A future that resolves when a SIGTERM signal is received.
    term_signal: Signal,
    /// Extra trigger, used to stop the process programmatically.
    trigger: Option<Trigger>,
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal").finish_non_exhaustive()
    }
}

impl ShutdownSignal {
    /// Creates a new `ShutdownSignal` listening for SIGINT and SIGTERM.
    pub fn new() -> io::Result<Self> {
        let ctrl_c = Box::pin(tokio::signal::ctrl_c());
        let term_signal = tokio::signal::unix::signal(SignalKind::terminate())?;

        Ok(Self { ctrl_c, term_signal, trigger: None })
    }

    /// Also resolve when `trigger` completes.
    pub fn with_trigger<F>(mut self, trigger: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.trigger = Some(Box::pin(trigger));
        self
    }
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.ctrl_c.poll_unpin(cx).is_ready() {
            debug!("Received SIGINT signal");
            return Poll::Ready(());
        }

        if this.term_signal.poll_recv(cx).is_ready() {
            debug!("Received SIGTERM signal");
            return Poll::Ready(());
        }

        if this.trigger.as_mut().is_some_and(|trigger| trigger.poll_unpin(cx).is_ready()) {
            debug!("Shutdown triggered");
            return Poll::Ready(());
        }

        Poll::Pending
    }
}

/// Run a future until a shutdown signal is received.
///
/// Returns `None` when the signal won, after running `on_shutdown`. The
/// unfinished future is dropped, so the caller can release what it borrowed.
pub async fn run_until_shutdown<F, O, C>(fut: F, shutdown: ShutdownSignal, on_shutdown: C) -> Option<O>
where
    F: Future<Output = O>,
    C: FnOnce(),
{
    tokio::select! {
        // NOTE: wrap with a `Box` so we don't allocate a
        // huge future state machine on the stack.
        result = Box::pin(fut) => Some(result),
        () = shutdown => {
            on_shutdown();
            None
        }
    }
}
