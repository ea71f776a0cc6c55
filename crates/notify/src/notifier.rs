//! Fan-out of one message to every configured channel.
use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info};

use crate::channel::{Channel, NotifyError};

/// Result of delivering one message on one channel.
#[derive(Debug)]
pub struct ChannelOutcome {
    /// Channel name.
    pub channel: &'static str,
    /// Delivery result.
    pub result: Result<(), NotifyError>,
}

/// Per-channel outcomes of a fan-out.
#[derive(Debug, Default)]
pub struct NotifyReport {
    /// One entry per configured channel, in configuration order.
    pub outcomes: Vec<ChannelOutcome>,
}

impl NotifyReport {
    /// Number of channels that accepted the message.
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Whether every channel failed. False when no channel is configured.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.delivered() == 0
    }

    /// Outcome for the channel named `channel`.
    pub fn outcome(&self, channel: &str) -> Option<&ChannelOutcome> {
        self.outcomes.iter().find(|o| o.channel == channel)
    }
}

/// Delivers messages to all channels concurrently.
///
/// A failing channel never prevents delivery on the others. With no channels
/// configured the notifier runs in dry-run mode and only logs.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    channels: Vec<Arc<dyn Channel>>,
}

impl Notifier {
    /// Create a notifier over `channels`.
    pub fn new(channels: Vec<Arc<dyn Channel>>) -> Self {
        Self { channels }
    }

    /// Add a channel.
    pub fn with_channel(mut self, channel: Arc<dyn Channel>) -> Self {
        self.channels.push(channel);
        self
    }

    /// Names of the configured channels.
    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Whether no channel is configured.
    pub fn is_dry_run(&self) -> bool {
        self.channels.is_empty()
    }

    /// Send `message` on every channel and report each outcome.
    pub async fn notify(&self, message: &str) -> NotifyReport {
        if self.is_dry_run() {
            info!(%message, "no notification channel configured, skipping delivery");
            return NotifyReport::default();
        }

        let sends = self.channels.iter().map(|channel| async move {
            let result = channel.send(message).await;
            ChannelOutcome { channel: channel.name(), result }
        });
        let outcomes = join_all(sends).await;

        for outcome in &outcomes {
            match &outcome.result {
                Ok(()) => info!(channel = outcome.channel, "alert delivered"),
                Err(e) => error!(channel = outcome.channel, error = %e, "alert delivery failed"),
            }
        }
        NotifyReport { outcomes }
    }
}
