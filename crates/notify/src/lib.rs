//! Alert delivery: a chat bot channel, an e-mail channel and a fan-out notifier.

/// Channel trait and delivery errors
pub mod channel;
/// E-mail delivery through an HTTP mail relay
pub mod email;
/// Concurrent fan-out over all channels
pub mod notifier;
mod retry;
/// Telegram bot delivery
pub mod telegram;

pub use channel::{Channel, DEFAULT_SEND_TIMEOUT, NotifyError};
pub use email::EmailChannel;
pub use notifier::{ChannelOutcome, Notifier, NotifyReport};
pub use telegram::TelegramChannel;
