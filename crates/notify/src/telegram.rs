use async_trait::async_trait;
use derive_more::Debug;
use reqwest::Client;
use serde::Serialize;

use std::time::Duration;

use crate::{
    channel::{Channel, DEFAULT_SEND_TIMEOUT, NotifyError},
    retry::{retry_send, send_deadline},
};

const DEFAULT_API: &str = "https://api.telegram.org";
const NAME: &str = "telegram";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends messages through the Telegram bot API.
#[derive(Debug, Clone)]
pub struct TelegramChannel {
    http: Client,
    api: String,
    #[debug(skip)]
    bot_token: String,
    chat_id: String,
    max_retries: usize,
    timeout: Duration,
}

impl TelegramChannel {
    /// Create a channel posting to `chat_id` as the bot owning `bot_token`.
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self::with_base_url(bot_token, chat_id, DEFAULT_API)
    }

    /// Create a channel talking to a custom API base URL.
    pub fn with_base_url(bot_token: String, chat_id: String, api: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api: api.into().trim_end_matches('/').to_owned(),
            bot_token,
            chat_id,
            max_retries: primitives::retries::DEFAULT_MAX_RETRIES as usize,
            timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Override how many times a transient failure is retried.
    pub const fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the per-request timeout. Retries stop after three times this.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api, self.bot_token)
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let url = self.url();
        let body = SendMessage { chat_id: &self.chat_id, text: message };
        retry_send(NAME, self.max_retries, send_deadline(self.timeout), || async {
            let resp = self
                .http
                .post(&url)
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await
                .map_err(|source| NotifyError::Transport { channel: NAME, source })?;
            NotifyError::check(NAME, resp).await
        })
        .await
    }
}
