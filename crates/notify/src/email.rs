use async_trait::async_trait;
use derive_more::Debug;
use reqwest::Client;
use serde::Serialize;

use std::time::Duration;

use crate::{
    channel::{Channel, DEFAULT_SEND_TIMEOUT, NotifyError},
    retry::{retry_send, send_deadline},
};

const DEFAULT_API: &str = "https://api.sendgrid.com";
const NAME: &str = "email";

/// Subject line used for every alert mail.
pub const DEFAULT_SUBJECT: &str = "Validator mission control alert";

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
struct Mail<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

/// Sends alerts through the SendGrid v3 mail relay.
#[derive(Debug, Clone)]
pub struct EmailChannel {
    http: Client,
    api: String,
    #[debug(skip)]
    api_key: String,
    from: String,
    to: Vec<String>,
    subject: String,
    max_retries: usize,
    timeout: Duration,
}

impl EmailChannel {
    /// Create a channel mailing `to` from `from`.
    pub fn new(api_key: String, from: String, to: Vec<String>) -> Self {
        Self::with_base_url(api_key, from, to, DEFAULT_API)
    }

    /// Create a channel talking to a custom relay base URL.
    pub fn with_base_url(api_key: String, from: String, to: Vec<String>, api: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api: api.into().trim_end_matches('/').to_owned(),
            api_key,
            from,
            to,
            subject: DEFAULT_SUBJECT.to_owned(),
            max_retries: primitives::retries::DEFAULT_MAX_RETRIES as usize,
            timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Override the subject line.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
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

    fn mail<'a>(&'a self, message: &'a str) -> Mail<'a> {
        Mail {
            personalizations: vec![Personalization {
                to: self.to.iter().map(|email| Address { email }).collect(),
            }],
            from: Address { email: &self.from },
            subject: &self.subject,
            content: vec![Content { kind: "text/plain", value: message }],
        }
    }
}

#[async_trait]
impl Channel for EmailChannel {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let url = format!("{}/v3/mail/send", self.api);
        let mail = self.mail(message);
        retry_send(NAME, self.max_retries, send_deadline(self.timeout), || async {
            let resp = self
                .http
                .post(&url)
                .timeout(self.timeout)
                .bearer_auth(&self.api_key)
                .json(&mail)
                .send()
                .await
                .map_err(|source| NotifyError::Transport { channel: NAME, source })?;
            NotifyError::check(NAME, resp).await
        })
        .await
    }
}
