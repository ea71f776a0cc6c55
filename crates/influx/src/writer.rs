//! Metrics sink implementations.
use std::{fmt::Debug as StdDebug, time::Duration};

use async_trait::async_trait;
use derive_more::Debug;
use eyre::{Result, WrapErr, eyre};
use primitives::retries::{is_retryable_http, retry_with_backoff_if};
use reqwest::Client;
use tokio::time;
use tracing::{debug, trace};
use url::Url;

use crate::point::Point;

/// Per-request timeout of a write unless overridden.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Destination for measurement points. Shared by all targets.
#[async_trait]
pub trait MetricsSink: Send + Sync + StdDebug {
    /// Write a batch of points.
    async fn write(&self, points: Vec<Point>) -> Result<()>;
}

/// Writes points to an InfluxDB 1.x `/write` endpoint.
#[derive(Clone, Debug)]
pub struct InfluxWriter {
    /// Base client
    #[debug(skip)]
    http: Client,
    /// Fully built `/write` URL including query string and credentials
    #[debug(skip)]
    write_url: Url,
    /// Database name
    db_name: String,
    /// Timeout of a single request. Retries stop after three times this.
    timeout: Duration,
}

impl InfluxWriter {
    /// Create a new writer for `db_name` on the server at `url`.
    pub fn new(
        url: Url,
        db_name: String,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let mut write_url = url.join("write").wrap_err("invalid influx url")?;
        {
            let mut query = write_url.query_pairs_mut();
            query.append_pair("db", &db_name).append_pair("precision", "ns");
            if let Some(u) = &username {
                query.append_pair("u", u);
            }
            if let Some(p) = &password {
                query.append_pair("p", p);
            }
        }

        Ok(Self { http: Client::new(), write_url, db_name, timeout: DEFAULT_WRITE_TIMEOUT })
    }

    /// Override the per-request timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Database the writer targets.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

#[async_trait]
impl MetricsSink for InfluxWriter {
    async fn write(&self, points: Vec<Point>) -> Result<()> {
        let lines: Vec<String> =
            points.iter().filter(|p| !p.fields.is_empty()).map(Point::to_line).collect();
        if lines.is_empty() {
            return Ok(());
        }
        let body = lines.join("\n");

        let deadline = self.timeout.saturating_mul(3);
        let write = retry_with_backoff_if(
            || async {
                self.http
                    .post(self.write_url.clone())
                    .timeout(self.timeout)
                    .body(body.clone())
                    .send()
                    .await?
                    .error_for_status()
                    .map(drop)
            },
            is_retryable_http,
        );
        time::timeout(deadline, write)
            .await
            .map_err(|_| eyre!("influx write did not finish within {deadline:?}"))?
            .wrap_err_with(|| format!("failed to write {} points to {}", lines.len(), self.db_name))?;

        debug!(points = lines.len(), db = %self.db_name, "wrote metrics");
        Ok(())
    }
}

/// Sink used when no database is configured: points are only traced.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

#[async_trait]
impl MetricsSink for LogSink {
    async fn write(&self, points: Vec<Point>) -> Result<()> {
        for p in &points {
            trace!(line = %p.to_line(), "metrics disabled - would write point");
        }
        Ok(())
    }
}
