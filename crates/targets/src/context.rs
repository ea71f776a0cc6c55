//! Handles shared by every target task.
use std::{sync::Arc, time::Duration};

use config::{AlertPolicy, Opts};
use eyre::{Result, WrapErr};
use influx::{InfluxWriter, LogSink, MetricsSink, Point};
use network::{HttpOptions, HttpProbe};
use notify::{Channel, EmailChannel, Notifier, TelegramChannel};
use responses::Response;
use tracing::{error, info};

use crate::alert::AlertWindows;

/// Configuration, probe, metrics sink and notifier, injected into every check.
#[derive(Debug, Clone)]
pub struct CheckContext {
    /// Read-only configuration.
    pub opts: Arc<Opts>,
    /// HTTP probe.
    pub probe: HttpProbe,
    /// Metrics destination.
    pub metrics: Arc<dyn MetricsSink>,
    /// Notification fan-out.
    pub notifier: Arc<Notifier>,
    /// Parsed alert windows.
    pub windows: AlertWindows,
}

impl CheckContext {
    /// Assemble a context from explicit handles.
    pub fn new(
        opts: Arc<Opts>,
        probe: HttpProbe,
        metrics: Arc<dyn MetricsSink>,
        notifier: Arc<Notifier>,
    ) -> Result<Self> {
        let windows = AlertWindows::parse(&opts.alert.alert_time1, &opts.alert.alert_time2)
            .wrap_err("invalid alert window")?;
        Ok(Self { opts, probe, metrics, notifier, windows })
    }

    /// Build every handle from configuration.
    pub fn from_opts(opts: Opts) -> Result<Self> {
        let timeout = Duration::from_secs(opts.scrape.http_timeout_secs);
        let probe = HttpProbe::new(timeout).wrap_err("failed to build http probe")?;

        let metrics: Arc<dyn MetricsSink> = match &opts.influx.influx_url {
            Some(url) => {
                let writer = InfluxWriter::new(
                    url.clone(),
                    opts.influx.influx_db.clone(),
                    opts.influx.influx_username.clone(),
                    opts.influx.influx_password.clone(),
                )?
                .with_timeout(timeout);
                info!(db = writer.db_name(), "writing metrics to influxdb");
                Arc::new(writer)
            }
            None => {
                info!("no influxdb configured, metrics are only logged");
                Arc::new(LogSink)
            }
        };

        let notifier = Arc::new(notifier_from_opts(&opts, timeout));
        Self::new(Arc::new(opts), probe, metrics, notifier)
    }

    /// Configured alert policy.
    pub fn policy(&self) -> AlertPolicy {
        self.opts.alert.alert_policy
    }

    /// Probe `http` and decode the body as `T`.
    pub async fn fetch<T: Response>(&self, http: &HttpOptions) -> Result<T> {
        let resp = self
            .probe
            .probe(http)
            .await
            .wrap_err_with(|| format!("request to {} failed", http.endpoint))?;
        T::decode(&resp.body).wrap_err_with(|| format!("unexpected response from {}", http.endpoint))
    }

    /// Write points. Failures are logged and never abort the check.
    pub async fn record(&self, name: &str, points: Vec<Point>) {
        if let Err(e) = self.metrics.write(points).await {
            error!(name, err = %e, "failed to write metrics");
        }
    }
}

fn notifier_from_opts(opts: &Opts, timeout: Duration) -> Notifier {
    let mut channels: Vec<Arc<dyn Channel>> = Vec::new();

    if let Some((token, chat_id)) = opts.telegram.credentials() {
        channels.push(Arc::new(
            TelegramChannel::new(token.to_owned(), chat_id.to_owned()).with_timeout(timeout),
        ));
    }

    if opts.email.enabled() &&
        let (Some(key), Some(from)) = (&opts.email.sendgrid_token, &opts.email.email_from)
    {
        channels.push(Arc::new(
            EmailChannel::new(key.clone(), from.clone(), opts.email.email_to.clone()).with_timeout(timeout),
        ));
    }

    let notifier = Notifier::new(channels);
    if notifier.is_dry_run() {
        info!("no notification channel configured, alerts are only logged");
    } else {
        info!(channels = ?notifier.channel_names(), "notification channels enabled");
    }
    notifier
}
