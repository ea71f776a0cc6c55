//! Mission control configuration
use clap::{Parser, ValueEnum};
use url::Url;

/// Node endpoint configuration options
#[derive(Debug, Clone, Parser)]
pub struct NodeOpts {
    /// Tendermint RPC URL of the monitored node
    #[clap(long, env = "RPC_ENDPOINT")]
    pub rpc_endpoint: Url,
    /// Application (LCD) REST URL of the monitored node
    #[clap(long, env = "LCD_ENDPOINT")]
    pub lcd_endpoint: Url,
    /// Reference RPC URL used to measure how far the node lags behind the network
    #[clap(long, env = "EXTERNAL_RPC")]
    pub external_rpc: Url,
}

/// Validator identity configuration options
#[derive(Debug, Clone, Parser)]
pub struct ValidatorOpts {
    /// Validator operator address (valoper)
    #[clap(long, env = "VAL_OPERATOR_ADDR")]
    pub val_operator_addr: String,
    /// Account address owning the validator
    #[clap(long, env = "ACC_ADDRESS")]
    pub acc_address: String,
    /// Consensus address in hex, as found in block commits and the validator set
    #[clap(long, env = "VALIDATOR_HEX_ADDR")]
    pub validator_hex_addr: String,
    /// Staking denomination
    #[clap(long, env = "STAKING_DENOM", default_value = "uatom")]
    pub staking_denom: String,
}

/// How alert windows gate notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AlertPolicy {
    /// Fire when the current minute equals a window time.
    Exact,
    /// Fire on the first tick at or after a window start, once per window per day.
    #[default]
    OncePerWindow,
}

/// Alerting configuration options
#[derive(Debug, Clone, Parser)]
pub struct AlertOpts {
    /// First daily alert time (UTC), e.g. 02:00AM or 02:00
    #[clap(long, env = "ALERT_TIME1", default_value = "02:00AM")]
    pub alert_time1: String,
    /// Second daily alert time (UTC), e.g. 02:00PM or 14:00
    #[clap(long, env = "ALERT_TIME2", default_value = "02:00PM")]
    pub alert_time2: String,
    /// Alert window policy
    #[clap(long, env = "ALERT_POLICY", value_enum, default_value_t = AlertPolicy::OncePerWindow)]
    pub alert_policy: AlertPolicy,
    /// Block height difference to the reference network that triggers a lag alert
    #[clap(long, env = "BLOCK_DIFF_THRESHOLD", default_value = "2")]
    pub block_diff_threshold: u64,
    /// Consecutive missed blocks that trigger a missed-blocks alert
    #[clap(long, env = "MISSED_BLOCKS_THRESHOLD", default_value = "10")]
    pub missed_blocks_threshold: u64,
}

/// Telegram configuration options
#[derive(Debug, Clone, Parser)]
pub struct TelegramOpts {
    /// Telegram bot token; the channel is disabled when unset
    #[clap(long, env = "TELEGRAM_BOT_TOKEN")]
    pub telegram_bot_token: Option<String>,
    /// Telegram chat ID receiving alerts
    #[clap(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,
}

impl TelegramOpts {
    /// Token and chat ID, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.telegram_bot_token.as_deref()?, self.telegram_chat_id.as_deref()?))
    }
}

/// E-mail configuration options
#[derive(Debug, Clone, Parser)]
pub struct EmailOpts {
    /// SendGrid API key; the channel is disabled when unset
    #[clap(long, env = "SENDGRID_TOKEN")]
    pub sendgrid_token: Option<String>,
    /// Sender address
    #[clap(long, env = "EMAIL_FROM")]
    pub email_from: Option<String>,
    /// Recipient addresses, comma separated
    #[clap(long, env = "EMAIL_TO", value_delimiter = ',')]
    pub email_to: Vec<String>,
}

impl EmailOpts {
    /// Whether enough is configured to send mail.
    pub fn enabled(&self) -> bool {
        self.sendgrid_token.is_some() && self.email_from.is_some() && !self.email_to.is_empty()
    }
}

/// InfluxDB configuration options
#[derive(Debug, Clone, Parser)]
pub struct InfluxOpts {
    /// InfluxDB URL; metrics are only logged when unset
    #[clap(long, env = "INFLUXDB_URL")]
    pub influx_url: Option<Url>,
    /// InfluxDB database
    #[clap(long, env = "INFLUXDB_DATABASE", default_value = "vcf")]
    pub influx_db: String,
    /// InfluxDB username
    #[clap(long, env = "INFLUXDB_USERNAME")]
    pub influx_username: Option<String>,
    /// InfluxDB password
    #[clap(long, env = "INFLUXDB_PASSWORD")]
    pub influx_password: Option<String>,
}

/// Polling configuration options
#[derive(Debug, Clone, Parser)]
pub struct ScrapeOpts {
    /// Cadence applied to every target instead of its default, e.g. "30s" or "@every 1m"
    #[clap(long, env = "SCRAPE_RATE")]
    pub scrape_rate: Option<String>,
    /// Timeout of a single HTTP probe in seconds
    #[clap(long, env = "HTTP_TIMEOUT_SECS", default_value = "10")]
    pub http_timeout_secs: u64,
    /// Names of targets to run; all targets run when empty
    #[clap(long, env = "TARGETS", value_delimiter = ',')]
    pub targets: Vec<String>,
}

/// CLI options for mission control
#[derive(Debug, Clone, Parser)]
#[clap(name = "mission-control", about = "Validator monitoring and alerting")]
pub struct Opts {
    /// Node endpoint configuration
    #[clap(flatten)]
    pub node: NodeOpts,

    /// Validator identity configuration
    #[clap(flatten)]
    pub validator: ValidatorOpts,

    /// Alerting configuration
    #[clap(flatten)]
    pub alert: AlertOpts,

    /// Telegram configuration
    #[clap(flatten)]
    pub telegram: TelegramOpts,

    /// E-mail configuration
    #[clap(flatten)]
    pub email: EmailOpts,

    /// InfluxDB configuration
    #[clap(flatten)]
    pub influx: InfluxOpts,

    /// Polling configuration
    #[clap(flatten)]
    pub scrape: ScrapeOpts,
}
