//! Polling cadence specifications.
//!
//! A cadence is written the way operators are used to from cron-style schedulers:
//!
//! - a bare duration: `30s`, `1m`, `1h30m`, `500ms`
//! - an interval phrase: `every 1m`, `@every 2s`
//! - a descriptor: `@minutely`, `@hourly`, `@daily`
//! - a simple cron expression firing every N minutes: `*/5 * * * *`
use std::{fmt, str::FromStr, time::Duration};

use thiserror::Error;

/// Errors produced while parsing a cadence string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CadenceError {
    /// The string was empty.
    #[error("empty cadence")]
    Empty,
    /// A duration component could not be parsed.
    #[error("invalid duration `{0}`")]
    InvalidDuration(String),
    /// The unit suffix is not one of `ms`, `s`, `m`, `h`.
    #[error("unknown duration unit `{unit}` in `{input}`")]
    UnknownUnit {
        /// Offending unit.
        unit: String,
        /// Whole input.
        input: String,
    },
    /// Cron expression outside the supported `*/N * * * *` subset.
    #[error("unsupported cron expression `{0}`")]
    UnsupportedCron(String),
    /// The cadence resolved to a zero interval.
    #[error("cadence `{0}` resolves to a zero interval")]
    Zero(String),
}

/// A parsed polling cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cadence {
    spec: String,
    interval: Duration,
}

impl Cadence {
    /// Build a cadence from a fixed interval.
    pub fn every(interval: Duration) -> Self {
        Self { spec: format!("@every {}", format_duration(interval)), interval }
    }

    /// Interval between two ticks.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// The original specification string.
    pub fn spec(&self) -> &str {
        &self.spec
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

impl FromStr for Cadence {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        if spec.is_empty() {
            return Err(CadenceError::Empty);
        }

        let interval = match spec {
            "@minutely" => Duration::from_secs(60),
            "@hourly" => Duration::from_secs(60 * 60),
            "@daily" | "@midnight" => Duration::from_secs(24 * 60 * 60),
            _ if spec.split_whitespace().count() == 5 => parse_cron(spec)?,
            _ => {
                let rest = spec
                    .strip_prefix("@every")
                    .or_else(|| spec.strip_prefix("every"))
                    .unwrap_or(spec)
                    .trim();
                parse_duration(rest)?
            }
        };

        if interval.is_zero() {
            return Err(CadenceError::Zero(spec.to_owned()));
        }

        Ok(Self { spec: spec.to_owned(), interval })
    }
}

/// Parse a compound duration such as `1h30m`, `45s` or `250ms`.
pub fn parse_duration(input: &str) -> Result<Duration, CadenceError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(CadenceError::InvalidDuration(input.to_owned()));
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(CadenceError::InvalidDuration(input.to_owned()));
        }
        let value: u64 =
            rest[..digits].parse().map_err(|_| CadenceError::InvalidDuration(input.to_owned()))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let invalid = || CadenceError::InvalidDuration(input.to_owned());
        let step = match unit {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(invalid)?),
            "h" => Duration::from_secs(value.checked_mul(60 * 60).ok_or_else(invalid)?),
            "" => return Err(invalid()),
            other => {
                return Err(CadenceError::UnknownUnit {
                    unit: other.to_owned(),
                    input: input.to_owned(),
                });
            }
        };
        total = total.checked_add(step).ok_or_else(invalid)?;
    }

    Ok(total)
}

/// Supports `*/N * * * *` and `* * * * *`.
fn parse_cron(spec: &str) -> Result<Duration, CadenceError> {
    let fields: Vec<&str> = spec.split_whitespace().collect();
    if fields[1..].iter().any(|f| *f != "*") {
        return Err(CadenceError::UnsupportedCron(spec.to_owned()));
    }

    let minutes = match fields[0] {
        "*" => 1,
        f => f
            .strip_prefix("*/")
            .and_then(|n| n.parse::<u64>().ok())
            .filter(|n| (1..=59).contains(n))
            .ok_or_else(|| CadenceError::UnsupportedCron(spec.to_owned()))?,
    };

    Ok(Duration::from_secs(minutes * 60))
}

fn format_duration(d: Duration) -> String {
    if d.subsec_millis() != 0 {
        return format!("{}ms", d.as_millis());
    }
    let secs = d.as_secs();
    if secs % 3600 == 0 && secs > 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 && secs > 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
