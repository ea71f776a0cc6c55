//! Alert windows: the two times of day at which alerts may fire.
use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use config::AlertPolicy;
use thiserror::Error;

/// An alert time that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid alert time {0:?}, expected e.g. 03:04PM or 15:04")]
pub struct AlertTimeError(pub String);

/// Wall-clock time of day (UTC) with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlertTime(NaiveTime);

impl AlertTime {
    /// Build from hour and minute.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Whether `now`, truncated to the minute, is this time.
    pub fn matches(self, now: DateTime<Utc>) -> bool {
        now.hour() == self.0.hour() && now.minute() == self.0.minute()
    }

    /// Whether this time of day has been reached at `now`.
    pub fn reached(self, now: DateTime<Utc>) -> bool {
        now.time() >= self.0
    }
}

impl FromStr for AlertTime {
    type Err = AlertTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        ["%I:%M%p", "%I:%M %p", "%H:%M"]
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(&upper, fmt).ok())
            .map(Self)
            .ok_or_else(|| AlertTimeError(s.to_owned()))
    }
}

impl fmt::Display for AlertTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%I:%M%p"))
    }
}

/// The two configured alert times, kept in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertWindows {
    times: [AlertTime; 2],
}

impl AlertWindows {
    /// Build from two times in any order.
    pub fn new(a: AlertTime, b: AlertTime) -> Self {
        Self { times: if a <= b { [a, b] } else { [b, a] } }
    }

    /// Parse both alert times.
    pub fn parse(first: &str, second: &str) -> Result<Self, AlertTimeError> {
        Ok(Self::new(first.parse()?, second.parse()?))
    }

    /// Times in chronological order.
    pub const fn times(&self) -> [AlertTime; 2] {
        self.times
    }

    /// Whether the current minute is one of the windows.
    pub fn exact_match(&self, now: DateTime<Utc>) -> bool {
        self.times.iter().any(|t| t.matches(now))
    }

    /// Index of the latest window that already started today.
    pub fn latest_passed(&self, now: DateTime<Utc>) -> Option<usize> {
        self.times.iter().rposition(|t| t.reached(now))
    }
}

/// Window a notification was last sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fired {
    day: NaiveDate,
    window: usize,
}

/// Per-target alert gate. Lives in the target's task and is never shared.
#[derive(Debug, Clone)]
pub struct AlertGate {
    windows: AlertWindows,
    policy: AlertPolicy,
    last: Option<Fired>,
}

impl AlertGate {
    /// New gate with an empty ledger.
    pub const fn new(windows: AlertWindows, policy: AlertPolicy) -> Self {
        Self { windows, policy, last: None }
    }

    /// Whether an alert may be sent at `now`.
    ///
    /// Does not record anything; call [`AlertGate::mark_fired`] once the
    /// notification went out.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        match self.policy {
            AlertPolicy::Exact => self.windows.exact_match(now),
            AlertPolicy::OncePerWindow => match self.windows.latest_passed(now) {
                Some(window) => self.last != Some(Fired { day: now.date_naive(), window }),
                None => false,
            },
        }
    }

    /// Record that the window open at `now` was used.
    pub fn mark_fired(&mut self, now: DateTime<Utc>) {
        if let Some(window) = self.windows.latest_passed(now) {
            self.last = Some(Fired { day: now.date_naive(), window });
        }
    }

    /// Check and record in one step.
    pub fn try_fire(&mut self, now: DateTime<Utc>) -> bool {
        let open = self.is_open(now);
        if open {
            self.mark_fired(now);
        }
        open
    }
}
