//! Check implementations, one per [`CheckKind`].
use chrono::{DateTime, Utc};
use eyre::Result;
use influx::Point;
use tracing::{debug, info, warn};

use crate::{
    alert::{AlertGate, AlertWindows},
    context::CheckContext,
    target::{CheckKind, Target},
};
use config::AlertPolicy;

mod account;
mod gov;
mod node;
mod validator;

pub use validator::{JAILED_MESSAGE, VOTING_MESSAGE, status_message};

/// Mutable state of one target, owned by its task.
#[derive(Debug, Clone)]
pub struct CheckState {
    /// Alert window ledger.
    pub alerts: AlertGate,
    /// Consecutive blocks without our signature.
    pub missed_streak: u64,
    /// Last block height inspected for signatures.
    pub last_height: Option<u64>,
}

impl CheckState {
    /// Fresh state.
    pub const fn new(windows: AlertWindows, policy: AlertPolicy) -> Self {
        Self { alerts: AlertGate::new(windows, policy), missed_streak: 0, last_height: None }
    }

    /// Fresh state for a target running under `ctx`.
    pub fn for_context(ctx: &CheckContext) -> Self {
        Self::new(ctx.windows, ctx.policy())
    }
}

/// Run one execution of `target` at `now`.
pub async fn execute(
    target: &Target,
    ctx: &CheckContext,
    state: &mut CheckState,
    now: DateTime<Utc>,
) -> Result<()> {
    let http = target.http_options.clone();
    match target.check {
        CheckKind::NetInfo => node::net_info(ctx, http, now).await,
        CheckKind::NodeStatus => node::node_status(ctx, state, http, now).await,
        CheckKind::NetworkHeight => node::network_height(ctx, state, http, now).await,
        CheckKind::UnconfirmedTxs => node::unconfirmed_txs(ctx, http, now).await,
        CheckKind::NodeVersion => node::node_version(ctx, http, now).await,
        CheckKind::ValidatorStatus => validator::validator_status(ctx, state, http, now).await,
        CheckKind::MissedBlocks => validator::missed_blocks(ctx, state, http, now).await,
        CheckKind::LastProposedBlock => validator::last_proposed_block(ctx, http, now).await,
        CheckKind::ValidatorSet => validator::validator_set(ctx, state, http, now).await,
        CheckKind::AccountBalance => account::account_balance(ctx, http, now).await,
        CheckKind::SelfDelegation => account::self_delegation(ctx, http, now).await,
        CheckKind::Rewards => account::rewards(ctx, http, now).await,
        CheckKind::Proposals => gov::proposals(ctx, state, http, now).await,
    }
}

/// Send `message` if the alert window is open. Returns whether it was sent.
///
/// The window is only consumed when at least one channel accepted the
/// message, or when running without channels.
pub(crate) async fn alert(
    ctx: &CheckContext,
    state: &mut CheckState,
    check: CheckKind,
    now: DateTime<Utc>,
    message: &str,
) -> bool {
    if !state.alerts.is_open(now) {
        debug!(name = check.name(), %message, "alert condition outside alert window");
        return false;
    }

    let report = ctx.notifier.notify(message).await;
    if report.all_failed() {
        warn!(name = check.name(), "every channel failed, alert will be retried next tick");
        return false;
    }
    state.alerts.mark_fired(now);
    info!(name = check.name(), delivered = report.delivered(), "alert sent");
    true
}

/// Point tagged with the monitored validator.
pub(crate) fn point(ctx: &CheckContext, measurement: &str, now: DateTime<Utc>) -> Point {
    Point::new(measurement, now).tag("validator", ctx.opts.validator.val_operator_addr.as_str())
}

pub(crate) fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

/// Amounts may carry decimals (shares, rewards). Non-finite values have no
/// line protocol encoding and are dropped.
pub(crate) fn parse_amount(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
