//! Runs every target on its own cadence until shut down.
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use config::AlertPolicy;
use tokio::{
    task::JoinSet,
    time::{self, MissedTickBehavior},
};
use tracing::{error, info, warn};

use crate::{
    checks::{CheckState, execute},
    context::CheckContext,
    target::{Target, Targets},
};

/// Longest cadence at which the exact alert policy can still hit every window minute.
const EXACT_POLICY_MAX_INTERVAL: Duration = Duration::from_secs(60);

/// Whether `target` alerts under the exact policy but polls too slowly to
/// land on every window minute.
fn misses_exact_windows(policy: AlertPolicy, target: &Target) -> bool {
    policy == AlertPolicy::Exact && target.check.alerts() && target.interval() > EXACT_POLICY_MAX_INTERVAL
}

/// Unit of work repeated by [`drive`].
#[async_trait]
pub trait Job: Send {
    /// Run once. Errors are handled inside; the loop never stops on failure.
    async fn run_once(&mut self, now: DateTime<Utc>);
}

/// Repeat `job` every `period`, forever.
///
/// The next tick waits for the previous run to finish. Ticks missed while a
/// run was slow are delayed, not replayed in a burst.
pub async fn drive<J: Job>(period: Duration, mut job: J) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        job.run_once(Utc::now()).await;
    }
}

/// A target together with the state its executions share.
#[derive(Debug)]
pub struct TargetJob {
    target: Target,
    ctx: Arc<CheckContext>,
    state: CheckState,
}

impl TargetJob {
    /// Job with fresh state.
    pub fn new(target: Target, ctx: Arc<CheckContext>) -> Self {
        let state = CheckState::for_context(&ctx);
        Self { target, ctx, state }
    }

    /// State accumulated so far.
    pub const fn state(&self) -> &CheckState {
        &self.state
    }
}

#[async_trait]
impl Job for TargetJob {
    async fn run_once(&mut self, now: DateTime<Utc>) {
        if let Err(e) = execute(&self.target, &self.ctx, &mut self.state, now).await {
            error!(name = %self.target.name, err = %format!("{e:#}"), "target execution failed, skipping tick");
        }
    }
}

/// Owns one task per target.
#[derive(Debug)]
pub struct Scheduler {
    ctx: Arc<CheckContext>,
    tasks: JoinSet<()>,
}

impl Scheduler {
    /// Scheduler sharing `ctx` with all targets.
    pub fn new(ctx: CheckContext) -> Self {
        Self { ctx: Arc::new(ctx), tasks: JoinSet::new() }
    }

    /// Start every registered target.
    pub fn spawn_all(&mut self, targets: &Targets) {
        for target in targets {
            self.spawn(target.clone());
        }
        info!(targets = self.tasks.len(), "scheduler started");
    }

    /// Start one target.
    pub fn spawn(&mut self, target: Target) {
        if misses_exact_windows(self.ctx.policy(), &target) {
            warn!(
                name = %target.name,
                cadence = %target.cadence,
                "cadence is longer than a minute, exact alert windows may never be hit"
            );
        }

        info!(name = %target.name, kind = %target.kind, cadence = %target.cadence, "starting target");
        let period = target.interval();
        let job = TargetJob::new(target, Arc::clone(&self.ctx));
        self.tasks.spawn(drive(period, job));
    }

    /// Number of running target tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no target is running.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait on the target tasks. Only returns once every task has ended,
    /// which only happens if they panic or are aborted.
    pub async fn run(&mut self) {
        while let Some(res) = self.tasks.join_next().await {
            match res {
                Err(e) if e.is_panic() => error!(err = %e, "target task panicked"),
                Err(_) => {}
                Ok(()) => warn!("target task stopped"),
            }
        }
    }

    /// Abort every task and wait for them to unwind.
    pub async fn shutdown(mut self) {
        info!(targets = self.tasks.len(), "stopping targets");
        self.tasks.shutdown().await;
    }
}
