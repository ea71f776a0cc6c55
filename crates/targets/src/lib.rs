//! Monitoring targets for a blockchain validator.
//!
//! A [`Target`] binds a check to an HTTP endpoint and a polling cadence. The
//! [`Scheduler`] runs every target in its own task; each execution fetches one
//! response, records metrics and, inside the configured alert windows, sends
//! notifications.

/// Alert windows and the per-target alert ledger
pub mod alert;
/// Check implementations
pub mod checks;
/// Shared handles injected into checks
pub mod context;
/// Per-target task management
pub mod scheduler;
/// Target definitions and the registry
pub mod target;

#[cfg(test)]
mod test_util;

pub use alert::{AlertGate, AlertTime, AlertTimeError, AlertWindows};
pub use checks::{CheckState, JAILED_MESSAGE, VOTING_MESSAGE, execute, status_message};
pub use context::CheckContext;
pub use scheduler::{Job, Scheduler, TargetJob, drive};
pub use target::{CheckKind, ExecutionKind, RegistryError, Target, Targets};
