//! Shared building blocks for the mission-control workspace.
/// Polling cadence parsing
pub mod cadence;
/// Retry helpers with exponential backoff
pub mod retries;

pub use cadence::{Cadence, CadenceError};
