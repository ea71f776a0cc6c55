//! Runtime utilities for mission control.

/// Process shutdown handling
pub mod shutdown;
