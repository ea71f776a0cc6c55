//! Network utilities for mission control.
#![allow(clippy::uninlined_format_args)]

pub mod probe;

pub use probe::{DEFAULT_PROBE_TIMEOUT, HttpOptions, HttpProbe, PingResp, ProbeError, QueryParams};
