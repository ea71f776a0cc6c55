//! Time-series metrics sink for mission control.
#![allow(clippy::uninlined_format_args)]

/// Data points and line protocol
pub mod point;
/// Sink trait and writers
pub mod writer;

pub use point::{FieldValue, Point};
pub use writer::{DEFAULT_WRITE_TIMEOUT, InfluxWriter, LogSink, MetricsSink};
