//! Telemetry: structured logging.
//!
//! Permission decisions emit `tracing` events and increment `metrics`
//! counters; this module installs the subscriber that renders the events.
//! Counters are recorded through the `metrics` facade and are no-ops until
//! the host application installs a recorder.
//!
//! # Example
//!
//! ```rust,no_run
//! use gatehouse_core::telemetry::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::with_level("debug")).expect("Failed to initialize logging");
//! ```

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingConfig, SpanEventConfig};
