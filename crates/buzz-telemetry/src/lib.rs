//! Buzz Telemetry - logging setup for the buzz event bus.
//!
//! The bus itself only emits `tracing` events. This crate installs the
//! global subscriber that renders them:
//! - `EnvFilter` built from a level plus per-crate directives
//! - pretty, compact, JSON or full output
//! - stdout, stderr or a rolling log file
//!
//! # Example
//!
//! ```rust,no_run
//! use buzz_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), buzz_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("buzz_events=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging,
};
