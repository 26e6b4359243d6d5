#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration for the buzz event bus.
//!
//! This crate provides a single [`Config`] type with a `[bus]` section (read
//! by `buzz-events`) and a `[logging]` section (read by `buzz-telemetry`).
//!
//! # Usage
//!
//! ```rust,no_run
//! use buzz_config::Config;
//!
//! // defaults → buzz.toml (if present) → BUZZ_* env fallbacks
//! let resolved = Config::load(Some(std::path::Path::new("buzz.toml"))).unwrap();
//! println!("bus name: {}", resolved.config.bus.name);
//! ```
//!
//! # Design
//!
//! This crate has **no dependencies on other buzz crates**. Conversion from
//! config sections to domain types happens in the consuming crates behind
//! their `config` feature.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file loading.
pub mod loader;
/// Layered configuration merging.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration from defaults, an optional file and `BUZZ_*`
    /// environment variables.
    ///
    /// See [`loader::load`] for the full algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed or the final
    /// configuration fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(path)
    }

    /// Parse a standalone TOML document.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document is malformed or fails
    /// validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        loader::from_toml_str(content)
    }
}
