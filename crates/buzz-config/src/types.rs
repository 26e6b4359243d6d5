//! Configuration types for the buzz event bus.
//!
//! All types in this module are self-contained with no dependencies on other
//! buzz crates. Every struct implements [`Default`] so that a bare
//! `[section]` header in TOML produces a working configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event bus behaviour.
    pub bus: BusSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// BusSection
// ---------------------------------------------------------------------------

/// Event bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSection {
    /// Label attached to every log record the bus emits. Useful when a
    /// process runs more than one bus.
    pub name: String,
    /// Convert listener panics into reported failures instead of unwinding
    /// through `emit`.
    pub catch_panics: bool,
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            name: "default".to_owned(),
            catch_panics: true,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"` (human-friendly), `"compact"` (one-line),
    /// `"json"` (structured), or `"full"` (verbose).
    pub format: String,
    /// Per-crate tracing directives (e.g. `["buzz_events=trace"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sections_use_defaults() {
        let config: Config = toml::from_str("[bus]\n[logging]\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str("[bus]\nname = \"orders\"\n").unwrap();
        assert_eq!(config.bus.name, "orders");
        assert!(config.bus.catch_panics);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_json_roundtrip_shape() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["bus"]["name"], "default");
        assert_eq!(json["logging"]["format"], "pretty");
    }
}
