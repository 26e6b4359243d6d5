//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override. They are only applied to fields
//! that no config file set.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `BUZZ_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "BUZZ_BUS_NAME",
        field_path: "bus.name",
    },
    EnvMapping {
        var_name: "BUZZ_CATCH_PANICS",
        field_path: "bus.catch_panics",
    },
    EnvMapping {
        var_name: "BUZZ_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "BUZZ_LOG_FORMAT",
        field_path: "logging.format",
    },
];

/// Apply environment variable fallbacks to fields that were **not** set by
/// a config file.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if matches!(sources.get(mapping.field_path), Some(ConfigLayer::File(_))) {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            set_field_from_string(merged, mapping.field_path, val);
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Set a `section.key` field in the TOML tree from a string value.
fn set_field_from_string(root: &mut toml::Value, path: &str, val: &str) {
    let Some((section, key)) = path.split_once('.') else {
        return;
    };
    let Some(table) = root.as_table_mut() else {
        return;
    };

    let section = table
        .entry(section.to_owned())
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));

    if let Some(section) = section.as_table_mut() {
        section.insert(key.to_owned(), coerce_to_toml_value(path, val));
    }
}

/// Attempt to coerce a string env var value to the appropriate TOML type
/// based on the field path.
fn coerce_to_toml_value(path: &str, val: &str) -> toml::Value {
    if path == "bus.catch_panics"
        && let Ok(b) = val.parse::<bool>()
    {
        return toml::Value::Boolean(b);
    }

    toml::Value::String(val.to_owned())
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn defaults() -> toml::Value {
        toml::from_str("[bus]\nname = \"default\"\ncatch_panics = true\n").unwrap()
    }

    #[test]
    fn test_apply_env_fallbacks() {
        let mut merged = defaults();
        let mut sources = FieldSources::new();
        sources.insert("bus.name".to_owned(), ConfigLayer::Defaults);
        let env = make_env(&[("BUZZ_BUS_NAME", "orders"), ("BUZZ_LOG_LEVEL", "debug")]);

        let count = apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(count, 2);
        assert_eq!(merged["bus"]["name"].as_str(), Some("orders"));
        assert_eq!(merged["logging"]["level"].as_str(), Some("debug"));
        assert_eq!(sources.get("bus.name"), Some(&ConfigLayer::Environment));
    }

    #[test]
    fn test_env_fallback_skips_file_values() {
        let mut merged = defaults();
        let mut sources = FieldSources::new();
        sources.insert(
            "bus.name".to_owned(),
            ConfigLayer::File("bus.toml".to_owned()),
        );
        let env = make_env(&[("BUZZ_BUS_NAME", "orders")]);

        let count = apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(count, 0);
        assert_eq!(merged["bus"]["name"].as_str(), Some("default"));
    }

    #[test]
    fn test_boolean_coercion() {
        let mut merged = defaults();
        let mut sources = FieldSources::new();
        let env = make_env(&[("BUZZ_CATCH_PANICS", "false")]);

        apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(merged["bus"]["catch_panics"].as_bool(), Some(false));
    }

    #[test]
    fn test_unparseable_boolean_stays_string() {
        let value = coerce_to_toml_value("bus.catch_panics", "maybe");
        assert_eq!(value.as_str(), Some("maybe"));
    }
}
