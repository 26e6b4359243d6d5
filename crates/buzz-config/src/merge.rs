//! Deep merge of TOML values with per-field source tracking.
//!
//! The merge operates on raw [`toml::Value`] trees rather than deserialized
//! structs. This correctly handles "absent vs default": a missing key in a
//! TOML table will not override the base layer.

use std::collections::HashMap;

/// Which configuration layer a value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in defaults (`defaults.toml`).
    Defaults,
    /// A config file passed to the loader.
    File(String),
    /// Environment variable fallback.
    Environment,
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::File(path) => write!(f, "file ({path})"),
            Self::Environment => write!(f, "environment variable"),
        }
    }
}

/// Tracks which layer set each field's value.
pub type FieldSources = HashMap<String, ConfigLayer>;

/// Deep-merge `overlay` into `base`, recording which layer set each leaf
/// field. `prefix` is the dotted path prefix (e.g. `"bus"`).
///
/// Tables merge per field; scalars and arrays from the overlay replace the
/// base value.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join_path(prefix, key);
                if let Some(base_val) = base_table.get_mut(key) {
                    if overlay_val.is_table() {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    } else {
                        *base_val = overlay_val.clone();
                        sources.insert(path, layer.clone());
                    }
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_leaves(overlay_val, &path, layer, sources);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            sources.insert(prefix.to_owned(), layer.clone());
        },
    }
}

/// Walk a value tree and record all leaf paths with their source layer.
pub fn record_leaves(
    val: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &join_path(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer.clone());
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    fn merge(base: &mut toml::Value, overlay: &toml::Value) -> FieldSources {
        let mut sources = FieldSources::new();
        deep_merge_tracking(base, overlay, "", &ConfigLayer::Environment, &mut sources);
        sources
    }

    #[test]
    fn test_deep_merge_replaces_scalars_and_keeps_siblings() {
        let mut base = parse("[bus]\nname = \"a\"\ncatch_panics = true\n");
        let sources = merge(&mut base, &parse("[bus]\nname = \"b\"\n"));

        assert_eq!(base["bus"]["name"].as_str(), Some("b"));
        assert_eq!(base["bus"]["catch_panics"].as_bool(), Some(true));
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn test_deep_merge_replaces_arrays() {
        let mut base = parse("[logging]\ndirectives = [\"a=debug\", \"b=warn\"]\n");
        let sources = merge(&mut base, &parse("[logging]\ndirectives = [\"c=trace\"]\n"));

        let directives = base["logging"]["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(
            sources.get("logging.directives"),
            Some(&ConfigLayer::Environment)
        );
    }

    #[test]
    fn test_tracking_records_only_overlay_leaves() {
        let mut base = parse("[bus]\nname = \"a\"\ncatch_panics = true\n");
        let mut sources = FieldSources::new();
        let layer = ConfigLayer::File("bus.toml".to_owned());

        deep_merge_tracking(
            &mut base,
            &parse("[bus]\ncatch_panics = false\n[logging]\nlevel = \"debug\"\n"),
            "",
            &layer,
            &mut sources,
        );

        assert_eq!(sources.get("bus.catch_panics"), Some(&layer));
        assert_eq!(sources.get("logging.level"), Some(&layer));
        assert!(!sources.contains_key("bus.name"));
    }

    #[test]
    fn test_layer_display() {
        assert_eq!(ConfigLayer::Defaults.to_string(), "defaults");
        assert_eq!(
            ConfigLayer::File("/tmp/x.toml".to_owned()).to_string(),
            "file (/tmp/x.toml)"
        );
    }
}
