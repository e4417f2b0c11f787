//! Process-wide cache of default parameter configurations.
//!
//! A default-config file is a flat JSON object mapping parameter names to
//! literal values, for example:
//!
//! ```json
//! { "locale": "de", "width": 1024, "valueTypes": ["quantity", "text"] }
//! ```
//!
//! Each distinct path is read at most once; the parsed result is shared for
//! the lifetime of the process and never invalidated.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde_json::Value;

/// Parameter defaults keyed by lower-cased name.
pub type DefaultParameters = BTreeMap<String, Vec<Value>>;

static DEFAULT_CONFIG_CACHE: Lazy<RwLock<HashMap<PathBuf, Arc<DefaultParameters>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Get the defaults stored at `path`, reading the file on first use.
///
/// Unreadable or malformed files contribute no defaults.
pub fn load_default_config(path: &Path) -> Arc<DefaultParameters> {
    if let Ok(cache) = DEFAULT_CONFIG_CACHE.read() {
        if let Some(defaults) = cache.get(path) {
            tracing::debug!(path = %path.display(), "Default config cache hit");
            return Arc::clone(defaults);
        }
    }

    // Concurrent first loads of the same path produce equal values; the first insert wins.
    let loaded = Arc::new(read_default_config(path));
    match DEFAULT_CONFIG_CACHE.write() {
        Ok(mut cache) => Arc::clone(cache.entry(path.to_path_buf()).or_insert(loaded)),
        Err(_) => loaded,
    }
}

/// Number of cached default configurations.
pub fn cached_config_count() -> usize {
    DEFAULT_CONFIG_CACHE.read().map(|c| c.len()).unwrap_or(0)
}

fn read_default_config(path: &Path) -> DefaultParameters {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                "Could not read default config {}, using no defaults: {}",
                path.display(),
                e
            );
            return DefaultParameters::new();
        }
    };

    match serde_json::from_str::<serde_json::Map<String, Value>>(&content) {
        Ok(object) => {
            let defaults = flatten_object(&object);
            tracing::info!("Loaded {} parameter defaults from {}", defaults.len(), path.display());
            defaults
        }
        Err(e) => {
            tracing::warn!(
                "Default config {} is not a JSON object, using no defaults: {}",
                path.display(),
                e
            );
            DefaultParameters::new()
        }
    }
}

/// Turn a JSON object into multi-valued parameters; arrays become multiple values.
pub(crate) fn flatten_object(object: &serde_json::Map<String, Value>) -> DefaultParameters {
    object
        .iter()
        .map(|(name, value)| {
            let values = match value {
                Value::Array(items) => items.clone(),
                other => vec![other.clone()],
            };
            (name.trim().to_lowercase(), values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_default_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Locale": "de", "width": 1024, "valueTypes": ["quantity", "text"]}}"#)
            .unwrap();

        let defaults = load_default_config(file.path());
        assert_eq!(defaults.get("locale"), Some(&vec![Value::from("de")]));
        assert_eq!(defaults.get("width"), Some(&vec![Value::from(1024)]));
        assert_eq!(defaults.get("valuetypes").map(Vec::len), Some(2));
    }

    #[test]
    fn test_default_config_read_once_per_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"locale": "fr"}}"#).unwrap();

        let first = load_default_config(file.path());

        // Later edits are not observed; the first read is kept.
        std::fs::write(file.path(), r#"{"locale": "es"}"#).unwrap();
        let second = load_default_config(file.path());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get("locale"), Some(&vec![Value::from("fr")]));
    }

    #[test]
    fn test_missing_default_config_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = load_default_config(&dir.path().join("absent.json"));
        assert!(defaults.is_empty());
    }

    #[test]
    fn test_malformed_default_config_is_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        assert!(load_default_config(file.path()).is_empty());
    }
}
