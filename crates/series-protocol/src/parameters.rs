//! Case-insensitive, multi-valued request parameter store.
//!
//! A [`ParameterStore`] holds every request parameter as an ordered list of
//! JSON literals (string, number, bool or object) keyed by the lower-cased
//! parameter name. Typed accessors convert on read; nothing is cached.
//!
//! # Parse errors
//!
//! Typed accessors return [`InvalidParameter`] when a value cannot be
//! converted. A caller may install a parse-error handle instead; the handle
//! receives the error and the accessor falls back to the caller's default.
//!
//! # Example
//!
//! ```rust
//! use series_protocol::ParameterStore;
//!
//! let store = ParameterStore::from_pairs([("Limit", "10"), ("expanded", "true")]);
//! assert_eq!(store.get_int("limit", -1).unwrap(), 10);
//! assert!(store.get_bool("EXPANDED", false).unwrap());
//!
//! let narrowed = store.with_replaced("limit", ["5"]);
//! assert_eq!(narrowed.get("limit").as_deref(), Some("5"));
//! assert_eq!(store.get("limit").as_deref(), Some("10"));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::defaults::{self, DefaultParameters};
use crate::errors::InvalidParameter;
use crate::names::{self, hints};

/// Callback receiving parse errors instead of having them propagate.
pub type ParseErrorHandle = Arc<dyn Fn(&str, &InvalidParameter) + Send + Sync>;

/// Immutable parameter map; derivations return new instances.
#[derive(Clone, Default)]
pub struct ParameterStore {
    values: BTreeMap<String, Vec<Value>>,
    error_handle: Option<ParseErrorHandle>,
}

impl fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterStore")
            .field("values", &self.values)
            .field("error_handle", &self.error_handle.is_some())
            .finish()
    }
}

impl PartialEq for ParameterStore {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ParameterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from name/value pairs (e.g. a decoded query string).
    ///
    /// Repeated names accumulate values in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut values: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for (name, value) in pairs {
            values
                .entry(normalize(name.as_ref()))
                .or_default()
                .push(Value::String(value.as_ref().to_string()));
        }
        Self {
            values,
            error_handle: None,
        }
    }

    /// Build from a multi-valued map, as handed over by the HTTP layer.
    pub fn from_multi_map<I, K, VS, V>(map: I) -> Self
    where
        I: IntoIterator<Item = (K, VS)>,
        K: AsRef<str>,
        VS: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        Self::from_pairs(map.into_iter().flat_map(|(name, vs)| {
            let name = name.as_ref().to_string();
            vs.into_iter()
                .map(move |v| (name.clone(), v.as_ref().to_string()))
        }))
    }

    /// Build from a JSON object (e.g. a POST body). Arrays become multiple values.
    pub fn from_json_object(object: &serde_json::Map<String, Value>) -> Self {
        Self {
            values: defaults::flatten_object(object),
            error_handle: None,
        }
    }

    /// Add defaults for every name not already present.
    pub fn with_defaults(mut self, defaults: &DefaultParameters) -> Self {
        for (name, values) in defaults.iter() {
            self.values
                .entry(name.clone())
                .or_insert_with(|| values.clone());
        }
        self
    }

    /// Add defaults read from a JSON default-config file.
    ///
    /// The file is read at most once per path for the lifetime of the process.
    pub fn with_default_config(self, path: impl AsRef<Path>) -> Self {
        let defaults = defaults::load_default_config(path.as_ref());
        self.with_defaults(&defaults)
    }

    /// Install a handle receiving parse errors instead of propagating them.
    pub fn with_parse_error_handle<F>(mut self, handle: F) -> Self
    where
        F: Fn(&str, &InvalidParameter) + Send + Sync + 'static,
    {
        self.error_handle = Some(Arc::new(handle));
        self
    }

    /// Copy of this store whose accessors propagate parse errors.
    pub fn without_parse_error_handle(&self) -> Self {
        Self {
            error_handle: None,
            ..self.clone()
        }
    }

    /// Check whether a parameter is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&normalize(name))
    }

    /// Lower-cased names of all present parameters.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw literals for a parameter.
    pub fn values(&self, name: &str) -> &[Value] {
        self.values
            .get(&normalize(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All values joined as comma-separated text.
    pub fn get(&self, name: &str) -> Option<String> {
        self.values.get(&normalize(name)).map(|values| {
            values
                .iter()
                .map(literal_text)
                .collect::<Vec<_>>()
                .join(",")
        })
    }

    /// Like [`get`](Self::get) with a fallback.
    pub fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    /// Comma-separated values as a lower-cased set; empty items are dropped.
    pub fn get_csv_set(&self, name: &str) -> BTreeSet<String> {
        self.get(name)
            .map(|joined| {
                joined
                    .split(',')
                    .map(|item| item.trim().to_lowercase())
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse a parameter as integer.
    pub fn get_int(&self, name: &str, default: i64) -> Result<i64, InvalidParameter> {
        let Some(raw) = self.get(name) else {
            return Ok(default);
        };
        match raw.trim().parse::<i64>() {
            Ok(value) => Ok(value),
            Err(_) => {
                let err = InvalidParameter::new(normalize(name), hints::MUST_BE_INTEGER)
                    .with_hint(format!("Was: '{}'.", raw));
                self.report(err).map(|_| default)
            }
        }
    }

    /// Parse a parameter as boolean (`true`/`false`, any case).
    pub fn get_bool(&self, name: &str, default: bool) -> Result<bool, InvalidParameter> {
        self.get_optional_bool(name).map(|v| v.unwrap_or(default))
    }

    /// Parse a parameter as boolean, `None` when absent.
    pub fn get_optional_bool(&self, name: &str) -> Result<Option<bool>, InvalidParameter> {
        let Some(raw) = self.get(name) else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(Some(true))
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(Some(false))
        } else {
            let err = InvalidParameter::new(normalize(name), hints::MUST_BE_BOOLEAN)
                .with_hint(format!("Was: '{}'.", raw));
            self.report(err).map(|_| None)
        }
    }

    /// Decode a parameter as JSON into `T`.
    ///
    /// Object literals decode directly; anything else decodes from the joined text.
    pub fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, InvalidParameter> {
        let values = self.values(name);
        if values.is_empty() {
            return Ok(None);
        }

        let decoded = match values {
            [single @ (Value::Object(_) | Value::Array(_))] => {
                serde_json::from_value::<T>(single.clone())
            }
            _ => {
                let joined = values.iter().map(literal_text).collect::<Vec<_>>().join(",");
                serde_json::from_str::<T>(&joined)
            }
        };

        match decoded {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let err = InvalidParameter::new(normalize(name), hints::MUST_BE_JSON)
                    .with_hint(e.to_string());
                self.report(err).map(|_| None)
            }
        }
    }

    /// New store without `name`.
    pub fn with_removed(&self, name: &str) -> Self {
        let mut derived = self.clone();
        derived.values.remove(&normalize(name));
        derived
    }

    /// New store with `values` appended to `name`.
    pub fn with_extended<I, V>(&self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut derived = self.clone();
        derived
            .values
            .entry(normalize(name))
            .or_default()
            .extend(values.into_iter().map(Into::into));
        derived
    }

    /// New store where `name` holds exactly `values`.
    pub fn with_replaced<I, V>(&self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut derived = self.clone();
        derived.values.insert(
            normalize(name),
            values.into_iter().map(Into::into).collect(),
        );
        derived
    }

    /// True when the request sets neither a platform type nor a value type filter.
    pub fn is_backwards_compatible(&self) -> bool {
        self.get_csv_set(names::PLATFORM_TYPES).is_empty()
            && self.get_csv_set(names::VALUE_TYPES).is_empty()
            && self.get_csv_set(names::DATASET_TYPES).is_empty()
    }

    /// Narrow a legacy request to stationary in-situ quantity datasets.
    ///
    /// Requests carrying type filters are returned unchanged.
    pub fn respect_backwards_compatibility(&self) -> Self {
        if !self.is_backwards_compatible() {
            return self.clone();
        }
        tracing::debug!("Narrowing legacy request to stationary insitu quantity datasets");
        self.with_replaced(names::PLATFORM_TYPES, ["stationary", "insitu"])
            .with_replaced(names::VALUE_TYPES, ["quantity"])
            .with_removed(names::HREF_BASE)
    }

    /// Hand `err` to the installed parse-error handle, or return it when none is installed.
    pub fn report(&self, err: InvalidParameter) -> Result<(), InvalidParameter> {
        match &self.error_handle {
            Some(handle) => {
                handle(&err.parameter, &err);
                Ok(())
            }
            None => Err(err),
        }
    }
}
