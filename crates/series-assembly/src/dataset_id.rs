//! Dataset ids carrying their type tag, e.g. `measurement_42`.

use std::fmt;

/// Tag assumed for ids without a recognized prefix.
pub const DEFAULT_DATASET_TYPE: &str = "measurement";

/// Tags recognized as id prefixes.
pub const KNOWN_DATASET_TYPES: [&str; 4] = ["measurement", "quantity", "text", "record"];

/// A dataset id split into type tag and raw id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetId {
    pub dataset_type: String,
    pub raw_id: String,
}

impl DatasetId {
    pub fn new(dataset_type: impl Into<String>, raw_id: impl Into<String>) -> Self {
        Self {
            dataset_type: dataset_type.into(),
            raw_id: raw_id.into(),
        }
    }

    /// Split `<type>_<id>`; ids without a known type prefix get the default tag.
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        if let Some((prefix, raw)) = id.split_once('_') {
            let prefix = prefix.to_lowercase();
            if !raw.is_empty() && KNOWN_DATASET_TYPES.contains(&prefix.as_str()) {
                return Self::new(prefix, raw);
            }
        }
        Self::new(DEFAULT_DATASET_TYPE, id)
    }

    /// True when `id` starts with a known type tag, e.g. `measurement_42`.
    pub fn has_type_prefix(id: &str) -> bool {
        Self::parse(id).raw_id != id.trim()
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.dataset_type, self.raw_id)
    }
}

/// Type tag of an id, e.g. `text` for `text_7`.
pub fn extract_type(id: &str) -> String {
    DatasetId::parse(id).dataset_type
}

/// Raw id without the type prefix, e.g. `7` for `text_7`.
pub fn extract_id(id: &str) -> String {
    DatasetId::parse(id).raw_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_id() {
        let id = DatasetId::parse("text_7");
        assert_eq!(id.dataset_type, "text");
        assert_eq!(id.raw_id, "7");
        assert_eq!(id.to_string(), "text_7");
    }

    #[test]
    fn test_has_type_prefix() {
        assert!(DatasetId::has_type_prefix("measurement_42"));
        assert!(DatasetId::has_type_prefix("Text_7"));
        assert!(!DatasetId::has_type_prefix("42"));
        assert!(!DatasetId::has_type_prefix("gauge_muenster"));
    }

    #[test]
    fn test_parse_untyped_id() {
        assert_eq!(DatasetId::parse("42"), DatasetId::new("measurement", "42"));
    }

    #[test]
    fn test_unknown_prefix_is_part_of_id() {
        let id = DatasetId::parse("station_north");
        assert_eq!(id.dataset_type, "measurement");
        assert_eq!(id.raw_id, "station_north");
    }

    #[test]
    fn test_prefix_case_insensitive() {
        assert_eq!(extract_type("RECORD_3"), "record");
        assert_eq!(extract_id("RECORD_3"), "3");
    }

    #[test]
    fn test_raw_id_may_contain_underscores() {
        assert_eq!(extract_id("measurement_a_b"), "a_b");
    }
}
