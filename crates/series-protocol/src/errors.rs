//! Error types for series requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A request parameter that could not be parsed or is semantically invalid.
///
/// Carries the offending parameter name and one or more hints telling the
/// client how to fix the request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid parameter '{parameter}': {}", .hints.join(" "))]
pub struct InvalidParameter {
    /// Name of the offending parameter (lower-cased).
    pub parameter: String,

    /// Human-readable hints.
    pub hints: Vec<String>,
}

impl InvalidParameter {
    /// Create an error with a single hint.
    pub fn new(parameter: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            hints: vec![hint.into()],
        }
    }

    /// Append another hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

/// Errors that can occur while resolving a request or assembling series data.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// Malformed or semantically invalid parameter value.
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameter),

    /// No assembler is registered for the dataset type tag.
    #[error("Unknown dataset type: {0}")]
    UnknownDatasetType(String),

    /// The requested dataset does not exist or is not published.
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// The observation or descriptor source failed.
    #[error("Data access error: {0}")]
    DataAccessFailure(String),
}

impl SeriesError {
    /// Shorthand for a data access failure.
    pub fn data_access(msg: impl Into<String>) -> Self {
        Self::DataAccessFailure(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            SeriesError::InvalidParameter(_) => 400,
            SeriesError::UnknownDatasetType(_) => 404,
            SeriesError::DatasetNotFound(_) => 404,
            SeriesError::DataAccessFailure(_) => 500,
        }
    }

    /// Convert to a serializable exception report.
    pub fn to_exception(&self) -> ExceptionReport {
        let hints = match self {
            SeriesError::InvalidParameter(e) => e.hints.clone(),
            _ => Vec::new(),
        };
        let error = match self {
            SeriesError::InvalidParameter(_) => "Bad Request",
            SeriesError::UnknownDatasetType(_) | SeriesError::DatasetNotFound(_) => "Not Found",
            SeriesError::DataAccessFailure(_) => "Internal Server Error",
        };
        ExceptionReport {
            status: self.status_code(),
            error: error.to_string(),
            message: self.to_string(),
            hints,
        }
    }
}

/// Error body handed to the response layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExceptionReport {
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let invalid = InvalidParameter::new("limit", "Must be an integer!");
        assert_eq!(SeriesError::from(invalid).status_code(), 400);
        assert_eq!(SeriesError::UnknownDatasetType("foo".to_string()).status_code(), 404);
        assert_eq!(SeriesError::DatasetNotFound("7".to_string()).status_code(), 404);
        assert_eq!(SeriesError::data_access("db down").status_code(), 500);
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = InvalidParameter::new("width", "Must be an integer!").with_hint("Was: 'abc'");
        let display = err.to_string();
        assert!(display.contains("width"));
        assert!(display.contains("Must be an integer! Was: 'abc'"));
    }

    #[test]
    fn test_exception_report_carries_hints() {
        let err: SeriesError = InvalidParameter::new("bbox", "Check the format.").into();
        let exc = err.to_exception();

        assert_eq!(exc.status, 400);
        assert_eq!(exc.error, "Bad Request");
        assert_eq!(exc.hints, vec!["Check the format.".to_string()]);
    }

    #[test]
    fn test_exception_report_serialization_skips_empty_hints() {
        let exc = SeriesError::UnknownDatasetType("flux".to_string()).to_exception();
        let json = serde_json::to_value(&exc).unwrap();

        assert_eq!(json["status"], 404);
        assert!(json.get("hints").is_none());
        assert!(json["message"].as_str().unwrap().contains("flux"));
    }
}
