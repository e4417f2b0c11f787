//! Command-line arguments and command execution.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use series_assembly::{DatasetDescriptor, SeriesDataService};
use series_protocol::{ExceptionReport, Geometry, ParameterStore, Query, SeriesError};

/// Observation series CLI
#[derive(Parser, Debug)]
#[command(name = "series-cli")]
#[command(about = "Serve observation time series from a YAML dataset catalog")]
pub struct Args {
    /// Dataset catalog (YAML)
    #[arg(long, default_value = "catalog.yaml", env = "SERIES_CATALOG")]
    pub catalog: PathBuf,

    /// Default-parameter configuration (JSON)
    #[arg(long, env = "SERIES_DEFAULTS")]
    pub defaults: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Pretty-print output
    #[arg(long)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Assemble the series of one dataset
    Data {
        /// Dataset id, optionally prefixed with its type (e.g. text_7)
        dataset_id: String,

        /// Request parameters as name=value
        params: Vec<String>,
    },

    /// List datasets matching the filter parameters
    Datasets {
        /// Narrow legacy requests to stationary in-situ quantity datasets
        #[arg(long)]
        legacy: bool,

        /// Request parameters as name=value
        params: Vec<String>,
    },
}

/// Dataset listing entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub id: String,
    pub dataset_type: String,
    pub value_type: String,
    pub mobile: bool,
    pub insitu: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

impl From<&DatasetDescriptor> for DatasetSummary {
    fn from(d: &DatasetDescriptor) -> Self {
        Self {
            id: d.id.clone(),
            dataset_type: d.dataset_type.clone(),
            value_type: d.value_type.clone(),
            mobile: d.mobile,
            insitu: d.insitu,
            geometry: d.geometry.clone(),
            references: d.published_references().map(|r| r.id.clone()).collect(),
        }
    }
}

/// Result of a command: a JSON body or an exception report.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ok(serde_json::Value),
    Failed(ExceptionReport),
}

impl Response {
    pub fn body(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Response::Ok(body) => body.clone(),
            Response::Failed(report) => serde_json::to_value(report)?,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Ok(_))
    }
}

/// Split `name=value` arguments.
pub fn parse_pairs(args: &[String]) -> Result<Vec<(String, String)>> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => bail!("Expected a parameter as name=value, got '{}'", arg),
        })
        .collect()
}

/// Build the request's parameter store.
pub fn build_parameters(args: &[String], defaults: Option<&Path>) -> Result<ParameterStore> {
    let store = ParameterStore::from_pairs(parse_pairs(args)?);
    Ok(match defaults {
        Some(path) => store.with_default_config(path),
        None => store,
    })
}

/// Run a command against the service.
///
/// Series errors become [`Response::Failed`]; only malformed arguments fail.
pub fn execute(
    command: &Command,
    service: &SeriesDataService,
    defaults: Option<&Path>,
) -> Result<Response> {
    let outcome = match command {
        Command::Data { dataset_id, params } => {
            let params = build_parameters(params, defaults)?;
            data(service, dataset_id, params)
        }
        Command::Datasets { legacy, params } => {
            let mut params = build_parameters(params, defaults)?;
            if *legacy {
                params = params.respect_backwards_compatibility();
            }
            datasets(service, params)
        }
    };

    Ok(match outcome {
        Ok(body) => Response::Ok(body),
        Err(e) => {
            warn!(status = e.status_code(), "Request failed: {}", e);
            Response::Failed(e.to_exception())
        }
    })
}

fn data(
    service: &SeriesDataService,
    dataset_id: &str,
    params: ParameterStore,
) -> Result<serde_json::Value, SeriesError> {
    let query = Query::from_parameters(params)?;
    let data = service.get_data(dataset_id, &query)?;
    info!(dataset = %dataset_id, values = data.values.len(), "Served series");
    serde_json::to_value(&data).map_err(|e| SeriesError::data_access(e.to_string()))
}

fn datasets(
    service: &SeriesDataService,
    params: ParameterStore,
) -> Result<serde_json::Value, SeriesError> {
    let query = Query::from_parameters(params)?;
    let summaries: Vec<DatasetSummary> = service
        .find_datasets(&query)?
        .iter()
        .map(DatasetSummary::from)
        .collect();
    serde_json::to_value(&summaries).map_err(|e| SeriesError::data_access(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs(&strings(&["timespan=P1D/now", "bbox=1,2,3,4", "x="])).unwrap();
        assert_eq!(pairs[0], ("timespan".to_string(), "P1D/now".to_string()));
        assert_eq!(pairs[1].1, "1,2,3,4");
        assert_eq!(pairs[2].1, "");
    }

    #[test]
    fn test_parse_pairs_rejects_bare_words() {
        assert!(parse_pairs(&strings(&["expanded"])).is_err());
        assert!(parse_pairs(&strings(&["=value"])).is_err());
    }

    #[test]
    fn test_args_parse_data_command() {
        let args = Args::try_parse_from([
            "series-cli",
            "--catalog",
            "demo.yaml",
            "data",
            "text_7",
            "expanded=true",
        ])
        .unwrap();

        assert_eq!(args.catalog, PathBuf::from("demo.yaml"));
        match args.command {
            Command::Data { dataset_id, params } => {
                assert_eq!(dataset_id, "text_7");
                assert_eq!(params, vec!["expanded=true"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_failed_response_body_is_exception_report() {
        let response = Response::Failed(SeriesError::DatasetNotFound("x".into()).to_exception());
        let body = response.body().unwrap();
        assert_eq!(body["status"], 404);
        assert!(!response.is_success());
    }
}
