use common::types::SourceKind;
use shared_clients::{BigQueryTarget, DbConnectionDetails};
use std::collections::BTreeMap;
use thiserror::Error;

/// Local validation failures. The display text is the verdict message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing Project ID or Dataset ID.")]
    MissingDatasetRef,
    #[error("Missing Service Account JSON.")]
    MissingServiceAccount,
    #[error("Invalid Service Account JSON format.")]
    InvalidServiceAccount,
    #[error("Missing required connection details.")]
    MissingConnectionDetails,
    #[error("Invalid port: {0}.")]
    InvalidPort(String),
}

/// A SOURCE configuration that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    BigQuery(BigQueryTarget),
    SqlServer(DbConnectionDetails),
    Postgres(DbConnectionDetails),
    /// No live test exists for this subtype; holds the name to report.
    Unsupported(String),
}

pub const UNSPECIFIED_SOURCE: &str = "unspecified source";

impl SourceSpec {
    /// Check required fields for `subtype` and build a typed target. Purely
    /// local, nothing here touches the network.
    pub fn parse(
        subtype: Option<&str>,
        config: &BTreeMap<String, String>,
    ) -> Result<Self, ValidationError> {
        let Some(subtype) = subtype.filter(|s| !s.trim().is_empty()) else {
            return Ok(SourceSpec::Unsupported(UNSPECIFIED_SOURCE.to_string()));
        };

        match SourceKind::from_subtype(subtype) {
            SourceKind::BigQuery => parse_bigquery(config).map(SourceSpec::BigQuery),
            SourceKind::SqlServer => parse_db(config).map(SourceSpec::SqlServer),
            SourceKind::Postgres => parse_db(config).map(SourceSpec::Postgres),
            kind @ (SourceKind::Kafka | SourceKind::Api | SourceKind::Other(_)) => {
                Ok(SourceSpec::Unsupported(kind.as_str().to_string()))
            }
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceSpec::BigQuery(_) => SourceKind::BigQuery,
            SourceSpec::SqlServer(_) => SourceKind::SqlServer,
            SourceSpec::Postgres(_) => SourceKind::Postgres,
            SourceSpec::Unsupported(name) => SourceKind::from_subtype(name),
        }
    }
}

/// Value of a field, treating blank strings as absent.
fn field<'a>(config: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    config
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}

fn parse_bigquery(config: &BTreeMap<String, String>) -> Result<BigQueryTarget, ValidationError> {
    let (Some(project_id), Some(dataset_id)) = (field(config, "projectId"), field(config, "datasetId"))
    else {
        return Err(ValidationError::MissingDatasetRef);
    };
    let service_account_json =
        field(config, "serviceAccountJson").ok_or(ValidationError::MissingServiceAccount)?;
    serde_json::from_str::<serde_json::Value>(service_account_json)
        .map_err(|_| ValidationError::InvalidServiceAccount)?;

    Ok(BigQueryTarget {
        project_id: project_id.trim().to_string(),
        dataset_id: dataset_id.trim().to_string(),
        service_account_json: service_account_json.to_string(),
    })
}

fn parse_db(config: &BTreeMap<String, String>) -> Result<DbConnectionDetails, ValidationError> {
    let (Some(host), Some(port), Some(database), Some(username), Some(password)) = (
        field(config, "host"),
        field(config, "port"),
        field(config, "database"),
        field(config, "username"),
        field(config, "password"),
    ) else {
        return Err(ValidationError::MissingConnectionDetails);
    };
    let port = port
        .trim()
        .parse::<u16>()
        .map_err(|_| ValidationError::InvalidPort(port.to_string()))?;

    Ok(DbConnectionDetails {
        host: host.trim().to_string(),
        port,
        database: database.trim().to_string(),
        username: username.to_string(),
        password: password.to_string(),
    })
}
