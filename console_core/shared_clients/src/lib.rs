pub mod bigquery;
pub mod genai;
pub mod postgres;
pub mod sqlserver;

use async_trait::async_trait;
use common::error::diagnostics::DiagnosticMessage;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

pub use bigquery::BigQueryProbe;
pub use postgres::PostgresProbe;
pub use sqlserver::SqlServerProbe;

#[derive(Debug, Error)]
pub enum DatabaseAdapterError {
    #[error("invalid connection details: {context}")]
    InvalidConnectionError { context: DiagnosticMessage },
    #[error("authentication failed: {context}")]
    AuthenticationError { context: DiagnosticMessage },
    #[error("unexpected database error: {context}")]
    UnexpectedError { context: DiagnosticMessage },
    #[error("I/O error: {context}")]
    IoError {
        context: DiagnosticMessage,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {context}")]
    ConfigError { context: DiagnosticMessage },
}

impl DatabaseAdapterError {
    #[track_caller]
    pub fn invalid_connection(message: impl Into<String>) -> Self {
        Self::InvalidConnectionError {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationError {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedError {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    /// The message reported by the driver, without the call-site suffix.
    pub fn upstream_message(&self) -> &str {
        match self {
            Self::InvalidConnectionError { context }
            | Self::AuthenticationError { context }
            | Self::UnexpectedError { context }
            | Self::IoError { context, .. }
            | Self::ConfigError { context } => context.message(),
        }
    }
}

impl From<std::io::Error> for DatabaseAdapterError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        let message = err.to_string();
        DatabaseAdapterError::IoError {
            context: DiagnosticMessage::new(message),
            source: err,
        }
    }
}

/// Host/port/credentials shared by the SQL Server and PostgreSQL probes.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConnectionDetails {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Debug for DbConnectionDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnectionDetails")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Dataset reference plus the raw service-account key it is accessed with.
#[derive(Clone, PartialEq, Eq)]
pub struct BigQueryTarget {
    pub project_id: String,
    pub dataset_id: String,
    pub service_account_json: String,
}

impl Debug for BigQueryTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigQueryTarget")
            .field("project_id", &self.project_id)
            .field("dataset_id", &self.dataset_id)
            .field("service_account_json", &"<redacted>")
            .finish()
    }
}

/// Attempts a live connection against an external store. Implementations
/// must release every handle they open before returning.
#[async_trait]
pub trait ConnectionProbe<T>: Send + Sync
where
    T: Send + Sync,
{
    async fn probe(&self, target: &T) -> Result<(), DatabaseAdapterError>;
}
