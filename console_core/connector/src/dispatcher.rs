use crate::source::SourceSpec;
use common::types::{ConnectionTestResult, NodeType, SourceKind};
use shared_clients::{
    BigQueryProbe, BigQueryTarget, ConnectionProbe, DatabaseAdapterError, DbConnectionDetails,
    PostgresProbe, SqlServerProbe,
};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinError;

pub const NON_SOURCE_VERIFIED: &str = "Connection verified.";

type DbProbe = Arc<dyn ConnectionProbe<DbConnectionDetails>>;
type BigQueryProbeRef = Arc<dyn ConnectionProbe<BigQueryTarget>>;

/// Routes a connection test to the probe for the node's subtype. Every
/// outcome, including panics inside a probe, ends up as a verdict.
#[derive(Clone)]
pub struct ConnectionDispatcher {
    bigquery: BigQueryProbeRef,
    sqlserver: DbProbe,
    postgres: DbProbe,
}

impl Default for ConnectionDispatcher {
    fn default() -> Self {
        Self {
            bigquery: Arc::new(BigQueryProbe::default()),
            sqlserver: Arc::new(SqlServerProbe),
            postgres: Arc::new(PostgresProbe),
        }
    }
}

impl ConnectionDispatcher {
    pub fn new(bigquery: BigQueryProbeRef, sqlserver: DbProbe, postgres: DbProbe) -> Self {
        Self {
            bigquery,
            sqlserver,
            postgres,
        }
    }

    pub fn with_bigquery_probe(mut self, probe: BigQueryProbeRef) -> Self {
        self.bigquery = probe;
        self
    }

    pub fn with_sqlserver_probe(mut self, probe: DbProbe) -> Self {
        self.sqlserver = probe;
        self
    }

    pub fn with_postgres_probe(mut self, probe: DbProbe) -> Self {
        self.postgres = probe;
        self
    }

    pub async fn test_connection(
        &self,
        node_type: NodeType,
        subtype: Option<&str>,
        config: &BTreeMap<String, String>,
    ) -> ConnectionTestResult {
        if node_type != NodeType::Source {
            return ConnectionTestResult::ok(NON_SOURCE_VERIFIED);
        }

        let spec = match SourceSpec::parse(subtype, config) {
            Ok(spec) => spec,
            Err(e) => {
                log::debug!("connection test rejected locally: {e}");
                return ConnectionTestResult::failed(e.to_string());
            }
        };

        let kind = spec.kind();
        let outcome = match spec {
            SourceSpec::Unsupported(name) => {
                return ConnectionTestResult::ok(format!(
                    "Connection test for {name} is not fully implemented, but the request was received."
                ));
            }
            SourceSpec::BigQuery(target) => run_probe(self.bigquery.clone(), target).await,
            SourceSpec::SqlServer(details) => run_probe(self.sqlserver.clone(), details).await,
            SourceSpec::Postgres(details) => run_probe(self.postgres.clone(), details).await,
        };

        match outcome {
            Ok(Ok(())) => {
                log::info!("{} connection test succeeded", kind.label());
                ConnectionTestResult::ok(success_message(&kind))
            }
            Ok(Err(e)) => {
                log::info!("{} connection test failed: {e}", kind.label());
                ConnectionTestResult::failed(format!(
                    "{} connection failed: {}",
                    kind.label(),
                    e.upstream_message()
                ))
            }
            Err(join_err) => {
                let description = describe_join_error(join_err);
                log::error!("{} connection probe crashed: {description}", kind.label());
                ConnectionTestResult::failed(format!("Unexpected error: {description}"))
            }
        }
    }
}

/// Runs the probe on its own task so a panic is contained and observed as a
/// `JoinError` rather than unwinding into the caller.
async fn run_probe<T>(
    probe: Arc<dyn ConnectionProbe<T>>,
    target: T,
) -> Result<Result<(), DatabaseAdapterError>, JoinError>
where
    T: Send + Sync + 'static,
{
    tokio::spawn(async move { probe.probe(&target).await }).await
}

fn success_message(kind: &SourceKind) -> String {
    match kind {
        SourceKind::BigQuery => {
            "Successfully connected to BigQuery dataset (Backend Verified).".to_string()
        }
        other => format!("Successfully connected to {} (Backend Verified).", other.label()),
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => message.to_string(),
            Err(_) => "probe panicked".to_string(),
        },
    }
}
