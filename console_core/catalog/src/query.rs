//! SQL lab: a mock query runner plus AI-backed SQL generation and error
//! explanation. No SQL is ever executed.

use crate::{Getter, MemoryCatalog};
use common::sequence::{RequestSequencer, RequestTicket};
use serde::Serialize;
use serde_json::{json, Map, Value};
use shared_clients::genai::{GenerativeModel, ModelTier};
use std::sync::Arc;
use std::time::Instant;

pub const MOCK_QUERY_ERROR: &str =
    "Syntax error at or near 'ERROR': column 'undefined_col' does not exist";
pub const EXPLAIN_FAILED: &str = "Could not diagnose error.";
pub const EXPLAIN_EMPTY: &str = "No explanation found.";
pub const SQL_GENERATION_FAILED: &str = "-- Error generating SQL. Please check API Key or Prompt.";
pub const SQL_GENERATION_EMPTY: &str = "-- Could not generate SQL";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Rows(QueryResult),
    Failed { error: String, explanation: String },
}

#[derive(Clone)]
pub struct QueryLab {
    catalog: MemoryCatalog,
    model: Arc<dyn GenerativeModel>,
}

impl QueryLab {
    pub fn new(catalog: MemoryCatalog, model: Arc<dyn GenerativeModel>) -> Self {
        Self { catalog, model }
    }

    /// Any statement mentioning "error" (in any case) fails with a fixed
    /// message and one explanation request; everything else returns the
    /// same two rows.
    pub async fn run_query(&self, sql: &str) -> QueryOutcome {
        let started = Instant::now();
        if sql.to_lowercase().contains("error") {
            let explanation = self.explain_error(sql, MOCK_QUERY_ERROR).await;
            return QueryOutcome::Failed {
                error: MOCK_QUERY_ERROR.to_string(),
                explanation,
            };
        }

        QueryOutcome::Rows(QueryResult {
            columns: vec!["id".into(), "result".into(), "rows_affected".into()],
            rows: vec![mock_row(1, "Success", 42), mock_row(2, "Pending", 0)],
            execution_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    pub async fn explain_error(&self, sql: &str, error_message: &str) -> String {
        let prompt = format!(
            "The following SQL query failed:\n{sql}\n\nError Message:\n{error_message}\n\n\
             Explain why it failed and suggest a fix concisely."
        );
        match self.model.generate_text(ModelTier::Fast, &prompt).await {
            Ok(text) if text.trim().is_empty() => EXPLAIN_EMPTY.to_string(),
            Ok(text) => text,
            Err(e) => {
                log::error!("error explanation failed: {e}");
                EXPLAIN_FAILED.to_string()
            }
        }
    }

    /// SQL for a natural-language request against the catalog's tables.
    /// A blank prompt is ignored and yields `None`.
    pub async fn generate_sql(&self, prompt: &str) -> Option<String> {
        if prompt.trim().is_empty() {
            return None;
        }

        let request = format!(
            "You are an expert SQL Data Engineer.\n\n\
             Context Schemas:\n{}\n\n\
             User Request: \"{prompt}\"\n\n\
             Task: Generate a valid ANSI SQL query to answer the user request based on the schema provided.\n\
             Return ONLY the SQL code. Do not use markdown formatting like ```sql. Just the raw string.",
            self.catalog.schema_context()
        );

        let sql = match self.model.generate_text(ModelTier::Fast, &request).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    SQL_GENERATION_EMPTY.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                log::error!("sql generation failed: {e}");
                SQL_GENERATION_FAILED.to_string()
            }
        };
        Some(sql)
    }
}

fn mock_row(id: u64, result: &str, rows_affected: u64) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("id".into(), json!(id));
    row.insert("result".into(), json!(result));
    row.insert("rows_affected".into(), json!(rows_affected));
    row
}

/// Per-editor state of the SQL lab. Only the outcome of the most recent run
/// is kept; a run that finishes after a newer one started is dropped.
#[derive(Debug, Default)]
pub struct QueryLabSession {
    sequencer: RequestSequencer,
    outcome: Option<QueryOutcome>,
}

impl QueryLabSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the previous outcome and tags the new run.
    pub fn begin_run(&mut self) -> RequestTicket {
        self.outcome = None;
        self.sequencer.issue()
    }

    pub fn complete_run(&mut self, ticket: RequestTicket, outcome: QueryOutcome) -> bool {
        if !self.sequencer.is_current(ticket) {
            log::debug!("discarding stale query outcome #{}", ticket.value());
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    pub fn outcome(&self) -> Option<&QueryOutcome> {
        self.outcome.as_ref()
    }
}
