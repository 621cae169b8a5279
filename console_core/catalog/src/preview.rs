use common::types::CatalogTable;
use serde_json::{json, Map, Value};
use shared_clients::genai::{GenerativeModel, ModelTier};
use std::sync::Arc;

pub const PREVIEW_ROWS: usize = 5;

pub type PreviewRecord = Map<String, Value>;

/// Synthesises sample rows for a table. Best effort: any failure yields no
/// rows.
#[derive(Clone)]
pub struct PreviewService {
    model: Arc<dyn GenerativeModel>,
}

impl PreviewService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub async fn load_preview(&self, table: &CatalogTable) -> Vec<PreviewRecord> {
        let prompt = format!(
            "Generate {PREVIEW_ROWS} rows of realistic dummy data for a database table named \"{}\" in JSON format. \
             Return a JSON array of objects. Do not wrap in markdown code blocks.",
            table.name
        );

        match self
            .model
            .generate_json(ModelTier::Fast, &prompt, preview_schema())
            .await
        {
            Ok(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
            Ok(other) => {
                log::warn!(
                    "preview for '{}' was not an array: {}",
                    table.qualified_name(),
                    other
                );
                Vec::new()
            }
            Err(e) => {
                log::error!("preview for '{}' failed: {e}", table.qualified_name());
                Vec::new()
            }
        }
    }
}

fn preview_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "value": { "type": "NUMBER" },
                "category": { "type": "STRING" },
                "timestamp": { "type": "STRING" }
            }
        }
    })
}
