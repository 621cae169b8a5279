use crate::error::CatalogError;
use common::types::{CatalogTable, Column};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct CatalogSeed {
    catalog: Option<Vec<CatalogTable>>,
}

/// Read the `catalog` section of a seed file; an absent section keeps the
/// built-in tables.
pub fn load_tables(path: &Path) -> Result<Vec<CatalogTable>, CatalogError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CatalogError::io(format!("failed to read seed {}", path.display()), e))?;
    let seed: CatalogSeed = serde_yaml::from_str(&raw)?;
    Ok(seed.catalog.unwrap_or_else(default_tables))
}

pub fn default_tables() -> Vec<CatalogTable> {
    vec![
        CatalogTable {
            id: "t-1".into(),
            name: "fact_orders".into(),
            schema: "sales_mart".into(),
            row_count: 8_500_230,
            last_updated: "2023-10-27 14:30:00".into(),
            columns: vec![
                Column::new("order_id", "VARCHAR(64)", false),
                Column::new("customer_id", "VARCHAR(64)", false),
                Column::new("amount", "DECIMAL(10,2)", false),
                Column::new("created_at", "TIMESTAMP", false),
            ],
        },
        CatalogTable {
            id: "t-2".into(),
            name: "dim_customers".into(),
            schema: "sales_mart".into(),
            row_count: 120_400,
            last_updated: "2023-10-26 09:00:00".into(),
            columns: vec![
                Column::new("customer_id", "VARCHAR(64)", false),
                Column::new("email", "VARCHAR(255)", false),
                Column::new("segment", "VARCHAR(50)", true),
            ],
        },
        CatalogTable {
            id: "t-3".into(),
            name: "raw_logs".into(),
            schema: "staging".into(),
            row_count: 45_000_000,
            last_updated: "2023-10-27 14:45:00".into(),
            columns: vec![
                Column::new("log_id", "UUID", false),
                Column::new("payload", "JSONB", true),
                Column::new("ingested_at", "TIMESTAMP", false),
            ],
        },
    ]
}
