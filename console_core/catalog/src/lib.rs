pub mod error;
pub mod preview;
pub mod query;
pub mod seed;

pub use preview::PreviewService;
pub use query::{QueryLab, QueryLabSession, QueryOutcome, QueryResult};

use crate::error::CatalogError;
use crate::seed::{default_tables, load_tables};
use common::types::CatalogTable;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// internal state; insertion order is listing order
#[derive(Default)]
struct State {
    tables: Vec<CatalogTable>,
}

/// Read-only table catalog shared by the browser, the preview and the SQL lab.
#[derive(Clone)]
pub struct MemoryCatalog {
    inner: Arc<RwLock<State>>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new(default_tables())
    }
}

impl MemoryCatalog {
    pub fn new(tables: Vec<CatalogTable>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(State { tables })),
        }
    }

    /// Built-in tables, or the `catalog` section of `seed` when given.
    pub fn load_from(seed: Option<&Path>) -> Result<Self, CatalogError> {
        match seed {
            Some(path) => {
                let tables = load_tables(path)?;
                log::info!("loaded {} catalog tables from {}", tables.len(), path.display());
                Ok(Self::new(tables))
            }
            None => Ok(Self::default()),
        }
    }
}

pub trait Getter: Send + Sync + 'static {
    /// Tables whose name or schema contains `filter`, ignoring case. An
    /// empty filter lists everything.
    fn list_tables(&self, filter: &str) -> Vec<CatalogTable>;
    fn get_table(&self, id: &str) -> Result<CatalogTable, CatalogError>;
    /// One `Table <schema>.<name> (<col> <type>, ...)` line per table, used
    /// as prompt context for SQL generation.
    fn schema_context(&self) -> String;
}

impl Getter for MemoryCatalog {
    fn list_tables(&self, filter: &str) -> Vec<CatalogTable> {
        let needle = filter.to_lowercase();
        self.inner
            .read()
            .tables
            .iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&needle) || t.schema.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    fn get_table(&self, id: &str) -> Result<CatalogTable, CatalogError> {
        self.inner
            .read()
            .tables
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(format!("table '{id}'")))
    }

    fn schema_context(&self) -> String {
        self.inner
            .read()
            .tables
            .iter()
            .map(|t| {
                let columns = t
                    .columns
                    .iter()
                    .map(|c| format!("{} {}", c.name, c.data_type))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Table {} ({columns})", t.qualified_name())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
