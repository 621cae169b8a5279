use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[derive(Clone, Deserialize, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTable {
    pub id: String,
    pub name: String,
    pub schema: String,
    pub row_count: u64,
    pub last_updated: String,
    pub columns: Vec<Column>,
}

impl CatalogTable {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

#[derive(Clone, Deserialize, Debug, Serialize, PartialEq)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String, // free-form, no type system behind it
    pub nullable: bool,
}

impl Column {
    pub fn new(name: &str, data_type: &str, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
        }
    }
}
