pub mod connection;
pub mod nodes;
pub mod schema;
pub mod sources;

pub use connection::ConnectionTestResult;
pub use nodes::{NodeStatus, NodeType, PipelineStatus};
pub use schema::{CatalogTable, Column};
pub use sources::{FieldSpec, SourceKind};
