pub mod advisor;
pub mod editor;
pub mod error;
pub mod models;
pub mod seed;
pub mod store;

pub use advisor::PipelineAdvisor;
pub use editor::{EditorView, NodeConfigEditor};
pub use error::PipelineError;
pub use models::{DashboardSummary, Node, NodeConfig, Pipeline};
pub use store::PipelineStore;
