pub mod client;
pub mod console_backend;

pub use client::ConnectorServiceClient;
pub use console_backend::{api_routes, init_logging, run_backend, AppState, BackendConfig};
