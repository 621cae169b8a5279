mod connection;
mod inspect;
mod serve;

pub use connection::{handle_test_connection, TestConnectionArgs};
pub use inspect::{handle_catalog, handle_pipelines, CatalogArgs, PipelinesArgs};
pub use serve::{handle_serve, ServeArgs};
