pub mod dispatcher;
pub mod source;

pub use dispatcher::ConnectionDispatcher;
pub use source::{SourceSpec, ValidationError};
