pub mod config;
pub mod error;
pub mod sequence;
pub mod types;
