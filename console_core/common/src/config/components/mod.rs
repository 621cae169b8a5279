pub mod genai;
pub mod global;
pub mod server;
