use crate::config::components::genai::GenAiConfig;
use crate::config::components::server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------- global config ----------------
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server: ServerConfig,
    pub genai: GenAiConfig,
    /// Optional YAML file with `pipelines` and `catalog` entries replacing
    /// the built-in seed data.
    pub seed: Option<PathBuf>,
}

impl ConsoleConfig {
    pub fn new(server: ServerConfig, genai: GenAiConfig, seed: Option<PathBuf>) -> Self {
        Self {
            server,
            genai,
            seed,
        }
    }
}
