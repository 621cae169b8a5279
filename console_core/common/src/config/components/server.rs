use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8085";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

// ---------------- server config ----------------
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Directory of built frontend assets, served from `/` when set.
    pub static_dir: Option<PathBuf>,
    /// Editor and SQL-lab sessions untouched for this long are dropped.
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            static_dir: None,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}
