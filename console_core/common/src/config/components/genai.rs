use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

pub const DEFAULT_GENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_FAST_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REASONING_MODEL: &str = "gemini-3-pro-preview";

// ---------------- generative service config ----------------
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Model used for SQL generation, previews and error explanations.
    pub fast_model: String,
    /// Model used for pipeline analysis.
    pub reasoning_model: String,
    pub timeout_secs: Option<u64>,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENAI_BASE_URL.to_string(),
            api_key: None,
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            timeout_secs: None,
        }
    }
}

// keep the key out of debug logs
impl Debug for GenAiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("fast_model", &self.fast_model)
            .field("reasoning_model", &self.reasoning_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
