use crate::models::Pipeline;
use shared_clients::genai::{GenerativeModel, ModelTier};
use std::sync::Arc;

pub const ANALYSIS_FAILED: &str = "Unable to analyze pipeline at this time.";
pub const ANALYSIS_EMPTY: &str = "Analysis unavailable.";

/// Asks the reasoning model for a bottleneck and optimisation review of a
/// pipeline. Never fails: errors become fallback text.
#[derive(Clone)]
pub struct PipelineAdvisor {
    model: Arc<dyn GenerativeModel>,
}

impl PipelineAdvisor {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub async fn analyze(&self, pipeline: &Pipeline) -> String {
        let pipeline_json = match serde_json::to_string_pretty(pipeline) {
            Ok(json) => json,
            Err(e) => {
                log::error!("failed to serialise pipeline '{}': {e}", pipeline.id);
                return ANALYSIS_FAILED.to_string();
            }
        };

        match self
            .model
            .generate_text(ModelTier::Reasoning, &analysis_prompt(&pipeline_json))
            .await
        {
            Ok(text) if text.trim().is_empty() => ANALYSIS_EMPTY.to_string(),
            Ok(text) => text,
            Err(e) => {
                log::error!("pipeline analysis for '{}' failed: {e}", pipeline.id);
                ANALYSIS_FAILED.to_string()
            }
        }
    }
}

fn analysis_prompt(pipeline_json: &str) -> String {
    format!(
        "You are a Senior Data Architect.\n\
         Analyze the following data pipeline JSON structure.\n\
         Identify potential bottlenecks, suggest optimizations for latency, and verify node types.\n\n\
         Pipeline Data:\n{pipeline_json}\n\n\
         Provide a concise, bullet-point analysis."
    )
}
