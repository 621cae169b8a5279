use crate::error::PipelineError;
use crate::models::{Node, Pipeline};
use common::types::{NodeStatus, NodeType, PipelineStatus};
use serde::Deserialize;
use std::path::Path;

/// Pipelines section of a seed file. Other top-level keys are ignored so
/// the catalog can share the same file.
#[derive(Debug, Default, Deserialize)]
struct PipelineSeed {
    pipelines: Option<Vec<Pipeline>>,
}

/// Read the `pipelines` section of a seed file, falling back to the
/// built-in pipelines when the section is absent.
pub fn load_pipelines(path: &Path) -> Result<Vec<Pipeline>, PipelineError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::io(format!("failed to read seed {}", path.display()), e))?;
    let seed: PipelineSeed = serde_yaml::from_str(&raw)?;
    match seed.pipelines {
        Some(pipelines) => {
            log::info!(
                "loaded {} pipelines from {}",
                pipelines.len(),
                path.display()
            );
            Ok(pipelines)
        }
        None => Ok(default_pipelines()),
    }
}

pub fn default_pipelines() -> Vec<Pipeline> {
    vec![
        Pipeline {
            id: "p-1".into(),
            name: "Clickstream Ingestion".into(),
            nodes: vec![
                Node::new("n-1", NodeType::Source, "Kafka: Events")
                    .with_subtype("kafka")
                    .with_status(NodeStatus::Healthy),
                Node::new("n-2", NodeType::Transform, "Cleanse JSON")
                    .with_status(NodeStatus::Healthy),
                Node::new("n-3", NodeType::Destination, "Silver Tables")
                    .with_subtype("delta")
                    .with_status(NodeStatus::Healthy),
            ],
            last_run: "2 mins ago".into(),
            status: PipelineStatus::Active,
            latency_ms: 450,
            rows_processed: 1_250_000,
        },
        Pipeline {
            id: "p-2".into(),
            name: "Daily Revenue Rollup".into(),
            nodes: vec![
                Node::new("n-4", NodeType::Source, "Postgres: Orders")
                    .with_subtype("postgres")
                    .with_status(NodeStatus::Healthy),
                Node::new("n-5", NodeType::Transform, "Aggregator")
                    .with_status(NodeStatus::Running),
                Node::new("n-6", NodeType::Destination, "Gold: Revenue")
                    .with_subtype("postgres")
                    .with_status(NodeStatus::Idle),
            ],
            last_run: "4 hours ago".into(),
            status: PipelineStatus::Active,
            latency_ms: 12_000,
            rows_processed: 45_000,
        },
        Pipeline {
            id: "p-3".into(),
            name: "Marketing Sync".into(),
            nodes: vec![
                Node::new("n-7", NodeType::Source, "Salesforce API")
                    .with_subtype("api")
                    .with_status(NodeStatus::Error),
                Node::new("n-8", NodeType::Destination, "BigQuery")
                    .with_subtype("bigquery")
                    .with_status(NodeStatus::Idle),
            ],
            last_run: "1 day ago".into(),
            status: PipelineStatus::Error,
            latency_ms: 0,
            rows_processed: 0,
        },
    ]
}
