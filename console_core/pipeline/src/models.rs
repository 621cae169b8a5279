use common::types::{NodeStatus, NodeType, PipelineStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat key/value configuration of a node. Values are always strings,
/// whatever the field represents.
pub type NodeConfig = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub name: String,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unset until the first save through the config editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: NodeType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            subtype: None,
            name: name.into(),
            status: NodeStatus::Idle,
            description: None,
            config: None,
        }
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }
}

/// Linear sequence of nodes; vector order is execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub last_run: String,
    pub status: PipelineStatus,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub rows_processed: u64,
}

impl Pipeline {
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.node(node_id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_pipelines: usize,
    pub active_pipelines: usize,
    pub paused_pipelines: usize,
    pub failing_pipelines: usize,
    pub total_nodes: usize,
    pub total_rows_processed: u64,
    /// Mean latency over pipelines that are not in error; 0 when none are.
    pub avg_latency_ms: u64,
}

impl DashboardSummary {
    pub fn from_pipelines(pipelines: &[Pipeline]) -> Self {
        let count = |status: PipelineStatus| pipelines.iter().filter(|p| p.status == status).count();

        let healthy: Vec<u64> = pipelines
            .iter()
            .filter(|p| p.status != PipelineStatus::Error)
            .map(|p| p.latency_ms)
            .collect();
        let avg_latency_ms = if healthy.is_empty() {
            0
        } else {
            healthy.iter().sum::<u64>() / healthy.len() as u64
        };

        Self {
            total_pipelines: pipelines.len(),
            active_pipelines: count(PipelineStatus::Active),
            paused_pipelines: count(PipelineStatus::Paused),
            failing_pipelines: count(PipelineStatus::Error),
            total_nodes: pipelines.iter().map(|p| p.nodes.len()).sum(),
            total_rows_processed: pipelines.iter().map(|p| p.rows_processed).sum(),
            avg_latency_ms,
        }
    }
}
