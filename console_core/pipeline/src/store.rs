use crate::error::PipelineError;
use crate::models::{DashboardSummary, Node, NodeConfig, Pipeline};
use crate::seed::{default_pipelines, load_pipelines};
use common::types::NodeType;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// internal state, never empty once constructed
#[derive(Debug)]
struct State {
    pipelines: Vec<Pipeline>,
    last_base: String,
    id_suffix: u64,
}

impl State {
    /// `n-<unix millis>`. A second id within the same millisecond, or one
    /// that collides with a live node, gets a counter suffix.
    fn next_node_id(&mut self) -> String {
        let base = format!("n-{}", chrono::Utc::now().timestamp_millis());
        let mut candidate = if base == self.last_base {
            self.id_suffix += 1;
            format!("{base}-{}", self.id_suffix)
        } else {
            self.id_suffix = 0;
            base.clone()
        };
        while self.id_taken(&candidate) {
            self.id_suffix += 1;
            candidate = format!("{base}-{}", self.id_suffix);
        }
        self.last_base = base;
        candidate
    }

    fn id_taken(&self, id: &str) -> bool {
        self.pipelines.iter().any(|p| p.contains_node(id))
    }

    fn pipeline_mut(&mut self, pipeline_id: &str) -> Option<&mut Pipeline> {
        self.pipelines.iter_mut().find(|p| p.id == pipeline_id)
    }
}

/// Process-wide pipeline set. Cloning yields another handle onto the same
/// state; every mutation holds the write lock for its whole duration.
#[derive(Debug, Clone)]
pub struct PipelineStore {
    inner: Arc<RwLock<State>>,
}

impl Default for PipelineStore {
    fn default() -> Self {
        Self::from_state(default_pipelines())
    }
}

impl PipelineStore {
    pub fn new(pipelines: Vec<Pipeline>) -> Result<Self, PipelineError> {
        if pipelines.is_empty() {
            return Err(PipelineError::empty_seed());
        }
        check_unique_ids(&pipelines)?;
        Ok(Self::from_state(pipelines))
    }

    /// Built-in pipelines, or the `pipelines` section of `seed` when given.
    pub fn load_from(seed: Option<&Path>) -> Result<Self, PipelineError> {
        match seed {
            Some(path) => Self::new(load_pipelines(path)?),
            None => Ok(Self::default()),
        }
    }

    fn from_state(pipelines: Vec<Pipeline>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(State {
                pipelines,
                last_base: String::new(),
                id_suffix: 0,
            })),
        }
    }

    pub fn pipelines(&self) -> Vec<Pipeline> {
        self.inner.read().pipelines.clone()
    }

    pub fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline, PipelineError> {
        self.inner
            .read()
            .pipelines
            .iter()
            .find(|p| p.id == pipeline_id)
            .cloned()
            .ok_or_else(|| PipelineError::not_found(format!("pipeline '{pipeline_id}'")))
    }

    pub fn get_node(&self, pipeline_id: &str, node_id: &str) -> Result<Node, PipelineError> {
        let pipeline = self.get_pipeline(pipeline_id)?;
        pipeline.node(node_id).cloned().ok_or_else(|| {
            PipelineError::not_found(format!("node '{node_id}' in pipeline '{pipeline_id}'"))
        })
    }

    /// The pipeline with `pipeline_id`, or the first pipeline when there is
    /// no match.
    pub fn select_pipeline(&self, pipeline_id: &str) -> Pipeline {
        let g = self.inner.read();
        match g.pipelines.iter().find(|p| p.id == pipeline_id) {
            Some(p) => p.clone(),
            None => {
                log::debug!("pipeline '{pipeline_id}' not found, selecting the first pipeline");
                // non-empty, checked on construction
                g.pipelines[0].clone()
            }
        }
    }

    /// Append a fresh idle node to the end of the pipeline. Returns `None`
    /// and changes nothing when the pipeline does not exist.
    pub fn add_node(
        &self,
        pipeline_id: &str,
        node_type: NodeType,
        subtype: Option<String>,
        name: Option<String>,
    ) -> Option<Node> {
        let mut g = self.inner.write();
        if !g.pipelines.iter().any(|p| p.id == pipeline_id) {
            log::debug!("add_node ignored, unknown pipeline '{pipeline_id}'");
            return None;
        }

        let id = g.next_node_id();
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| node_type.default_node_name());
        let mut node = Node::new(id, node_type, name);
        node.subtype = subtype;

        let pipeline = g.pipeline_mut(pipeline_id)?;
        pipeline.nodes.push(node.clone());
        log::info!(
            "added {} node '{}' to pipeline '{}'",
            node.node_type,
            node.id,
            pipeline_id
        );
        Some(node)
    }

    /// Remove a node, keeping the order of the others. Returns whether a
    /// node was removed; absent pipelines or nodes are a no-op.
    pub fn delete_node(&self, pipeline_id: &str, node_id: &str) -> bool {
        let mut g = self.inner.write();
        let Some(pipeline) = g.pipeline_mut(pipeline_id) else {
            log::debug!("delete_node ignored, unknown pipeline '{pipeline_id}'");
            return false;
        };
        let before = pipeline.nodes.len();
        pipeline.nodes.retain(|n| n.id != node_id);
        let removed = pipeline.nodes.len() != before;
        if removed {
            log::info!("deleted node '{node_id}' from pipeline '{pipeline_id}'");
        }
        removed
    }

    /// Replace the whole config mapping of a node.
    pub fn save_node_config(
        &self,
        pipeline_id: &str,
        node_id: &str,
        config: NodeConfig,
    ) -> Result<Node, PipelineError> {
        let mut g = self.inner.write();
        let pipeline = g
            .pipeline_mut(pipeline_id)
            .ok_or_else(|| PipelineError::not_found(format!("pipeline '{pipeline_id}'")))?;
        let node = pipeline.node_mut(node_id).ok_or_else(|| {
            PipelineError::not_found(format!("node '{node_id}' in pipeline '{pipeline_id}'"))
        })?;
        node.config = Some(config);
        log::info!("saved config of node '{node_id}' in pipeline '{pipeline_id}'");
        Ok(node.clone())
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_pipelines(&self.inner.read().pipelines)
    }
}

/// Pipeline ids are unique across the set, node ids within their pipeline.
fn check_unique_ids(pipelines: &[Pipeline]) -> Result<(), PipelineError> {
    let mut pipeline_ids = HashSet::new();
    for pipeline in pipelines {
        if !pipeline_ids.insert(pipeline.id.as_str()) {
            return Err(PipelineError::duplicate_id(format!(
                "pipeline '{}' appears more than once",
                pipeline.id
            )));
        }
        let mut node_ids = HashSet::new();
        for node in &pipeline.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(PipelineError::duplicate_id(format!(
                    "node '{}' appears more than once in pipeline '{}'",
                    node.id, pipeline.id
                )));
            }
        }
    }
    Ok(())
}
