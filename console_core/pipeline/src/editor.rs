//! Scratch-copy editing of a single node's configuration.
//!
//! The editor never touches the stored node until [`NodeConfigEditor::save`].
//! Connection tests are tagged with a [`RequestTicket`]; a result is only
//! applied while its ticket is still current, so an edit made while a test
//! is in flight discards that test's verdict.

use crate::error::PipelineError;
use crate::models::{Node, NodeConfig};
use crate::store::PipelineStore;
use common::sequence::{RequestSequencer, RequestTicket};
use common::types::sources::MASK;
use common::types::{ConnectionTestResult, FieldSpec, NodeType, SourceKind};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct NodeConfigEditor {
    pipeline_id: String,
    node_id: String,
    node_name: String,
    node_type: NodeType,
    subtype: Option<String>,
    scratch: NodeConfig,
    test_result: Option<ConnectionTestResult>,
    in_flight: Option<RequestTicket>,
    sequencer: RequestSequencer,
}

/// What an interactive surface may show: sensitive values are masked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub pipeline_id: String,
    pub node_id: String,
    pub node_name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub subtype: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub config: NodeConfig,
    pub test_result: Option<ConnectionTestResult>,
    pub testing: bool,
}

impl NodeConfigEditor {
    pub fn open(pipeline_id: &str, node: &Node) -> Self {
        Self {
            pipeline_id: pipeline_id.to_string(),
            node_id: node.id.clone(),
            node_name: node.name.clone(),
            node_type: node.node_type,
            subtype: node.subtype.clone(),
            scratch: node.config.clone().unwrap_or_default(),
            test_result: None,
            in_flight: None,
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// Form fields; only SOURCE nodes have a connection form.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match (self.node_type, &self.subtype) {
            (NodeType::Source, Some(subtype)) => SourceKind::from_subtype(subtype).fields(),
            _ => &[],
        }
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.scratch.insert(key.into(), value.into());
        self.test_result = None;
        if self.in_flight.take().is_some() {
            log::debug!("edit on node '{}' superseded an in-flight test", self.node_id);
        }
        self.sequencer.invalidate();
    }

    pub fn snapshot(&self) -> &NodeConfig {
        &self.scratch
    }

    pub fn test_result(&self) -> Option<&ConnectionTestResult> {
        self.test_result.as_ref()
    }

    pub fn is_testing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a connection test: clears the previous verdict and returns the
    /// ticket the result must be applied with.
    pub fn begin_test(&mut self) -> RequestTicket {
        self.test_result = None;
        let ticket = self.sequencer.issue();
        self.in_flight = Some(ticket);
        ticket
    }

    /// Record a verdict if `ticket` is still the latest request. Returns
    /// whether the result was applied.
    pub fn apply_test_result(&mut self, ticket: RequestTicket, result: ConnectionTestResult) -> bool {
        if !self.sequencer.is_current(ticket) {
            log::debug!(
                "discarding stale test result #{} for node '{}'",
                ticket.value(),
                self.node_id
            );
            return false;
        }
        self.in_flight = None;
        self.test_result = Some(result);
        true
    }

    /// Scratch copy with non-empty sensitive values replaced by a mask.
    pub fn masked_config(&self) -> NodeConfig {
        let kind = self.subtype.as_deref().map(SourceKind::from_subtype);
        self.scratch
            .iter()
            .map(|(key, value)| {
                let sensitive = kind.as_ref().is_some_and(|k| k.is_sensitive(key));
                let shown = if sensitive && !value.is_empty() {
                    MASK.to_string()
                } else {
                    value.clone()
                };
                (key.clone(), shown)
            })
            .collect()
    }

    pub fn masked_view(&self) -> EditorView {
        EditorView {
            pipeline_id: self.pipeline_id.clone(),
            node_id: self.node_id.clone(),
            node_name: self.node_name.clone(),
            node_type: self.node_type,
            subtype: self.subtype.clone(),
            fields: self.fields().to_vec(),
            config: self.masked_config(),
            test_result: self.test_result.clone(),
            testing: self.is_testing(),
        }
    }

    /// Write the scratch copy back as the node's whole config and close the
    /// editor.
    pub fn save(self, store: &PipelineStore) -> Result<Node, PipelineError> {
        store.save_node_config(&self.pipeline_id, &self.node_id, self.scratch)
    }
}
