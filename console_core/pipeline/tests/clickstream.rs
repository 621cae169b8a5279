use common::types::{NodeStatus, NodeType};
use pipeline::{NodeConfigEditor, PipelineStore};
use std::collections::HashSet;

fn ids(store: &PipelineStore) -> HashSet<String> {
    store
        .select_pipeline("p-1")
        .nodes
        .into_iter()
        .map(|n| n.id)
        .collect()
}

#[test]
fn add_then_delete_on_clickstream() {
    let store = PipelineStore::default();
    let pipeline = store.select_pipeline("p-1");
    assert_eq!(pipeline.name, "Clickstream Ingestion");
    assert_eq!(pipeline.nodes.len(), 3);
    let original = ids(&store);

    let added = store
        .add_node("p-1", NodeType::Transform, None, None)
        .expect("pipeline exists");
    let pipeline = store.select_pipeline("p-1");
    assert_eq!(pipeline.nodes.len(), 4);
    let last = pipeline.nodes.last().expect("node");
    assert_eq!(last.id, added.id);
    assert_eq!(last.status, NodeStatus::Idle);

    assert!(store.delete_node("p-1", "n-2"));
    let pipeline = store.select_pipeline("p-1");
    assert_eq!(pipeline.nodes.len(), 3);
    assert_ne!(ids(&store), original);
    assert!(!pipeline.contains_node("n-2"));
}

#[test]
fn handles_share_state() {
    let store = PipelineStore::default();
    let other = store.clone();
    let node = store.get_node("p-2", "n-4").expect("node");

    let mut editor = NodeConfigEditor::open("p-2", &node);
    editor.set_field("host", "db.example.com");
    editor.save(&store).expect("save");

    let seen = other.get_node("p-2", "n-4").expect("node");
    assert_eq!(
        seen.config.and_then(|c| c.get("host").cloned()),
        Some("db.example.com".to_string())
    );
}
