use std::path::PathBuf;

use catalog::{Getter, MemoryCatalog};
use clap::Args;
use common::config::loader::read_config;
use common::error::ConsoleError;
use pipeline::{Pipeline, PipelineStore};

#[derive(Debug, Args)]
pub struct PipelinesArgs {
    /// Print the pipelines as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Case-insensitive substring matched against table and schema names
    #[arg(long, default_value = "")]
    pub filter: String,

    /// Print the tables as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle_pipelines(args: PipelinesArgs, config_path: Option<PathBuf>) -> Result<(), ConsoleError> {
    let cfg = read_config(config_path).map_err(ConsoleError::init)?;
    let store = PipelineStore::load_from(cfg.seed.as_deref()).map_err(ConsoleError::init)?;
    let pipelines = store.pipelines();

    if args.json {
        let json = serde_json::to_string_pretty(&pipelines).map_err(ConsoleError::run)?;
        println!("{json}");
        return Ok(());
    }

    for pipeline in &pipelines {
        print!("{}", render_pipeline(pipeline));
    }
    let summary = store.summary();
    println!(
        "{} pipelines, {} nodes, {} rows processed",
        summary.total_pipelines, summary.total_nodes, summary.total_rows_processed
    );
    Ok(())
}

fn render_pipeline(pipeline: &Pipeline) -> String {
    let status = serde_json::to_value(pipeline.status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let mut out = format!(
        "{}  {}  [{}]  last run {}\n",
        pipeline.id, pipeline.name, status, pipeline.last_run
    );
    for node in &pipeline.nodes {
        out.push_str(&format!(
            "  {:<12} {:<12} {} ({})\n",
            node.node_type.to_string(),
            node.subtype.as_deref().unwrap_or("-"),
            node.name,
            node.id
        ));
    }
    out
}

pub fn handle_catalog(args: CatalogArgs, config_path: Option<PathBuf>) -> Result<(), ConsoleError> {
    let cfg = read_config(config_path).map_err(ConsoleError::init)?;
    let catalog = MemoryCatalog::load_from(cfg.seed.as_deref()).map_err(ConsoleError::init)?;
    let tables = catalog.list_tables(&args.filter);

    if args.json {
        let json = serde_json::to_string_pretty(&tables).map_err(ConsoleError::run)?;
        println!("{json}");
        return Ok(());
    }

    if tables.is_empty() {
        println!("no tables match '{}'", args.filter);
    }
    for table in &tables {
        println!(
            "{:<28} {:>12} rows  updated {}",
            table.qualified_name(),
            table.row_count,
            table.last_updated
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::seed::default_pipelines;

    #[test]
    fn renders_nodes_in_order() {
        let rendered = render_pipeline(&default_pipelines()[0]);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "p-1  Clickstream Ingestion  [active]  last run 2 mins ago");
        assert!(lines[1].contains("Kafka: Events (n-1)"));
        assert!(lines[3].contains("Silver Tables (n-3)"));
    }

    #[test]
    fn commands_read_seed_from_config_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("console.yml"), "seed: seed.yml\n").expect("config");
        std::fs::write(
            dir.path().join("seed.yml"),
            "pipelines:\n  - id: p-x\n    name: Solo\n    status: paused\n    nodes: []\n",
        )
        .expect("seed");

        let config_path = Some(dir.path().to_path_buf());
        handle_pipelines(PipelinesArgs { json: true }, config_path.clone()).expect("pipelines");
        handle_catalog(
            CatalogArgs {
                filter: "sales".into(),
                json: false,
            },
            config_path,
        )
        .expect("catalog");
    }

    #[test]
    fn empty_pipeline_seed_is_an_init_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("console.yml"), "seed: seed.yml\n").expect("config");
        std::fs::write(dir.path().join("seed.yml"), "pipelines: []\n").expect("seed");

        let err = handle_pipelines(PipelinesArgs { json: false }, Some(dir.path().to_path_buf()))
            .expect_err("empty seed");
        assert!(matches!(err, ConsoleError::Init { .. }));
    }
}
