mod commands;

use crate::commands::{
    handle_catalog, handle_pipelines, handle_serve, handle_test_connection, CatalogArgs,
    PipelinesArgs, ServeArgs, TestConnectionArgs,
};

use clap::{Parser, Subcommand};
use common::error::ConsoleError;
use logging::{init_logger, LogFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "console", about = "Data platform console backend")]
pub struct Cli {
    #[arg(
        long = "config-path",
        short = 'c',
        help = "path to console.yml or its directory",
        global = true
    )]
    pub config_path: Option<PathBuf>,
    /// Multi-line log output
    #[arg(long, global = true)]
    pub pretty_logs: bool,
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Run the console HTTP backend
    Serve(ServeArgs),
    /// Test connectivity for a node configuration
    TestConnection(TestConnectionArgs),
    /// List pipelines and their nodes
    Pipelines(PipelinesArgs),
    /// List catalog tables
    Catalog(CatalogArgs),
}

fn run_cmd(func: Result<(), ConsoleError>) {
    if let Err(e) = func {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `serve` installs the web backend's env_logger; a second global logger
/// would leave that one a no-op.
fn uses_tracing_logger(cmd: &Cmd) -> bool {
    !matches!(cmd, Cmd::Serve(_))
}

fn main() {
    let cli = Cli::parse();
    if uses_tracing_logger(&cli.command) {
        init_logger(if cli.pretty_logs {
            LogFormat::Pretty
        } else {
            LogFormat::Compact
        });
    }

    let config_path = cli.config_path.clone();
    match cli.command {
        Cmd::Serve(args) => run_cmd(handle_serve(args, config_path)),
        Cmd::TestConnection(args) => run_cmd(handle_test_connection(args, config_path)),
        Cmd::Pipelines(args) => run_cmd(handle_pipelines(args, config_path)),
        Cmd::Catalog(args) => run_cmd(handle_catalog(args, config_path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::NodeType;

    #[test]
    fn parses_test_connection_flags() {
        let cli = Cli::try_parse_from([
            "console",
            "-c",
            "conf",
            "test-connection",
            "--type",
            "source",
            "--subtype",
            "postgres",
            "--set",
            "host=db",
            "--set",
            "port=5432",
        ])
        .expect("parse");

        assert_eq!(cli.config_path, Some(PathBuf::from("conf")));
        match cli.command {
            Cmd::TestConnection(args) => {
                assert_eq!(args.node_type, NodeType::Source);
                assert_eq!(args.subtype.as_deref(), Some("postgres"));
                assert_eq!(args.set.len(), 2);
            }
            _ => panic!("expected test-connection"),
        }
    }

    #[test]
    fn rejects_unknown_node_type() {
        assert!(Cli::try_parse_from(["console", "test-connection", "--type", "sink"]).is_err());
    }

    #[test]
    fn serve_leaves_logging_to_the_backend() {
        let serve = Cli::try_parse_from(["console", "serve"]).expect("parse");
        assert!(!uses_tracing_logger(&serve.command));

        let catalog = Cli::try_parse_from(["console", "catalog"]).expect("parse");
        assert!(uses_tracing_logger(&catalog.command));
    }

    #[test]
    fn catalog_filter_defaults_to_everything() {
        let cli = Cli::try_parse_from(["console", "catalog"]).expect("parse");
        match cli.command {
            Cmd::Catalog(args) => assert!(args.filter.is_empty()),
            _ => panic!("expected catalog"),
        }
    }
}
