use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use common::config::loader::read_config;
use common::error::ConsoleError;
use console_web::{init_logging, run_backend, BackendConfig};
use tokio::runtime::Runtime;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind the backend server (overrides server.addr)
    #[arg(long)]
    pub addr: Option<String>,

    /// Directory of built frontend assets to serve (overrides server.static_dir)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

pub fn handle_serve(args: ServeArgs, config_path: Option<PathBuf>) -> Result<(), ConsoleError> {
    let cfg = read_config(config_path).map_err(ConsoleError::init)?;

    let backend = BackendConfig {
        addr: args.addr.unwrap_or(cfg.server.addr),
        static_dir: args.static_dir.or(cfg.server.static_dir),
        session_ttl: Duration::from_secs(cfg.server.session_ttl_secs),
        seed: cfg.seed,
        genai: cfg.genai,
    };

    init_logging();
    let rt = Runtime::new().map_err(ConsoleError::run)?;
    rt.block_on(run_backend(backend)).map_err(ConsoleError::run)
}
