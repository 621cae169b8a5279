use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use common::error::ConsoleError;
use common::types::{ConnectionTestResult, NodeType};
use connector::ConnectionDispatcher;
use console_web::ConnectorServiceClient;
use tokio::runtime::Runtime;

#[derive(Debug, Args)]
pub struct TestConnectionArgs {
    /// Node type: SOURCE, TRANSFORM or DESTINATION
    #[arg(long = "type", default_value = "SOURCE")]
    pub node_type: NodeType,

    /// Source subtype, e.g. postgres, sqlserver, bigquery
    #[arg(long)]
    pub subtype: Option<String>,

    /// Config entry as key=value; repeat for each field
    #[arg(long = "set", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// Ask a running backend instead of probing from this process
    #[arg(long)]
    pub backend_url: Option<String>,
}

pub fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

pub fn handle_test_connection(
    args: TestConnectionArgs,
    _config_path: Option<PathBuf>,
) -> Result<(), ConsoleError> {
    let config: BTreeMap<String, String> = args.set.into_iter().collect();
    let rt = Runtime::new().map_err(ConsoleError::run)?;

    let result: ConnectionTestResult = rt.block_on(async {
        match &args.backend_url {
            Some(url) => {
                ConnectorServiceClient::new(url)
                    .test_connection(args.node_type, args.subtype.as_deref(), &config)
                    .await
            }
            None => {
                ConnectionDispatcher::default()
                    .test_connection(args.node_type, args.subtype.as_deref(), &config)
                    .await
            }
        }
    });

    if result.success {
        println!("ok: {}", result.message);
        Ok(())
    } else {
        Err(ConsoleError::run_msg(result.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_pairs() {
        assert_eq!(
            parse_key_val("host=db.example.com"),
            Ok(("host".to_string(), "db.example.com".to_string()))
        );
        assert_eq!(
            parse_key_val("password=a=b"),
            Ok(("password".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }
}
