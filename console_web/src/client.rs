use common::types::{ConnectionTestResult, NodeType};
use serde::Serialize;
use std::collections::BTreeMap;

pub const BACKEND_UNREACHABLE: &str = "Failed to connect to backend service.";

#[derive(Serialize)]
struct TestRequest<'a> {
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtype: Option<&'a str>,
    config: &'a BTreeMap<String, String>,
}

/// Calls a running console backend's connection-test endpoint.
#[derive(Debug, Clone)]
pub struct ConnectorServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConnectorServiceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Any transport failure, non-success status or unreadable body becomes
    /// a failed verdict.
    pub async fn test_connection(
        &self,
        node_type: NodeType,
        subtype: Option<&str>,
        config: &BTreeMap<String, String>,
    ) -> ConnectionTestResult {
        match self.try_test_connection(node_type, subtype, config).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("connection test request failed: {e}");
                ConnectionTestResult::failed(BACKEND_UNREACHABLE)
            }
        }
    }

    async fn try_test_connection(
        &self,
        node_type: NodeType,
        subtype: Option<&str>,
        config: &BTreeMap<String, String>,
    ) -> Result<ConnectionTestResult, reqwest::Error> {
        let url = format!("{}/api/connect/test", self.base_url);
        self.http
            .post(url)
            .json(&TestRequest {
                node_type,
                subtype,
                config,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn passes_backend_verdict_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/connect/test"))
            .and(body_json(json!({
                "type": "SOURCE",
                "subtype": "postgres",
                "config": { "host": "db" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Missing required connection details."
            })))
            .mount(&server)
            .await;

        let client = ConnectorServiceClient::new(&server.uri());
        let config = BTreeMap::from([("host".to_string(), "db".to_string())]);
        let result = client
            .test_connection(NodeType::Source, Some("postgres"), &config)
            .await;
        assert_eq!(
            result,
            ConnectionTestResult::failed("Missing required connection details.")
        );
    }

    #[tokio::test]
    async fn error_status_maps_to_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = ConnectorServiceClient::new(&server.uri());
        let result = client
            .test_connection(NodeType::Transform, None, &BTreeMap::new())
            .await;
        assert_eq!(result, ConnectionTestResult::failed(BACKEND_UNREACHABLE));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_unreachable() {
        // nothing listens on the discard port
        let client = ConnectorServiceClient::new("http://127.0.0.1:9");
        let result = client
            .test_connection(NodeType::Source, Some("kafka"), &BTreeMap::new())
            .await;
        assert!(!result.success);
        assert_eq!(result.message, BACKEND_UNREACHABLE);
    }
}
