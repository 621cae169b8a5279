use crate::{BigQueryTarget, ConnectionProbe, DatabaseAdapterError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const BIGQUERY_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery.readonly";

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

impl From<reqwest::Error> for DatabaseAdapterError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            DatabaseAdapterError::invalid_connection(err.to_string())
        } else {
            DatabaseAdapterError::unexpected(format!(
                "Unexpected error trying to reach BigQuery: {err}"
            ))
        }
    }
}

impl From<yup_oauth2::Error> for DatabaseAdapterError {
    #[track_caller]
    fn from(err: yup_oauth2::Error) -> Self {
        DatabaseAdapterError::authentication(err.to_string())
    }
}

/// Checks dataset visibility through the BigQuery REST API using an access
/// token minted from the service-account key.
#[derive(Debug, Clone)]
pub struct BigQueryProbe {
    api_url: String,
}

impl Default for BigQueryProbe {
    fn default() -> Self {
        Self::new(BIGQUERY_API_URL)
    }
}

impl BigQueryProbe {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn access_token(&self, target: &BigQueryTarget) -> Result<String, DatabaseAdapterError> {
        let key = yup_oauth2::parse_service_account_key(&target.service_account_json)
            .map_err(|e| DatabaseAdapterError::config(format!("invalid service account key: {e}")))?;
        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await?;
        let token = auth.token(&[BIGQUERY_SCOPE]).await?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| DatabaseAdapterError::authentication("token endpoint returned no access token"))
    }
}

#[async_trait]
impl ConnectionProbe<BigQueryTarget> for BigQueryProbe {
    async fn probe(&self, target: &BigQueryTarget) -> Result<(), DatabaseAdapterError> {
        log::debug!(
            "probing bigquery dataset {}.{}",
            target.project_id,
            target.dataset_id
        );
        let bearer = self.access_token(target).await?;
        let url = format!(
            "{}/projects/{}/datasets/{}",
            self.api_url, target.project_id, target.dataset_id
        );

        let resp = Client::new().get(&url).bearer_auth(bearer).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match resp.json::<GoogleErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("BigQuery responded with status {status}"),
        };
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(DatabaseAdapterError::authentication(message))
            }
            StatusCode::NOT_FOUND => Err(DatabaseAdapterError::config(message)),
            _ => Err(DatabaseAdapterError::unexpected(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    #[tokio::test]
    async fn malformed_key_is_a_config_error() {
        let probe = BigQueryProbe::default();
        let target = BigQueryTarget {
            project_id: "proj".into(),
            dataset_id: "ds".into(),
            service_account_json: r#"{"type": "service_account"}"#.into(),
        };
        let err = probe.probe(&target).await.expect_err("key lacks fields");
        assert_matches!(err, DatabaseAdapterError::ConfigError { .. });
        assert!(err.upstream_message().starts_with("invalid service account key"));
    }
}
