//! HTTP client for the collection endpoint
//!
//! One record per request: `POST {base_url}/rest/v1/{table}` with the
//! record as the JSON body. The endpoint answers with an empty body
//! (`Prefer: return=minimal`), so only the status code is inspected.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::config::EndpointConfig;
use crate::error::{Error, Result};
use crate::types::MetricsRecord;

/// HTTP client for the collection endpoint
#[derive(Debug, Clone)]
pub struct SubmitClient {
    http_client: reqwest::Client,
    insert_url: String,
}

impl SubmitClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?;
        headers.insert("apikey", api_key);

        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            insert_url: config.insert_url(),
        })
    }

    pub fn insert_url(&self) -> &str {
        &self.insert_url
    }

    /// Send one record. Any 2xx status is success.
    pub async fn submit(&self, record: &MetricsRecord) -> Result<()> {
        let response = self
            .http_client
            .post(&self.insert_url)
            .json(record)
            .send()
            .await
            .map_err(|e| Error::Submit(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "Record accepted");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "Record rejected");
            Err(Error::Submit(format!("HTTP {}", status.as_u16())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_insert_url() {
        let config = EndpointConfig {
            base_url: "https://collect.example.com/".to_string(),
            table: "cxms_telemetry".to_string(),
            api_key: "anon-key".to_string(),
        };
        let client = SubmitClient::new(&config).unwrap();
        assert_eq!(
            client.insert_url(),
            "https://collect.example.com/rest/v1/cxms_telemetry"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EndpointConfig {
            api_key: String::new(),
            ..EndpointConfig::default()
        };
        assert!(matches!(SubmitClient::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_unprintable_key_rejected() {
        let config = EndpointConfig {
            api_key: "key\nwith newline".to_string(),
            ..EndpointConfig::default()
        };
        assert!(matches!(SubmitClient::new(&config), Err(Error::Config(_))));
    }
}
