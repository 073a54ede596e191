//! HTTP transport for the ingestion events API
//!
//! Posts batches as a JSON array of event objects to `{server_url}/v1/events`
//! with bearer auth and an optional client id header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::config::TelemetryConfig;
use crate::error::{Error, Result};
use crate::types::Event;

use super::Transport;

/// HTTP client for the ingestion endpoint
pub struct HttpTransport {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a new transport from configuration
    ///
    /// Returns an error if the configuration is invalid or missing the
    /// server URL.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config
            .server_url
            .clone()
            .ok_or_else(|| Error::Config("telemetry.server_url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Add authorization header
        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
            );
        }

        // Add client ID header
        if let Some(client_id) = &config.client_id {
            headers.insert(
                "X-Client-ID",
                HeaderValue::from_str(client_id)
                    .map_err(|e| Error::Config(format!("invalid client_id: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/v1/events", base_url),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, events: &[Event]) -> Result<()> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&events)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Transport(format!(
                "ingestion API error ({}): {}",
                status, error_text
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_requires_server_url() {
        let config = TelemetryConfig::default();
        assert!(HttpTransport::new(&config).is_err());
    }

    #[test]
    fn test_transport_with_valid_config() {
        let config = TelemetryConfig {
            server_url: Some("https://ingest.example.com/".to_string()),
            api_key: Some("bk_live_test".to_string()),
            client_id: Some("client-1".to_string()),
            ..Default::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.endpoint, "https://ingest.example.com/v1/events");
    }

    #[test]
    fn test_transport_rejects_invalid_api_key() {
        let config = TelemetryConfig {
            server_url: Some("https://ingest.example.com".to_string()),
            api_key: Some("bad\nkey".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            HttpTransport::new(&config),
            Err(Error::Config(_))
        ));
    }
}
