//! Client for the optional remote advice service.
//!
//! The service receives the game state as JSON and answers with
//! `{"advice": "..."}`. A missing or blank `advice` field means the
//! service had nothing to add.

use std::time::Duration;

use civic_core::config::AdvisorConfig;
use civic_types::GameState;

use crate::error::AdvisorError;

/// HTTP client for the remote advice endpoint.
pub struct RemoteAdvisor {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl RemoteAdvisor {
    /// Build a client, or `None` when no endpoint is configured.
    ///
    /// The configured timeout bounds each whole request.
    pub fn from_config(config: &AdvisorConfig) -> Result<Option<Self>, AdvisorError> {
        let Some(url) = config.remote_url.as_ref().filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AdvisorError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Some(Self {
            client,
            url: url.clone(),
            api_key: config.api_key.clone(),
        }))
    }

    /// Ask the service for advice on `state`.
    pub async fn fetch(&self, state: &GameState) -> Result<Option<String>, AdvisorError> {
        let body = serde_json::json!({ "gameState": state });

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AdvisorError::Request(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(AdvisorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdvisorError::Payload(format!("response is not JSON: {e}")))?;

        extract_advice(&json)
    }
}

/// Pull the `advice` string out of a response body.
fn extract_advice(json: &serde_json::Value) -> Result<Option<String>, AdvisorError> {
    match json.get("advice") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(text)) => {
            let text = text.trim();
            Ok((!text.is_empty()).then(|| text.to_owned()))
        }
        Some(other) => Err(AdvisorError::Payload(format!(
            "advice must be a string, got {other}"
        ))),
    }
}
