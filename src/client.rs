//! Reqwest-backed model client for a generic completion endpoint.
//!
//! Only available with the `client` feature. The endpoint contract is a
//! JSON POST of the completion request and a JSON reply carrying the text
//! under `text` (or `content` for OpenAI-style gateways).

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ActionResolverError, Result};
use crate::resolver::ModelClient;
use crate::types::CompletionRequest;

#[derive(Clone)]
pub struct HttpModelClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpModelClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            return Err(ActionResolverError::ModelCall(format!(
                "model endpoint returned status {}: {}",
                status, err_text
            )));
        }

        let body: serde_json::Value = res.json().await?;
        body.get("text")
            .or_else(|| body.get("content"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ActionResolverError::ModelCall("reply carried no text field".to_string())
            })
    }
}
