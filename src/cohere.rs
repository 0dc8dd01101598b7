use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::generation::{GenerationClient, GenerationError, GenerationRequest};

#[derive(Serialize)]
struct ChatBody<'a> {
    message: &'a str,
    model: &'a str,
    preamble: &'a str,
}

/// [`GenerationClient`] backed by a Cohere-style chat endpoint.
///
/// Speaks `POST {base}/v1/chat` with `{message, model, preamble}` and reads
/// the `text` field of the JSON reply. The API key comes from configuration;
/// it is never baked into the crate.
#[derive(Clone)]
pub struct CohereClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CohereClient {
    /// Creates a new client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, api_key)
    }

    /// Creates a new client reusing an existing [`reqwest::Client`].
    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Base URL the client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationClient for CohereClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatBody {
            message: &request.message,
            model: &request.model,
            preamble: &request.preamble,
        };
        let response = self
            .http
            .post(format!("{}/v1/chat", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let reply: Value = response.json().await?;
        let text = reply
            .get("text")
            .and_then(Value::as_str)
            .ok_or(GenerationError::MalformedResponse)?;
        debug!(model = %request.model, chars = text.len(), "generation reply");
        Ok(text.to_string())
    }
}
