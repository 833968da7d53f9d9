//! Text-generation collaborator: trait seam plus the chat-completions
//! HTTP client. One request per call, no retries, no streaming.

use adpilot_core::config::{GenAiConfig, HttpConfig};
use adpilot_core::{PipelineError, PipelineResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Opaque text generator. Implementations must not retain state between
/// invocations.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> PipelineResult<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client (OpenAI-style API).
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(genai: &GenAiConfig, http_cfg: &HttpConfig) -> PipelineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(http_cfg.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Ok(Self::with_client(http, genai))
    }

    pub fn with_client(http: reqwest::Client, genai: &GenAiConfig) -> Self {
        Self {
            http,
            base_url: genai.base_url.clone(),
            api_key: genai.api_key.clone(),
            model: genai.model.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, prompt: &str) -> PipelineResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Requesting text generation");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        let status = response.status();
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(PipelineError::Generation(err.message));
        }
        if !status.is_success() {
            return Err(PipelineError::Generation(format!(
                "generation service returned HTTP {status}"
            )));
        }

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(PipelineError::Generation(
                "generation service returned an empty completion".to_string(),
            ));
        }

        Ok(text)
    }
}
