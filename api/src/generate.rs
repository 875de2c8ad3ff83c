//! OpenAI-backed implementation of the core's `TextGenerator` trait.
//!
//! One request per plan, no retries: a timeout or error is handled by the
//! synthesizer's deterministic fallback, so retrying here would only delay
//! the reply.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use destress_core::plan::{GenerationError, TextGenerator};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Chat-completions client with a hard per-request timeout.
pub struct OpenAiGenerator {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "system", "content": prompt}],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status(status.as_u16()));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyCompletion)?;

        debug!(model = %self.model, chars = content.len(), "completion received");
        Ok(content)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Generator used when no API key is configured. Every call fails, which
/// routes every plan onto the deterministic fallback.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

/// Build the generator from the environment.
///
/// - `OPENAI_API_KEY` — required for live generation; absent/empty disables it
/// - `DESTRESS_OPENAI_BASE_URL` — default `https://api.openai.com/v1`
/// - `DESTRESS_OPENAI_MODEL` — default `gpt-3.5-turbo`
/// - `DESTRESS_GENERATION_TIMEOUT_MS` — default 15000
pub fn generator_from_env() -> Arc<dyn TextGenerator> {
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if api_key.trim().is_empty() {
        warn!("OPENAI_API_KEY not set; plans will use the deterministic fallback");
        return Arc::new(DisabledGenerator);
    }

    let base_url = std::env::var("DESTRESS_OPENAI_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let model =
        std::env::var("DESTRESS_OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let timeout_ms = std::env::var("DESTRESS_GENERATION_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_MS);

    match OpenAiGenerator::new(api_key, base_url, model, Duration::from_millis(timeout_ms)) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            warn!(error = %err, "failed to build generation client; plans will use the deterministic fallback");
            Arc::new(DisabledGenerator)
        }
    }
}
