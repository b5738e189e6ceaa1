//! Completion provider client.
//!
//! Prose generation is an external capability: the engine hands over the
//! retrieved context and receives text to pair with the attribution. Two
//! implementations:
//!
//! - **[`DisabledCompletion`]** — returns errors; used when generation is
//!   not configured.
//! - **[`OpenAiCompletion`]** — calls the OpenAI chat completions API.
//!   Requires the `OPENAI_API_KEY` environment variable.
//!
//! No retries here: a failed completion is surfaced verbatim rather than
//! silently retried or swallowed into an empty answer.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::CompletionConfig;

/// The external generation collaborator, consumed as a capability.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o-mini"`).
    fn model_name(&self) -> &str;

    /// Turn the query and retrieved context into prose.
    async fn complete(&self, query: &str, context: &str) -> Result<String>;
}

/// Instantiate the provider matching the configuration.
pub fn create_provider(config: &CompletionConfig) -> Result<Box<dyn CompletionProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledCompletion)),
        "openai" => {
            let model = config
                .model
                .clone()
                .context("completion.model is required for the openai provider")?;
            Ok(Box::new(OpenAiCompletion::new(model, config.timeout_secs)?))
        }
        other => bail!("Unknown completion provider: {other}"),
    }
}

/// A no-op provider that always returns errors.
pub struct DisabledCompletion;

#[async_trait]
impl CompletionProvider for DisabledCompletion {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _query: &str, _context: &str) -> Result<String> {
        bail!("completion provider is disabled")
    }
}

/// Completion provider using the OpenAI chat completions API.
pub struct OpenAiCompletion {
    client: reqwest::Client,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(model: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build completion HTTP client")?;
        Ok(Self { client, model })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletion {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, query: &str, context: &str) -> Result<String> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable not set")?;

        let system = format!(
            "You are a teaching assistant. Answer the question using only the \
             provided course material. If the material does not cover the \
             question, say so.\n\nCourse material:\n{context}"
        );

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": query },
                ],
            }))
            .send()
            .await
            .context("completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("completion API returned HTTP {status}: {body}");
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .context("completion API returned an unreadable response")?;

        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .context("completion API response carried no message content")
    }
}
