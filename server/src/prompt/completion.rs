use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    rate_limiters::RateLimiters,
    server_config::CompletionConfig,
    HttpClient,
};

use super::CompletionResponseOrError;

/// Fixed generation parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl From<&CompletionConfig> for CompletionParams {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            frequency_penalty: config.frequency_penalty,
            presence_penalty: config.presence_penalty,
        }
    }
}

#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Generates one completion for `prompt`.
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

#[derive(Debug, Clone)]
pub struct CompletionClient {
    http_client: HttpClient,
    endpoint: String,
    api_key: String,
    params: CompletionParams,
    rate_limiters: RateLimiters,
}

impl CompletionClient {
    pub fn new(http_client: HttpClient, config: &CompletionConfig) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/completions", config.api_uri.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            params: CompletionParams::from(config),
            rate_limiters: RateLimiters::new(config.rate_limit_per_sec),
        }
    }
}

#[async_trait]
impl CompletionEngine for CompletionClient {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.rate_limiters.acquire_one().await;

        let CompletionParams {
            model,
            max_tokens,
            temperature,
            top_p,
            frequency_penalty,
            presence_penalty,
        } = &self.params;

        let resp = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": model,
                "prompt": prompt,
                "max_tokens": max_tokens,
                "temperature": temperature,
                "top_p": top_p,
                "frequency_penalty": frequency_penalty,
                "presence_penalty": presence_penalty,
                "n": 1
            }))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.json::<serde_json::Value>().await?;
        let parsed = serde_json::from_value::<CompletionResponseOrError>(body.clone())
            .context(format!("Could not parse completion response: {}", body))?;

        let parsed = match parsed {
            CompletionResponseOrError::Error(error) => {
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    self.rate_limiters.trigger_backoff();
                    return Err(AppError::TooManyRequests);
                }
                return Err(AppError::ExternalService(format!(
                    "Completion API error ({}): {}",
                    status, error.error.message
                )));
            }
            CompletionResponseOrError::Response(parsed) => parsed,
        };

        if let Some(usage) = &parsed.usage {
            tracing::debug!("Completion used {} tokens", usage.total_tokens);
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .context("No choices in completion response")?;

        Ok(choice.text.trim().to_string())
    }
}
