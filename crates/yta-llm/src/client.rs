//! Anthropic Messages API client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, info, warn};

use crate::config::{AnthropicConfig, ANTHROPIC_VERSION};
use crate::error::{LlmError, LlmResult};
use crate::metrics;
use crate::types::{Completion, CompletionRequest, Message, MessagesRequest, MessagesResponse};
use crate::LanguageModel;

/// Client for the Anthropic Messages API with model fallback.
pub struct AnthropicClient {
    http: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> LlmResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("yta-llm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> LlmResult<Self> {
        Self::new(AnthropicConfig::from_env())
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Call one model, retrying transient failures with exponential backoff.
    async fn call_with_retry(&self, model: &str, request: &CompletionRequest) -> LlmResult<Completion> {
        let mut attempt = 0;
        loop {
            match self.call_messages_api(model, request).await {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let backoff = backoff_delay(self.config.retry_base_delay, attempt);
                    let delay = e
                        .retry_after_ms()
                        .map(Duration::from_millis)
                        .unwrap_or(backoff);
                    warn!(
                        model,
                        label = %request.label,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Anthropic request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_messages_api(&self, model: &str, request: &CompletionRequest) -> LlmResult<Completion> {
        let url = format!("{}/v1/messages", self.config.base_url);
        let body = MessagesRequest {
            model,
            max_tokens: request.max_tokens,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        debug!(model, label = %request.label, prompt_chars = request.prompt.chars().count(), "Sending messages request");

        let start = Instant::now();
        let result = self.send(&url, &body).await;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(_) => metrics::record_call(model, &request.label, "ok", latency_ms),
            Err(e) => {
                metrics::record_call(model, &request.label, "error", latency_ms);
                metrics::record_failure(model, &request.label, e.kind());
            }
        }

        let response = result?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        let usage = response.usage.unwrap_or_default();
        metrics::record_tokens(model, usage.input_tokens, usage.output_tokens);

        let completion = Completion {
            text,
            model: if response.model.is_empty() {
                model.to_string()
            } else {
                response.model
            },
            stop_reason: response.stop_reason,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
        };

        if completion.is_truncated() {
            warn!(model, label = %request.label, "Model output hit max_tokens and may be truncated");
        }

        Ok(completion)
    }

    async fn send(&self, url: &str, body: &MessagesRequest<'_>) -> LlmResult<MessagesResponse> {
        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_http_status(
                status.as_u16(),
                error_text,
                retry_after_ms,
            ));
        }

        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| LlmError::parse(format!("invalid messages response: {}", e)))
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<Completion> {
        if !self.config.is_configured() {
            return Err(LlmError::config("ANTHROPIC_API_KEY is not set"));
        }

        let mut last_error = None;

        for model in self.config.models() {
            info!(model, label = %request.label, "Attempting Anthropic API");
            match self.call_with_retry(model, &request).await {
                Ok(completion) => {
                    info!(
                        model,
                        label = %request.label,
                        output_tokens = completion.output_tokens,
                        "Completion received"
                    );
                    return Ok(completion);
                }
                Err(e) if !e.allows_fallback() => return Err(e),
                Err(e) => {
                    warn!(model, label = %request.label, error = %e, "Model failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(LlmError::EmptyResponse))
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}

/// Doubling delay for the given attempt, saturating instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
