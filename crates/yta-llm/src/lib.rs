//! Language model client for the YouTube analyzer.
//!
//! Wraps the Anthropic Messages API behind the [`LanguageModel`] trait so the
//! analysis pipeline can be driven by a scripted model in tests.

pub mod client;
pub mod config;
pub mod error;
pub mod json;
pub mod metrics;
pub mod types;

use async_trait::async_trait;

pub use client::AnthropicClient;
pub use config::AnthropicConfig;
pub use error::{LlmError, LlmResult};
pub use json::extract_json;
pub use types::{Completion, CompletionRequest};

/// A text-completion model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a single-turn prompt and return the model's text.
    async fn complete(&self, request: CompletionRequest) -> LlmResult<Completion>;

    /// False when the model cannot be called (e.g. no API key).
    fn is_configured(&self) -> bool {
        true
    }
}
