mod anthropic;
mod openai;

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::{LlmConfig, LlmProvider};

pub use anthropic::AnthropicLlm;
pub use openai::OpenAiLlm;

pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LlmService>, DomainError> {
    Ok(match config.provider {
        LlmProvider::OpenAi => Arc::new(OpenAiLlm::from_config(config)?),
        LlmProvider::Anthropic => Arc::new(AnthropicLlm::from_config(config)?),
    })
}

/// The rig provider clients panic on a missing key, so check it first.
pub(crate) fn require_key(var: &str) -> Result<(), DomainError> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        _ => Err(DomainError::config(format!("{var} must be set"))),
    }
}

pub(crate) async fn with_timeout<F, E>(timeout: Duration, request: F) -> Result<String, DomainError>
where
    F: IntoFuture<Output = Result<String, E>>,
    E: std::fmt::Display,
{
    tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| DomainError::generation("Completion timed out"))?
        .map_err(|e| DomainError::generation(format!("Completion failed: {e}")))
}
