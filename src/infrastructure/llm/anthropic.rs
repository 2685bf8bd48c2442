use std::time::Duration;

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::anthropic;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;
use crate::infrastructure::llm::{require_key, with_timeout};

const MAX_TOKENS: u64 = 1024;

pub struct AnthropicLlm {
    client: anthropic::Client,
    model: String,
    timeout: Duration,
}

impl AnthropicLlm {
    pub fn from_config(config: &LlmConfig) -> Result<Self, DomainError> {
        require_key("ANTHROPIC_API_KEY")?;

        Ok(Self {
            client: anthropic::Client::from_env(),
            model: config.model.clone(),
            timeout: config.timeout(),
        })
    }
}

#[async_trait]
impl LlmService for AnthropicLlm {
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .max_tokens(MAX_TOKENS)
            .build();

        with_timeout(self.timeout, agent.prompt(prompt)).await
    }
}
