use std::time::Duration;

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;
use crate::infrastructure::llm::{require_key, with_timeout};

pub struct OpenAiLlm {
    client: openai::Client,
    model: String,
    timeout: Duration,
}

impl OpenAiLlm {
    pub fn from_config(config: &LlmConfig) -> Result<Self, DomainError> {
        require_key("OPENAI_API_KEY")?;

        Ok(Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            timeout: config.timeout(),
        })
    }
}

#[async_trait]
impl LlmService for OpenAiLlm {
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        let agent = self.client.agent(&self.model).preamble(system).build();

        with_timeout(self.timeout, agent.prompt(prompt)).await
    }
}
