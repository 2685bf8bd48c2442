use std::sync::Arc;

use serde::Deserialize;
use tracing::instrument;

use crate::domain::{ports::LlmService, Answer, DomainError, RetrievedContext};

/// Prompt templates for the answer step. `user` carries the `{context}` and
/// `{question}` placeholders.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    pub system: String,
    pub user: String,
    /// Grounding block used when retrieval found nothing.
    pub empty_context: String,
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant that answers questions based only on the \
                     provided context. If the context is empty or does not contain the answer, \
                     reply that you do not have enough information to answer."
                .to_string(),
            user: "Use the following context to answer the question.\n\n\
                   Context:\n{context}\n\n\
                   Question: {question}\n\
                   Answer concisely using the context above."
                .to_string(),
            empty_context: "(no relevant context was found)".to_string(),
        }
    }
}

impl AnswerPrompts {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.user.contains("{context}") || !self.user.contains("{question}") {
            return Err(DomainError::config(
                "answer user prompt must contain {context} and {question}",
            ));
        }
        Ok(())
    }
}

pub struct AnswerComposer {
    llm: Arc<dyn LlmService>,
    prompts: AnswerPrompts,
}

impl AnswerComposer {
    pub fn new(llm: Arc<dyn LlmService>, prompts: AnswerPrompts) -> Self {
        Self { llm, prompts }
    }

    /// Bulleted contexts in ranking order.
    pub fn grounding_block(&self, contexts: &[String]) -> String {
        if contexts.is_empty() {
            return self.prompts.empty_context.clone();
        }

        contexts
            .iter()
            .map(|c| format!("- {c}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Fills the user template. The question is substituted into the template
    /// only, never into retrieved text.
    pub fn build_prompt(&self, question: &str, context: &RetrievedContext) -> String {
        let block = self.grounding_block(&context.contexts);

        self.prompts
            .user
            .split("{context}")
            .map(|part| part.replace("{question}", question))
            .collect::<Vec<_>>()
            .join(&block)
    }

    #[instrument(skip(self, question, context), fields(num_contexts = context.contexts.len()))]
    pub async fn compose(
        &self,
        question: &str,
        context: &RetrievedContext,
    ) -> Result<Answer, DomainError> {
        let prompt = self.build_prompt(question, context);
        let answer = self
            .llm
            .complete_with_system(&self.prompts.system, &prompt)
            .await?;

        Ok(Answer {
            answer: answer.trim().to_string(),
            sources: context.sources.clone(),
            num_contexts: context.contexts.len(),
        })
    }
}
