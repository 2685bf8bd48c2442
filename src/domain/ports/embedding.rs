use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Maps texts to vectors, one per input, in input order.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("No embedding returned"))
    }
}
