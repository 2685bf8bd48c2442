use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    DomainError, RetrievedContext,
};

pub struct RetrievalPipeline {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    default_top_k: usize,
}

impl RetrievalPipeline {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            default_top_k,
        }
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    #[instrument(skip(self, question))]
    pub async fn retrieve(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<RetrievedContext, DomainError> {
        if question.trim().is_empty() {
            return Err(DomainError::invalid_argument("question must not be empty"));
        }
        if top_k == 0 {
            return Err(DomainError::invalid_argument("top_k must be greater than zero"));
        }

        let query = self.embedding.embed(question).await?;
        let mut results = self.vector_store.search(&query, top_k).await?;
        results.truncate(top_k);

        let context = RetrievedContext::from_points(&results);
        debug!(
            hits = results.len(),
            num_contexts = context.contexts.len(),
            "retrieved context"
        );
        Ok(context)
    }
}
