use std::time::Duration;

use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingModel;
use rig::providers::openai;
use tracing::debug;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;
use crate::infrastructure::llm::require_key;

/// OpenAI embeddings. Inputs are sent in batches of `batch_size`, and the
/// vectors come back in input order.
pub struct TextEmbedding {
    client: openai::Client,
    model: String,
    dimension: usize,
    batch_size: usize,
    timeout: Duration,
}

impl TextEmbedding {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        require_key("OPENAI_API_KEY")?;

        Ok(Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
            timeout: config.timeout(),
        })
    }
}

/// Checks a provider response against the request: one vector per input,
/// each of the configured dimension.
pub(crate) fn validate_embeddings(
    expected: usize,
    dimension: usize,
    vectors: Vec<Vec<f64>>,
) -> Result<Vec<Embedding>, DomainError> {
    if vectors.len() != expected {
        return Err(DomainError::embedding(format!(
            "expected {expected} embeddings, provider returned {}",
            vectors.len()
        )));
    }

    vectors
        .into_iter()
        .enumerate()
        .map(|(i, vec)| {
            if vec.len() != dimension {
                return Err(DomainError::embedding(format!(
                    "embedding {i} has dimension {}, expected {dimension}",
                    vec.len()
                )));
            }
            Ok(Embedding::new(vec.into_iter().map(|x| x as f32).collect()))
        })
        .collect()
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self
            .client
            .embedding_model_with_ndims(self.model.as_str(), self.dimension);

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let response = tokio::time::timeout(self.timeout, model.embed_texts(batch.to_vec()))
                .await
                .map_err(|_| DomainError::embedding("Embedding request timed out"))?
                .map_err(|e| DomainError::embedding(format!("Embedding request failed: {e}")))?;

            let vectors = response.into_iter().map(|emb| emb.vec).collect();
            embeddings.extend(validate_embeddings(batch.len(), self.dimension, vectors)?);
            debug!(batch = batch.len(), model = %self.model, "embedded batch");
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
