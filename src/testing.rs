//! Deterministic doubles for the provider ports.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{
    ports::{EmbeddingService, LlmService},
    CollectionSpec, DistanceMetric, DomainError, Embedding,
};
use crate::infrastructure::InMemoryVectorStore;

pub const DIM: usize = 256;

pub fn memory_store() -> Arc<InMemoryVectorStore> {
    Arc::new(InMemoryVectorStore::new(CollectionSpec::new(
        "test",
        DIM,
        DistanceMetric::Cosine,
    )))
}

/// Bag-of-words embedder: each lowercase word is hashed into a bucket.
/// Texts sharing words score higher under cosine similarity.
pub struct HashEmbedder {
    dimension: usize,
    calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Embedding {
        let mut vec = vec![0.0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vec[(hasher.finish() % self.dimension as u64) as usize] += 1.0;
        }
        Embedding::new(vec)
    }
}

#[async_trait]
impl EmbeddingService for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingService for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Embedding>, DomainError> {
        Err(DomainError::embedding("provider unavailable"))
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

/// Answers from the first bulleted context line of the prompt, or declines
/// when there is none. Every `(system, prompt)` pair is recorded.
#[derive(Default)]
pub struct ScriptedLlm {
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedLlm {
    pub fn grounded() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));

        Ok(prompt
            .lines()
            .find_map(|line| line.strip_prefix("- "))
            .map(|fact| format!("Based on the context: {fact}"))
            .unwrap_or_else(|| "I don't have enough information to answer.".to_string()))
    }
}

pub struct FailingLlm;

#[async_trait]
impl LlmService for FailingLlm {
    async fn complete_with_system(
        &self,
        _system: &str,
        _prompt: &str,
    ) -> Result<String, DomainError> {
        Err(DomainError::generation("model unavailable"))
    }
}
