use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, Embedding, Result};

/// Raw text of a source document, alive only for the duration of an ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source_id: String,
    pub text: String,
}

impl Document {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// Payload written alongside every stored vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub source_id: String,
    pub text: String,
}

impl ChunkPayload {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// Payload as read back from a store. Backends may hold points written by
/// other tools, so neither field is guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPayload {
    pub source_id: Option<String>,
    pub text: Option<String>,
}

impl PointPayload {
    /// Returns the payload only when both fields are present and non-empty.
    pub fn complete(&self) -> Option<(&str, &str)> {
        let source_id = self.source_id.as_deref().filter(|s| !s.is_empty())?;
        let text = self.text.as_deref().filter(|s| !s.is_empty())?;
        Some((source_id, text))
    }
}

impl From<ChunkPayload> for PointPayload {
    fn from(payload: ChunkPayload) -> Self {
        Self {
            source_id: Some(payload.source_id),
            text: Some(payload.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoint {
    pub id: String,
    pub vector: Embedding,
    pub payload: ChunkPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: PointPayload,
}

/// Deterministic point id for the chunk at `index` of `source_id`.
///
/// Name-based UUID (v5, URL namespace) over `"{source_id}-{index}"`, so
/// re-ingesting a source overwrites its previous points instead of
/// duplicating them.
pub fn point_id(source_id: &str, index: usize) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{source_id}-{index}").as_bytes()).to_string()
}

/// Zips the three parallel upsert sequences into points, rejecting batches
/// whose lengths disagree.
pub fn zip_points(
    ids: &[String],
    vectors: &[Embedding],
    payloads: &[ChunkPayload],
) -> Result<Vec<StoredPoint>> {
    if ids.len() != vectors.len() || ids.len() != payloads.len() {
        return Err(DomainError::invalid_argument(format!(
            "upsert batch misaligned: {} ids, {} vectors, {} payloads",
            ids.len(),
            vectors.len(),
            payloads.len()
        )));
    }

    Ok(ids
        .iter()
        .zip(vectors)
        .zip(payloads)
        .map(|((id, vector), payload)| StoredPoint {
            id: id.clone(),
            vector: vector.clone(),
            payload: payload.clone(),
        })
        .collect())
}
