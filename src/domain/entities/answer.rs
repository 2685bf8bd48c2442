use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ScoredPoint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub ingested: String,
}

/// Search results reduced to what the answer step needs.
///
/// `contexts` keeps ranking order and may repeat; `sources` is deduplicated
/// and its order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub contexts: Vec<String>,
    pub sources: Vec<String>,
}

impl RetrievedContext {
    /// Walks results in ranking order, dropping any whose payload lacks a
    /// source id or text.
    pub fn from_points(points: &[ScoredPoint]) -> Self {
        let mut contexts = Vec::with_capacity(points.len());
        let mut sources = Vec::new();
        let mut seen = HashSet::new();

        for point in points {
            let Some((source_id, text)) = point.payload.complete() else {
                tracing::warn!(point_id = %point.id, "skipping search result with incomplete payload");
                continue;
            };

            contexts.push(text.to_string());
            if seen.insert(source_id) {
                sources.push(source_id.to_string());
            }
        }

        Self { contexts, sources }
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<String>,
    pub num_contexts: usize,
}
