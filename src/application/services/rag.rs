use tracing::{info, instrument};

use crate::application::services::{AnswerComposer, IngestionPipeline, RetrievalPipeline};
use crate::domain::{Answer, Document, DomainError, IngestReceipt, RetrievedContext};

/// Entry point for callers: the two boundary operations (ingest and query)
/// plus raw retrieval and per-source deletion.
pub struct RagService {
    ingestion: IngestionPipeline,
    retrieval: RetrievalPipeline,
    composer: AnswerComposer,
}

impl RagService {
    pub fn new(
        ingestion: IngestionPipeline,
        retrieval: RetrievalPipeline,
        composer: AnswerComposer,
    ) -> Self {
        Self {
            ingestion,
            retrieval,
            composer,
        }
    }

    pub async fn ingest(&self, document: &Document) -> Result<IngestReceipt, DomainError> {
        self.ingestion.ingest(document).await
    }

    pub async fn search(
        &self,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<RetrievedContext, DomainError> {
        let top_k = top_k.unwrap_or_else(|| self.retrieval.default_top_k());
        self.retrieval.retrieve(question, top_k).await
    }

    #[instrument(skip(self, question))]
    pub async fn query(&self, question: &str, top_k: Option<usize>) -> Result<Answer, DomainError> {
        let context = self.search(question, top_k).await?;
        let answer = self.composer.compose(question, &context).await?;

        info!(
            num_contexts = answer.num_contexts,
            sources = answer.sources.len(),
            "answered query"
        );
        Ok(answer)
    }

    pub async fn delete_source(&self, source_id: &str) -> Result<(), DomainError> {
        self.ingestion.remove_source(source_id).await
    }
}
