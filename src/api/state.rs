use std::sync::Arc;

use tracing::info;

use crate::application::{AnswerComposer, IngestionPipeline, RagService, RetrievalPipeline};
use crate::domain::{
    ports::{DocumentLoader, EmbeddingService, VectorStore},
    Chunker, DomainError,
};
use crate::infrastructure::{
    build_llm, build_vector_store, AppConfig, FileDocumentLoader, TextEmbedding,
};

#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagService>,
    pub loader: Arc<dyn DocumentLoader>,
    pub vector_store: Arc<dyn VectorStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        rag: Arc<RagService>,
        loader: Arc<dyn DocumentLoader>,
        vector_store: Arc<dyn VectorStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            rag,
            loader,
            vector_store,
            config: Arc::new(config),
        }
    }

    /// Wires the pipelines around a single embedder and a single store
    /// handle so ingestion and retrieval share both.
    pub async fn from_config(config: AppConfig) -> Result<Self, DomainError> {
        let cfg = &config.config;

        let embedding: Arc<dyn EmbeddingService> =
            Arc::new(TextEmbedding::from_config(&cfg.embedding)?);
        let vector_store = build_vector_store(&cfg.vector_store, embedding.dimension()).await?;
        let llm = build_llm(&cfg.llm)?;

        let chunker = Chunker::new(cfg.chunking)?;
        let ingestion = IngestionPipeline::new(chunker, embedding.clone(), vector_store.clone())
            .with_replace_existing(cfg.rag.replace_existing);
        let retrieval = RetrievalPipeline::new(embedding, vector_store.clone(), cfg.rag.top_k);
        let composer = AnswerComposer::new(llm, config.prompts.answer.clone());

        info!(
            embedding_model = %cfg.embedding.model,
            llm_provider = ?cfg.llm.provider,
            llm_model = %cfg.llm.model,
            "rag service initialized"
        );

        let rag = Arc::new(RagService::new(ingestion, retrieval, composer));
        Ok(Self::new(
            rag,
            Arc::new(FileDocumentLoader::new()),
            vector_store,
            config,
        ))
    }
}
