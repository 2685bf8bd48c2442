mod answer;
mod ingestion;
mod rag;
mod retrieval;

pub use answer::{AnswerComposer, AnswerPrompts};
pub use ingestion::IngestionPipeline;
pub use rag::RagService;
pub use retrieval::RetrievalPipeline;
