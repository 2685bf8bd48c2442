//! Application layer - Use cases and orchestration.
//!
//! Pipelines here depend on domain ports (traits) rather than concrete
//! adapters, so the same code runs against Qdrant or the in-memory store.

pub mod services;

pub use services::{
    AnswerComposer, AnswerPrompts, IngestionPipeline, RagService, RetrievalPipeline,
};
