pub mod chunking;
pub mod entities;
pub mod errors;
pub mod ports;

pub use chunking::{Chunker, ChunkingConfig, ChunkingStrategy};
pub use entities::*;
pub use errors::{DomainError, Result};
