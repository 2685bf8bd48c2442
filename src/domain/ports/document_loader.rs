use std::path::Path;

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Document};

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Reads the document at `path`; the path doubles as the default source id.
    async fn load_path(&self, path: &Path, source_id: Option<&str>)
        -> Result<Document, DomainError>;

    /// Decodes an uploaded file body; `name` is both the format hint and the
    /// default source id.
    fn load_bytes(
        &self,
        name: &str,
        bytes: &[u8],
        source_id: Option<&str>,
    ) -> Result<Document, DomainError>;
}
