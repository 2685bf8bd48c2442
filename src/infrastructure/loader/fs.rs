use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{ports::DocumentLoader, Document, DomainError};

/// Extensions accepted by the loader, compared case-insensitively. PDFs go
/// through text extraction; everything else must be UTF-8 text.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "markdown", "text"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Pdf,
    Text,
}

#[derive(Debug, Clone, Default)]
pub struct FileDocumentLoader;

impl FileDocumentLoader {
    pub fn new() -> Self {
        Self
    }

    fn format(name: &str) -> Result<Format, DomainError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Ok(Format::Pdf),
            Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext) => Ok(Format::Text),
            _ => Err(DomainError::document_load(format!(
                "unsupported document type '{name}', expected one of: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            ))),
        }
    }

    fn decode(name: &str, format: Format, bytes: &[u8]) -> Result<String, DomainError> {
        match format {
            Format::Pdf => pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
                DomainError::document_load(format!("failed to extract text from '{name}': {e}"))
            }),
            Format::Text => String::from_utf8(bytes.to_vec()).map_err(|_| {
                DomainError::document_load(format!("'{name}' is not valid UTF-8 text"))
            }),
        }
    }

    fn resolve_source_id(default: &str, source_id: Option<&str>) -> String {
        source_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(default)
            .to_string()
    }
}

#[async_trait]
impl DocumentLoader for FileDocumentLoader {
    async fn load_path(
        &self,
        path: &Path,
        source_id: Option<&str>,
    ) -> Result<Document, DomainError> {
        let name = path.to_string_lossy().to_string();
        let format = Self::format(&name)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::document_load(format!("failed to read '{name}': {e}")))?;

        // PDF parsing is CPU-bound.
        let text = {
            let name = name.clone();
            tokio::task::spawn_blocking(move || Self::decode(&name, format, &bytes))
                .await
                .map_err(|e| DomainError::document_load(format!("loader task failed: {e}")))??
        };

        debug!(path = %name, ?format, chars = text.len(), "loaded document");
        Ok(Document::new(Self::resolve_source_id(&name, source_id), text))
    }

    fn load_bytes(
        &self,
        name: &str,
        bytes: &[u8],
        source_id: Option<&str>,
    ) -> Result<Document, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::document_load("uploaded file has no name"));
        }
        let format = Self::format(name)?;
        let text = Self::decode(name, format, bytes)?;

        Ok(Document::new(Self::resolve_source_id(name, source_id), text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Single-page PDF showing `text` in a standard Type1 font.
    fn pdf_bytes(text: &str) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[tokio::test]
    async fn test_load_path_uses_path_as_source_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\n\nParis is the capital of France.").unwrap();

        let doc = FileDocumentLoader::new().load_path(&path, None).await.unwrap();

        assert_eq!(doc.source_id, path.to_string_lossy());
        assert!(doc.text.contains("Paris"));
    }

    #[tokio::test]
    async fn test_load_path_with_explicit_source_id() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "hello").unwrap();

        let doc = FileDocumentLoader::new()
            .load_path(file.path(), Some("custom"))
            .await
            .unwrap();

        assert_eq!(doc.source_id, "custom");
        assert_eq!(doc.text, "hello");
    }

    #[tokio::test]
    async fn test_load_pdf_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, pdf_bytes("Quarterly revenue grew")).unwrap();

        let doc = FileDocumentLoader::new().load_path(&path, None).await.unwrap();

        assert_eq!(doc.source_id, path.to_string_lossy());
        assert!(doc.text.contains("Quarterly revenue grew"));
    }

    #[test]
    fn test_load_pdf_upload() {
        let doc = FileDocumentLoader::new()
            .load_bytes("Slides.PDF", &pdf_bytes("Cats are mammals"), None)
            .unwrap();

        assert_eq!(doc.source_id, "Slides.PDF");
        assert!(doc.text.contains("Cats are mammals"));
    }

    #[test]
    fn test_corrupt_pdf_is_load_error() {
        let err = FileDocumentLoader::new()
            .load_bytes("broken.pdf", b"this is not a pdf document", None)
            .unwrap_err();

        assert!(matches!(err, DomainError::DocumentLoad(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileDocumentLoader::new()
            .load_path(&dir.path().join("absent.txt"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::DocumentLoad(_)));
    }

    #[tokio::test]
    async fn test_non_utf8_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = FileDocumentLoader::new()
            .load_path(&path, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::DocumentLoad(_)));
    }

    #[test]
    fn test_load_bytes_uses_file_name() {
        let doc = FileDocumentLoader::new()
            .load_bytes("Report.TXT", b"quarterly numbers", None)
            .unwrap();

        assert_eq!(doc.source_id, "Report.TXT");
        assert_eq!(doc.text, "quarterly numbers");
    }

    #[test]
    fn test_unsupported_extension() {
        let loader = FileDocumentLoader::new();

        assert!(matches!(
            loader.load_bytes("archive.zip", b"PK", None),
            Err(DomainError::DocumentLoad(_))
        ));
        assert!(matches!(
            loader.load_bytes("README", b"text", None),
            Err(DomainError::DocumentLoad(_))
        ));
    }
}
