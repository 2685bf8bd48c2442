mod fs;

pub use fs::{FileDocumentLoader, SUPPORTED_EXTENSIONS};
