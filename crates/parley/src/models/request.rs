use std::path::PathBuf;

/// One inbound chat request. Created per call, immutable, discarded when the
/// response has been streamed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub text: String,
    pub document_path: Option<PathBuf>,
}

impl ChatRequest {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            document_path: None,
        }
    }

    pub fn with_document<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.document_path = Some(path.into());
        self
    }

    pub fn has_document(&self) -> bool {
        self.document_path.is_some()
    }
}
