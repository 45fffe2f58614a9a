//! Text extraction from an uploaded PDF. Parsing is CPU-bound and synchronous
//! in `pdf-extract`, so it runs on the blocking pool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::provider::CapabilityProvider;
use super::CapabilityName;
use crate::models::{CapabilityOutput, CapabilityPayload, DocumentText};

pub struct DocumentProvider;

#[derive(Debug, Deserialize)]
struct DocumentInput {
    #[serde(alias = "file_path", alias = "filePath")]
    path: PathBuf,
}

impl DocumentProvider {
    pub fn new() -> Self {
        Self
    }

    async fn extract(&self, path: PathBuf) -> Result<DocumentText, String> {
        if !path.exists() {
            return Err(format!("Document not found at path: {}", path.display()));
        }

        let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&path))
            .await
            .map_err(|e| format!("Failed to read document: {}", e))?
            .map_err(|e| format!("Failed to read document: {}", e))?;

        let content = pages.join("\n").trim().to_string();
        if content.is_empty() {
            return Err("Document appears to be empty or contains no extractable text".to_string());
        }

        tracing::debug!(pages = pages.len(), chars = content.len(), "extracted document text");

        Ok(DocumentText {
            content,
            pages: pages.len(),
        })
    }
}

impl Default for DocumentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityProvider for DocumentProvider {
    fn name(&self) -> CapabilityName {
        CapabilityName::DocumentRead
    }

    fn description(&self) -> &str {
        "Read and extract text from PDF files to answer questions about their content. The path parameter is the server path where the document is stored."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path"],
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the PDF file on the server"
                },
                "query": {
                    "type": "string",
                    "description": "What to look for in the document"
                }
            }
        })
    }

    async fn invoke(&self, input: Value) -> CapabilityOutput {
        let input: DocumentInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return CapabilityOutput::failure(format!("Invalid input: {}", e)),
        };

        match self.extract(input.path).await {
            Ok(document) => CapabilityOutput::success(CapabilityPayload::Document(document)),
            Err(error) => CapabilityOutput::failure(error),
        }
    }
}
