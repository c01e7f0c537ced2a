use crate::text_extractor::extract_text;
use domain::errors::RagError;
use domain::models::{RemoteFile, SourceDocument};
use domain::ports::StorageProvider;
use shared::utils::is_supported_mime_type;

pub const DEFAULT_MIN_TEXT_CHARS: usize = 20;

pub struct DocumentIngestor<'a, S> {
    storage: &'a S,
    min_text_chars: usize,
}

impl<'a, S: StorageProvider> DocumentIngestor<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self {
            storage,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
        }
    }

    pub fn with_min_text_chars(mut self, min_text_chars: usize) -> Self {
        self.min_text_chars = min_text_chars;
        self
    }

    /// Downloads and extracts every supported file, sequentially.
    /// Only a listing failure is an error; a bad file is logged and left out.
    pub async fn ingest(&self) -> Result<Vec<SourceDocument>, RagError> {
        let files = self.storage.list_files().await?;
        tracing::info!(listed = files.len(), "scanning remote files");

        let mut documents = Vec::new();
        for file in files {
            if !is_supported_mime_type(&file.mime_type) {
                tracing::debug!(name = %file.name, mime_type = %file.mime_type, "skipping unsupported file");
                continue;
            }
            match self.read_file(&file).await {
                Ok(text) if self.is_eligible(&text) => {
                    tracing::debug!(name = %file.name, chars = text.chars().count(), "document ingested");
                    documents.push(SourceDocument {
                        id: file.id,
                        name: file.name,
                        text,
                    });
                }
                Ok(_) => {
                    tracing::debug!(name = %file.name, "skipping file with too little text");
                }
                Err(err) => {
                    tracing::warn!(name = %file.name, id = %file.id, error = %err, "could not read file");
                }
            }
        }

        tracing::info!(eligible = documents.len(), "ingestion finished");
        Ok(documents)
    }

    fn is_eligible(&self, text: &str) -> bool {
        text.chars().count() > self.min_text_chars
    }

    async fn read_file(&self, file: &RemoteFile) -> Result<String, RagError> {
        let content = self.storage.download(file).await?;
        extract_text(&file.name, &content)
    }
}
