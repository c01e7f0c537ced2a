use domain::errors::RagError;
use domain::models::{DocumentRecord, Embedding, SourceDocument, TaskType};
use domain::ports::EmbeddingProvider;

/// A failed document is stored as `Embedding::Unavailable` instead of aborting the batch.
pub struct Embedder<E> {
    provider: E,
}

impl<E: EmbeddingProvider> Embedder<E> {
    pub fn new(provider: E) -> Self {
        Self { provider }
    }

    pub async fn embed_documents(&self, documents: Vec<SourceDocument>) -> Vec<DocumentRecord> {
        let mut records = Vec::with_capacity(documents.len());
        for (index, document) in documents.into_iter().enumerate() {
            tracing::debug!(index, name = %document.name, "embedding document");
            let embedding = match self.embed_checked(&document.text, TaskType::Document).await {
                Ok(vector) => Embedding::Embedded(vector),
                Err(err) => {
                    tracing::warn!(
                        name = %document.name,
                        id = %document.id,
                        error = %err,
                        "embedding failed; document will not be ranked"
                    );
                    Embedding::Unavailable
                }
            };
            records.push(DocumentRecord::new(document, embedding));
        }
        records
    }

    /// `None` when the provider fails; the caller reports the query as unmatched.
    pub async fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        match self.embed_checked(query, TaskType::Query).await {
            Ok(vector) => Some(vector),
            Err(err) => {
                tracing::warn!(error = %err, "query embedding failed");
                None
            }
        }
    }

    async fn embed_checked(&self, text: &str, task: TaskType) -> Result<Vec<f32>, RagError> {
        let vector = self.provider.embed(text, task).await?;
        let expected = self.provider.dimensions();
        if vector.len() != expected {
            return Err(RagError::Embedding(format!(
                "provider returned {} dimensions, expected {expected}",
                vector.len()
            )));
        }
        Ok(vector)
    }
}
