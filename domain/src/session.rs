use crate::errors::RagError;
use crate::models::DocumentRecord;
use serde::{Deserialize, Serialize};

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub name: String,
    pub email: String,
}

impl AccountInfo {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            email: UNKNOWN.to_string(),
        }
    }
}

/// The documents of one session. Fixed once built; queries only read it.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<DocumentRecord>,
}

impl Corpus {
    pub fn new(documents: Vec<DocumentRecord>) -> Result<Self, RagError> {
        if documents.is_empty() {
            return Err(RagError::EmptyCorpus);
        }
        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents whose embedding call failed; they always score 0.
    pub fn unrankable_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|doc| !doc.embedding.is_available())
            .count()
    }
}
