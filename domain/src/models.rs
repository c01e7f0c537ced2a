use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct DownloadedContent {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: String,
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    Document,
    Query,
}

/// Embedding of a document. A failed provider call is kept apart from a
/// vector that happens to be all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Embedding {
    Embedded(Vec<f32>),
    Unavailable,
}

impl Embedding {
    pub fn vector(&self) -> Option<&[f32]> {
        match self {
            Embedding::Embedded(vector) => Some(vector),
            Embedding::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Embedding::Embedded(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    pub text: String,
    pub embedding: Embedding,
}

impl DocumentRecord {
    pub fn new(source: SourceDocument, embedding: Embedding) -> Self {
        Self {
            id: source.id,
            name: source.name,
            text: source.text,
            embedding,
        }
    }

    pub fn web_link(&self) -> String {
        format!("https://drive.google.com/file/d/{}/view", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedResult<'a> {
    pub document: &'a DocumentRecord,
    pub score: f32,
}
