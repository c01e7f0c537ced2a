//! In-memory providers for exercising ingestion, ranking and answering
//! without network access.

use domain::errors::RagError;
use domain::models::{DownloadedContent, RemoteFile, TaskType};
use domain::ports::{EmbeddingProvider, GenerationProvider, StorageProvider};
use domain::session::AccountInfo;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PDF: &str = "application/pdf";
pub const TEXT: &str = "text/plain";
pub const GOOGLE_DOC: &str = "application/vnd.google-apps.document";

#[derive(Clone)]
enum FakeFile {
    Content(DownloadedContent),
    Broken,
}

#[derive(Clone, Default)]
pub struct FakeStorage {
    files: Vec<(RemoteFile, FakeFile)>,
    listing_fails: bool,
    account: Option<AccountInfo>,
    list_calls: Arc<AtomicUsize>,
    downloads: Arc<AtomicUsize>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A file whose download yields `text` as `text/plain`.
    pub fn with_text(self, id: &str, name: &str, text: &str) -> Self {
        self.with_file(id, name, TEXT, TEXT, text.as_bytes())
    }

    /// `listed_mime` is what the listing reports, `delivered_mime` what the download carries.
    pub fn with_file(
        mut self,
        id: &str,
        name: &str,
        listed_mime: &str,
        delivered_mime: &str,
        bytes: &[u8],
    ) -> Self {
        self.files.push((
            remote(id, name, listed_mime),
            FakeFile::Content(DownloadedContent {
                mime_type: delivered_mime.to_string(),
                bytes: bytes.to_vec(),
            }),
        ));
        self
    }

    pub fn with_broken(mut self, id: &str, name: &str, mime_type: &str) -> Self {
        self.files.push((remote(id, name, mime_type), FakeFile::Broken));
        self
    }

    pub fn with_account(mut self, name: &str, email: &str) -> Self {
        self.account = Some(AccountInfo {
            name: name.to_string(),
            email: email.to_string(),
        });
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

fn remote(id: &str, name: &str, mime_type: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: mime_type.to_string(),
    }
}

impl StorageProvider for FakeStorage {
    async fn list_files(&self) -> Result<Vec<RemoteFile>, RagError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers really overlap.
        tokio::task::yield_now().await;
        if self.listing_fails {
            return Err(RagError::Storage("listing unavailable".to_string()));
        }
        Ok(self.files.iter().map(|(file, _)| file.clone()).collect())
    }

    async fn download(&self, file: &RemoteFile) -> Result<DownloadedContent, RagError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        match self.files.iter().find(|(f, _)| f.id == file.id) {
            Some((_, FakeFile::Content(content))) => Ok(content.clone()),
            Some((_, FakeFile::Broken)) => Err(RagError::Storage("download failed".to_string())),
            None => Err(RagError::Storage(format!("no file {}", file.id))),
        }
    }

    async fn account_info(&self) -> Result<AccountInfo, RagError> {
        self.account
            .clone()
            .ok_or_else(|| RagError::Storage("about endpoint unavailable".to_string()))
    }
}

/// Vectors are scripted per exact input text; unscripted text fails like a
/// provider error would.
#[derive(Clone)]
pub struct FakeEmbedder {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
    calls: Arc<AtomicUsize>,
}

impl FakeEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_vector(mut self, text: &str, vector: &[f32]) -> Self {
        self.vectors.insert(text.to_string(), vector.to_vec());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for FakeEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str, _task: TaskType) -> Result<Vec<f32>, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| RagError::Embedding(format!("no vector for {text:?}")))
    }
}

#[derive(Clone, Default)]
pub struct FakeGenerator {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl GenerationProvider for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply
            .clone()
            .ok_or_else(|| RagError::Generation("service unavailable".to_string()))
    }
}
