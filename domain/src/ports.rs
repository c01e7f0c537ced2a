//! Seams to the external providers. Implementations live in `infrastructure`;
//! the integration tests substitute in-memory fakes.

use crate::errors::RagError;
use crate::models::{DownloadedContent, RemoteFile, TaskType};
use crate::session::AccountInfo;
use std::future::Future;

pub trait StorageProvider: Send + Sync {
    fn list_files(&self) -> impl Future<Output = Result<Vec<RemoteFile>, RagError>> + Send;

    fn download(
        &self,
        file: &RemoteFile,
    ) -> impl Future<Output = Result<DownloadedContent, RagError>> + Send;

    fn account_info(&self) -> impl Future<Output = Result<AccountInfo, RagError>> + Send;
}

pub trait EmbeddingProvider: Send + Sync {
    /// Dimensionality every returned vector must have.
    fn dimensions(&self) -> usize;

    fn embed(
        &self,
        text: &str,
        task: TaskType,
    ) -> impl Future<Output = Result<Vec<f32>, RagError>> + Send;
}

pub trait GenerationProvider: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, RagError>> + Send;
}
