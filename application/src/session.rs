use crate::rag_service::{RagService, RagSettings};
use domain::ports::{EmbeddingProvider, GenerationProvider, StorageProvider};
use domain::session::AccountInfo;

/// Everything that belongs to one login. Dropping it discards the corpus, so
/// logging in again always re-ingests.
pub struct Session<S, E, G> {
    account: AccountInfo,
    rag: RagService<S, E, G>,
}

impl<S, E, G> Session<S, E, G>
where
    S: StorageProvider,
    E: EmbeddingProvider,
    G: GenerationProvider,
{
    pub async fn open(storage: S, embedding: E, generation: G, settings: RagSettings) -> Self {
        let account = match storage.account_info().await {
            Ok(account) => account,
            Err(err) => {
                tracing::warn!(error = %err, "could not read account details");
                AccountInfo::unknown()
            }
        };
        tracing::info!(account = %account.email, "session opened");
        Self {
            account,
            rag: RagService::new(storage, embedding, generation, settings),
        }
    }

    pub fn account(&self) -> &AccountInfo {
        &self.account
    }

    pub fn rag(&self) -> &RagService<S, E, G> {
        &self.rag
    }

    pub fn close(self) {
        tracing::info!(account = %self.account.email, "session closed");
    }
}
