use crate::answer_service::{AnswerService, DEFAULT_MAX_CONTEXT_CHARS};
use domain::errors::RagError;
use domain::models::RankedResult;
use domain::ports::{EmbeddingProvider, GenerationProvider, StorageProvider};
use domain::session::Corpus;
use infrastructure::config::Config;
use infrastructure::document_ingestor::{DocumentIngestor, DEFAULT_MIN_TEXT_CHARS};
use infrastructure::embedder::Embedder;
use infrastructure::search::SearchEngine;
use shared::telemetry::Telemetry;
use tokio::sync::OnceCell;

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RagSettings {
    pub top_k: usize,
    pub max_context_chars: usize,
    pub min_text_chars: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
        }
    }
}

impl RagSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_k: config.top_k,
            max_context_chars: config.max_context_chars,
            min_text_chars: config.min_text_chars,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSource {
    pub id: String,
    pub name: String,
    pub score: f32,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub question: String,
    pub sources: Vec<AnswerSource>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The query could not be matched (its embedding failed).
    NoMatches,
    Answered(Answer),
}

/// Retrieval and answering over one account's documents. The corpus is built
/// on first use and then shared read-only by every query.
pub struct RagService<S, E, G> {
    storage: S,
    embedder: Embedder<E>,
    answers: AnswerService<G>,
    settings: RagSettings,
    corpus: OnceCell<Corpus>,
}

impl<S, E, G> RagService<S, E, G>
where
    S: StorageProvider,
    E: EmbeddingProvider,
    G: GenerationProvider,
{
    pub fn new(storage: S, embedding: E, generation: G, settings: RagSettings) -> Self {
        Self {
            storage,
            embedder: Embedder::new(embedding),
            answers: AnswerService::new(generation)
                .with_max_context_chars(settings.max_context_chars),
            settings,
            corpus: OnceCell::new(),
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.corpus.initialized()
    }

    /// Builds the corpus once; concurrent callers wait for the first build.
    /// A failed build leaves nothing cached, so the next call tries again.
    pub async fn corpus(&self) -> Result<&Corpus, RagError> {
        self.corpus.get_or_try_init(|| self.build_corpus()).await
    }

    async fn build_corpus(&self) -> Result<Corpus, RagError> {
        let timer = Telemetry::new();
        let sources = DocumentIngestor::new(&self.storage)
            .with_min_text_chars(self.settings.min_text_chars)
            .ingest()
            .await?;
        if sources.is_empty() {
            tracing::error!("no eligible documents found");
            return Err(RagError::EmptyCorpus);
        }

        tracing::info!(documents = sources.len(), "generating embeddings");
        let records = self.embedder.embed_documents(sources).await;
        let corpus = Corpus::new(records)?;
        tracing::info!(
            documents = corpus.len(),
            unrankable = corpus.unrankable_count(),
            elapsed_ms = timer.elapsed_ms(),
            "corpus ready"
        );
        Ok(corpus)
    }

    pub async fn search(&self, question: &str) -> Result<Vec<RankedResult<'_>>, RagError> {
        self.search_top(question, self.settings.top_k).await
    }

    pub async fn search_top(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<RankedResult<'_>>, RagError> {
        let corpus = self.corpus().await?;
        let Some(query_vector) = self.embedder.embed_query(question).await else {
            return Ok(Vec::new());
        };
        SearchEngine::rank_documents(&query_vector, corpus.documents(), top_k)
    }

    pub async fn ask(&self, question: &str) -> Result<QueryOutcome, RagError> {
        let timer = Telemetry::new();
        let results = self.search(question).await?;
        if results.is_empty() {
            return Ok(QueryOutcome::NoMatches);
        }

        tracing::debug!(
            top = %results[0].document.name,
            score = results[0].score,
            "documents ranked"
        );
        let text = self.answers.compose(question, &results).await;
        let sources = results
            .iter()
            .map(|result| AnswerSource {
                id: result.document.id.clone(),
                name: result.document.name.clone(),
                score: result.score,
                link: result.document.web_link(),
            })
            .collect();
        tracing::info!(elapsed_ms = timer.elapsed_ms(), "question answered");

        Ok(QueryOutcome::Answered(Answer {
            question: question.to_string(),
            sources,
            text,
        }))
    }
}
