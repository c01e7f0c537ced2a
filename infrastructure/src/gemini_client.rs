use crate::config::Config;
use domain::errors::RagError;
use domain::models::TaskType;
use domain::ports::{EmbeddingProvider, GenerationProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content,
    task_type: &'static str,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn task_type_name(task: TaskType) -> &'static str {
    match task {
        TaskType::Document => "RETRIEVAL_DOCUMENT",
        TaskType::Query => "RETRIEVAL_QUERY",
    }
}

fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn user_content(text: &str) -> Content {
    Content {
        role: Some("user".to_string()),
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    embedding_model: String,
    generation_model: String,
    dimensions: usize,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            embedding_model: model_path(&config.embedding_model),
            generation_model: model_path(&config.generation_model),
            dimensions: config.embedding_dimensions,
        }
    }

    pub async fn embed_content(&self, text: &str, task: TaskType) -> Result<Vec<f32>, RagError> {
        let url = format!("{}/v1beta/{}:embedContent", self.base_url, self.embedding_model);
        let request = EmbedContentRequest {
            model: &self.embedding_model,
            content: Content {
                role: None,
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
            task_type: task_type_name(task),
        };
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!("Gemini API error {status}: {body}")));
        }
        let embedding_response: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;
        Ok(embedding_response.embedding.values)
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String, RagError> {
        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.base_url, self.generation_model
        );
        let request = GenerateContentRequest {
            contents: vec![user_content(prompt)],
        };
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Generation(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RagError::Generation(e.to_string()))?;
        if !status.is_success() {
            return Err(RagError::Generation(format!("Gemini API error {status}: {text}")));
        }
        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| RagError::Generation(e.to_string()))?;
        Ok(first_candidate_text(parsed))
    }
}

fn first_candidate_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

impl EmbeddingProvider for GeminiClient {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str, task: TaskType) -> Result<Vec<f32>, RagError> {
        self.embed_content(text, task).await
    }
}

impl GenerationProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        self.generate_content(prompt).await
    }
}
