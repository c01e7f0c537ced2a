use domain::errors::RagError;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub embedding_dimensions: usize,
    pub client_secret_path: PathBuf,
    pub token_path: PathBuf,
    pub drive_base_url: String,
    pub drive_page_size: u32,
    pub top_k: usize,
    pub max_context_chars: usize,
    pub min_text_chars: usize,
}

impl Config {
    pub fn load() -> Result<Self, RagError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RagError> {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RagError::Config("GEMINI_API_KEY is not set".to_string()))?;

        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let top_k = parsed(&lookup, "RAG_TOP_K", 3)?;
        if top_k == 0 {
            return Err(RagError::Config("RAG_TOP_K must be at least 1".to_string()));
        }

        Ok(Self {
            gemini_api_key,
            gemini_base_url: text(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            embedding_model: text("GEMINI_EMBEDDING_MODEL", "models/text-embedding-004"),
            generation_model: text("GEMINI_GENERATION_MODEL", "gemini-2.0-flash-exp"),
            embedding_dimensions: parsed(&lookup, "EMBEDDING_DIMENSIONS", 768)?,
            client_secret_path: text("GOOGLE_CLIENT_SECRET_PATH", "client_secret.json").into(),
            token_path: text("DRIVE_TOKEN_PATH", "token.json").into(),
            drive_base_url: text("DRIVE_API_BASE_URL", "https://www.googleapis.com/drive/v3"),
            drive_page_size: parsed(&lookup, "DRIVE_PAGE_SIZE", 100)?,
            top_k,
            max_context_chars: parsed(&lookup, "RAG_MAX_CONTEXT_CHARS", 8000)?,
            min_text_chars: parsed(&lookup, "RAG_MIN_TEXT_CHARS", 20)?,
        })
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, RagError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RagError::Config(format!("{key} has an invalid value: {raw:?}"))),
    }
}
