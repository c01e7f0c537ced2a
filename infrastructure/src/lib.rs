pub mod config;
pub mod document_ingestor;
pub mod drive_client;
pub mod embedder;
pub mod gemini_client;
pub mod oauth;
pub mod search;
pub mod text_extractor;
