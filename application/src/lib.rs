pub mod answer_service;
pub mod auth_service;
pub mod rag_service;
pub mod session;
