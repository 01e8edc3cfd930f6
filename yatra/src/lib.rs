pub mod api;
pub mod chat;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod knowledge;
pub mod llm;
pub mod models;
pub mod rag;
pub mod vector;
