//! # echomap-inference
//!
//! Embedding backends for the echomap recommendation engine.
//!
//! This crate provides:
//! - Ollama `/api/embed` implementation of [`EmbeddingBackend`] (default)
//! - Deterministic mock backend (feature `mock`, always on in tests)
//!
//! # Example
//!
//! ```rust,no_run
//! use echomap_inference::OllamaBackend;
//! use echomap_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OllamaBackend::from_env();
//!     let texts = vec!["上海 茶馆".to_string()];
//!     let embeddings = backend.embed_texts(&texts).await.unwrap();
//! }
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

// Mock embedding backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use echomap_core::*;

#[cfg(feature = "ollama")]
pub use ollama::OllamaBackend;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbeddingBackend, MockFailure};
