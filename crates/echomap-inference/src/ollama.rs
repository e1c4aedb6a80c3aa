//! Ollama embedding backend.
//!
//! Only the `/api/embed` endpoint is used: the recommendation engine embeds
//! the caller's context text and ranks stored embeddings against it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use echomap_core::{EmbeddingBackend, Error, Result, Vector};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = echomap_core::defaults::OLLAMA_URL;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = echomap_core::defaults::EMBED_MODEL;

/// Default embedding dimension for nomic-embed-text.
pub const DEFAULT_DIMENSION: usize = echomap_core::defaults::EMBED_DIMENSION;

/// Default per-request timeout (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = echomap_core::defaults::EMBED_TIMEOUT_SECS;

/// Embedding calls slower than this are logged at WARN.
const SLOW_EMBED_MS: u64 = 2000;

/// Ollama embedding backend.
///
/// Endpoint and model come from `OLLAMA_BASE` / `OLLAMA_EMBED_MODEL`. The
/// vector dimension and request timeout are engine settings and are passed
/// in with [`OllamaBackend::with_dimension`] and [`OllamaBackend::with_timeout`].
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    embed_model: String,
    dimension: usize,
    timeout: Duration,
}

impl OllamaBackend {
    /// Create a new Ollama backend with default settings.
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_OLLAMA_URL.to_string(),
            DEFAULT_EMBED_MODEL.to_string(),
            DEFAULT_DIMENSION,
        )
    }

    /// Create a new Ollama backend with custom configuration.
    pub fn with_config(base_url: String, embed_model: String, dimension: usize) -> Self {
        info!(
            subsystem = "inference",
            component = "ollama",
            model = %embed_model,
            dimension,
            "Initializing Ollama backend: url={}",
            base_url
        );

        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            embed_model,
            dimension,
            timeout: Duration::from_secs(EMBED_TIMEOUT_SECS),
        }
    }

    /// Create from `OLLAMA_BASE` and `OLLAMA_EMBED_MODEL`.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_BASE").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let embed_model =
            std::env::var("OLLAMA_EMBED_MODEL").unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());

        Self::with_config(base_url, embed_model, DEFAULT_DIMENSION)
    }

    /// Expected length of returned vectors.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Upper bound on a single `/api/embed` request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingBackend for OllamaBackend {
    #[instrument(skip(self, texts), fields(subsystem = "inference", component = "ollama", op = "embed_texts", model = %self.embed_model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();

        let request = EmbeddingRequest {
            model: self.embed_model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::EmbeddingUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmbeddingUnavailable(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| {
            Error::EmbeddingUnavailable(format!("Failed to parse response: {}", e))
        })?;

        if result.embeddings.len() != texts.len() {
            return Err(Error::EmbeddingUnavailable(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                result.embeddings.len()
            )));
        }

        let vectors: Vec<Vector> = result.embeddings.into_iter().map(Vector::from).collect();
        let elapsed = start.elapsed().as_millis() as u64;

        debug!(
            result_count = vectors.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > SLOW_EMBED_MS {
            warn!(
                duration_ms = elapsed,
                input_count = texts.len(),
                slow = true,
                "Slow embedding operation"
            );
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.embed_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_OLLAMA_URL, "http://127.0.0.1:11434");
        assert_eq!(DEFAULT_EMBED_MODEL, "nomic-embed-text");
        assert_eq!(DEFAULT_DIMENSION, 768);
        assert_eq!(EMBED_TIMEOUT_SECS, 5);
    }

    #[test]
    fn test_custom_config() {
        let backend = OllamaBackend::with_config(
            "http://custom:1234/".to_string(),
            "custom-embed".to_string(),
            512,
        );
        assert_eq!(backend.base_url(), "http://custom:1234");
        assert_eq!(backend.model_name(), "custom-embed");
        assert_eq!(backend.dimension(), 512);
    }

    #[test]
    fn test_dimension_and_timeout_are_injected() {
        let backend = OllamaBackend::new()
            .with_dimension(384)
            .with_timeout(Duration::from_millis(250));
        assert_eq!(backend.dimension(), 384);
        assert_eq!(backend.timeout(), Duration::from_millis(250));
        assert_eq!(OllamaBackend::new().timeout(), Duration::from_secs(EMBED_TIMEOUT_SECS));
    }

    #[test]
    fn test_default_impl() {
        let backend = OllamaBackend::default();
        assert_eq!(backend.base_url(), DEFAULT_OLLAMA_URL);
        assert_eq!(backend.model_name(), DEFAULT_EMBED_MODEL);
    }

    #[test]
    fn test_embedding_request_serialization() {
        let request = EmbeddingRequest {
            model: "test-model".to_string(),
            input: vec!["上海 茶馆".to_string()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["input"][0], "上海 茶馆");
    }

    #[test]
    fn test_embedding_response_deserialization() {
        let json = r#"{"model":"nomic-embed-text","embeddings": [[0.1, 0.2, 0.3]]}"#;
        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embeddings.len(), 1);
        assert_eq!(response.embeddings[0], vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_empty_list_skips_request() {
        let backend = OllamaBackend::with_config("http://unreachable.invalid".to_string(), "m".to_string(), 3);
        assert!(backend.embed_texts(&[]).await.unwrap().is_empty());
    }
}
