//! Mock embedding backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use echomap_inference::mock::MockEmbeddingBackend;
//! use echomap_core::EmbeddingBackend;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let backend = MockEmbeddingBackend::new()
//!     .with_dimension(4)
//!     .with_vector("上海 茶馆", vec![1.0, 0.0, 0.0, 0.0]);
//!
//! let v = backend.embed_texts(&["上海 茶馆".to_string()]).await.unwrap();
//! assert_eq!(v[0].as_slice(), &[1.0, 0.0, 0.0, 0.0]);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use echomap_core::{EmbeddingBackend, Error, Result, Vector};

/// How the mock misbehaves, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Every call returns `EmbeddingUnavailable`.
    Error,
    /// Every call returns vectors one element longer than advertised.
    WrongDimension,
}

#[derive(Debug, Clone)]
struct MockConfig {
    dimension: usize,
    fixed_vectors: HashMap<String, Vec<f32>>,
    latency: Duration,
    failure: Option<MockFailure>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dimension: 8,
            fixed_vectors: HashMap::new(),
            latency: Duration::ZERO,
            failure: None,
        }
    }
}

/// Mock embedding backend.
#[derive(Clone, Default)]
pub struct MockEmbeddingBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<String>>>,
}

impl MockEmbeddingBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Return this vector for an exact input text.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_vectors
            .insert(text.into(), vector);
        self
    }

    /// Sleep this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        Arc::make_mut(&mut self.config).latency = latency;
        self
    }

    /// Fail every call in the given way.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(failure);
        self
    }

    /// Texts passed to `embed_texts`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.call_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = self
            .config
            .fixed_vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| generate(text, self.config.dimension));
        if self.config.failure == Some(MockFailure::WrongDimension) {
            v.push(0.0);
        }
        v
    }
}

/// Deterministic unit vector from text (character-position hashing).
pub fn generate(text: &str, dimension: usize) -> Vec<f32> {
    let mut vec = vec![0.0; dimension];
    if dimension == 0 {
        return vec;
    }
    for (i, c) in text.chars().enumerate() {
        let idx = (c as usize + i) % dimension;
        vec[idx] += 0.1;
    }
    let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        vec.iter_mut().for_each(|x| *x /= magnitude);
    }
    vec
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if let Ok(mut log) = self.call_log.lock() {
            log.extend(texts.iter().cloned());
        }
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        if self.config.failure == Some(MockFailure::Error) {
            return Err(Error::EmbeddingUnavailable(
                "simulated embedding failure".to_string(),
            ));
        }
        Ok(texts
            .iter()
            .map(|t| Vector::from(self.vector_for(t)))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}
