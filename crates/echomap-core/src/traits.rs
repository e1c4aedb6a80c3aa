//! Core traits for echomap's external collaborators.
//!
//! The ranking engine only talks to a [`RecordStore`] (read-only predicate
//! and order queries) and an [`EmbeddingBackend`] (query text → vector).
//! Concrete implementations live in `echomap-db` and `echomap-inference`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::context_filter::ContextFilter;
use crate::models::{AudioRecord, GeoPoint, Vector};
use crate::ordering::OrderKey;
use crate::Result;

// =============================================================================
// RECORD STORE
// =============================================================================

/// Read-only query surface over persisted audio records.
///
/// Implementations must end every ordering with `created_at DESC, id ASC`
/// after the supplied keys. Failures to reach the backing store are reported
/// as [`crate::Error::StoreUnavailable`] or [`crate::Error::StoreFailure`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Eligible records under `filter`, ordered by `order`, at most `limit`.
    async fn find(
        &self,
        filter: &ContextFilter,
        order: &[OrderKey],
        limit: i64,
    ) -> Result<Vec<AudioRecord>>;

    /// Mean position of all records eligible under `filter`, `None` if there are none.
    async fn centroid(&self, filter: &ContextFilter) -> Result<Option<GeoPoint>>;

    /// Fetch a single record by id.
    async fn fetch(&self, id: Uuid) -> Result<Option<AudioRecord>>;

    /// Most recently captured records first.
    async fn latest(&self, limit: i64) -> Result<Vec<AudioRecord>>;

    /// Records in capture order (oldest first) for paging over the map.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<AudioRecord>>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns a vector of embedding vectors, one per input text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
