//! The three recommendation strategies.
//!
//! Every strategy follows the same pipeline: validate the request, build the
//! context filter, embed the context once, then ask the record store for the
//! eligible records in strategy order. Only record store failures and invalid
//! requests are returned as errors. An embedding failure, timeout or
//! malformed vector drops the cosine-distance key and nothing else.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use echomap_core::geo::{self, RoamingClassification, RoamingMode};
use echomap_core::ordering;
use echomap_core::{
    resolve_limit, AudioRecord, ContextFilter, CulturalRequest, EmbeddingBackend, Error, GeoPoint,
    HourWindow, OrderKey, RecordStore, ResonanceRequest, Result, RoamingRequest, Vector,
};

use crate::config::EngineConfig;

/// Roaming results together with the classification that chose their keyword set.
#[derive(Debug, Clone, Serialize)]
pub struct RoamingRecommendation {
    pub mode: RoamingMode,
    pub centroid: Option<GeoPoint>,
    pub distance_m: Option<f64>,
    pub records: Vec<AudioRecord>,
}

/// Stateless recommendation engine over a record store and an embedding backend.
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn RecordStore>,
    embedder: Arc<dyn EmbeddingBackend>,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        embedder: Arc<dyn EmbeddingBackend>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // STRATEGIES
    // =========================================================================

    /// Same place, same time of day.
    ///
    /// Records captured within the configured window around the caller's
    /// hour, nearest in meaning first, then most liked. When nothing falls in
    /// the window the hour condition is dropped and the query re-run.
    #[instrument(
        skip(self, request),
        fields(subsystem = "recommend", component = "engine", strategy = "resonance", context = %request.context)
    )]
    pub async fn resonance(&self, request: &ResonanceRequest) -> Result<Vec<AudioRecord>> {
        let start = Instant::now();
        let limit = resolve_limit(request.limit)?;
        let window = HourWindow::from_local_hour(
            request.reference_hour_local,
            self.config.utc_offset_hours,
            self.config.resonance_half_width_hours,
        )?;
        debug!(
            utc_hour = window.center(),
            hours = ?window.hours(),
            "Resonance hour window"
        );

        let filter = ContextFilter::from_context(&request.context).with_hour_window(window);
        let query = self.embed_query(&request.context).await;
        let mut order = Vec::with_capacity(2);
        if let Some(q) = query {
            order.push(OrderKey::CosineDistance(q));
        }
        order.push(OrderKey::LikeCount);

        let mut records = self.find(&filter, &order, limit).await?;
        let fallback = records.is_empty();
        if fallback {
            warn!(
                fallback = true,
                "No records in hour window, retrying without time condition"
            );
            records = self.find(&filter.without_hour_window(), &order, limit).await?;
        }

        info!(
            result_count = records.len(),
            fallback,
            duration_ms = start.elapsed().as_millis() as u64,
            "Resonance complete"
        );
        Ok(records)
    }

    /// Culturally evocative sounds for a place.
    ///
    /// Ordered by how many cultural keywords a record's tags or transcript
    /// mention, then by meaning, then by likes.
    #[instrument(
        skip(self, request),
        fields(subsystem = "recommend", component = "engine", strategy = "cultural", context = %request.context)
    )]
    pub async fn cultural(&self, request: &CulturalRequest) -> Result<Vec<AudioRecord>> {
        let start = Instant::now();
        let limit = resolve_limit(request.limit)?;
        let filter = ContextFilter::from_context(&request.context);
        let query = self.embed_query(&request.context).await;

        let mut order = vec![OrderKey::KeywordScore(self.config.keywords.cultural.clone())];
        if let Some(q) = query {
            order.push(OrderKey::CosineDistance(q));
        }
        order.push(OrderKey::LikeCount);

        let records = self.find(&filter, &order, limit).await?;
        info!(
            result_count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Cultural complete"
        );
        Ok(records)
    }

    /// Homesick or explorer sounds depending on how far the user is from the place.
    pub async fn roaming(&self, request: &RoamingRequest) -> Result<Vec<AudioRecord>> {
        Ok(self.roaming_with_mode(request).await?.records)
    }

    /// Roaming, also reporting the centroid, distance and chosen mode.
    ///
    /// The centroid is taken over the same eligible set the results come
    /// from, so an empty context measures against every record in the store.
    #[instrument(
        skip(self, request),
        fields(subsystem = "recommend", component = "engine", strategy = "roaming", context = %request.context)
    )]
    pub async fn roaming_with_mode(&self, request: &RoamingRequest) -> Result<RoamingRecommendation> {
        let start = Instant::now();
        let limit = resolve_limit(request.limit)?;
        request.user_position.validate()?;
        let filter = ContextFilter::from_context(&request.context);

        let (centroid, query) = tokio::join!(
            self.store.centroid(&filter),
            self.embed_query(&request.context)
        );
        let centroid = centroid.inspect_err(|e| log_store_error(e, "centroid"))?;

        let RoamingClassification {
            mode,
            centroid,
            distance_m,
        } = geo::classify(centroid, &request.user_position, self.config.roaming_threshold_m);
        debug!(
            mode = %mode,
            distance_m = distance_m.unwrap_or(-1.0),
            has_centroid = centroid.is_some(),
            "Roaming mode selected"
        );

        let mut order = vec![OrderKey::KeywordScore(
            mode.keyword_set(&self.config.keywords).clone(),
        )];
        if let Some(q) = query {
            order.push(OrderKey::CosineDistance(q));
        }
        order.push(OrderKey::LikeCount);

        let records = self.find(&filter, &order, limit).await?;
        info!(
            mode = %mode,
            result_count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Roaming complete"
        );
        Ok(RoamingRecommendation {
            mode,
            centroid,
            distance_m,
            records,
        })
    }

    // =========================================================================
    // PASS-THROUGH READS
    // =========================================================================

    /// Most recent recordings first.
    #[instrument(skip(self), fields(subsystem = "recommend", component = "engine", op = "latest"))]
    pub async fn latest(&self, limit: Option<i64>) -> Result<Vec<AudioRecord>> {
        let limit = match limit {
            None => echomap_core::defaults::LATEST_LIMIT,
            some => resolve_limit(some)?,
        };
        self.store
            .latest(limit)
            .await
            .inspect_err(|e| log_store_error(e, "latest"))
    }

    /// A single recording.
    #[instrument(skip(self), fields(subsystem = "recommend", component = "engine", op = "fetch"))]
    pub async fn fetch(&self, id: Uuid) -> Result<AudioRecord> {
        self.store
            .fetch(id)
            .await
            .inspect_err(|e| log_store_error(e, "fetch"))?
            .ok_or_else(|| Error::NotFound(format!("audio record {}", id)))
    }

    /// A page of recordings in capture order, for map display.
    #[instrument(skip(self), fields(subsystem = "recommend", component = "engine", op = "list"))]
    pub async fn list(&self, offset: i64, limit: Option<i64>) -> Result<Vec<AudioRecord>> {
        if offset < 0 {
            return Err(Error::InvalidInput(format!(
                "offset must not be negative, got {}",
                offset
            )));
        }
        let limit = match limit {
            None => echomap_core::defaults::MAP_PAGE_LIMIT,
            some => resolve_limit(some)?,
        };
        self.store
            .list(offset, limit)
            .await
            .inspect_err(|e| log_store_error(e, "list"))
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn find(
        &self,
        filter: &ContextFilter,
        order: &[OrderKey],
        limit: i64,
    ) -> Result<Vec<AudioRecord>> {
        debug!(
            token_count = filter.groups().len(),
            has_hour_window = filter.hour_window().is_some(),
            order = %ordering::describe(order),
            limit,
            "Querying record store"
        );
        self.store
            .find(filter, order, limit)
            .await
            .inspect_err(|e| log_store_error(e, "find"))
    }

    /// Embed the context, or `None` if the backend cannot produce a usable vector in time.
    async fn embed_query(&self, context: &str) -> Option<Vector> {
        let texts = vec![context.to_string()];
        let outcome = timeout(self.config.embed_timeout, self.embedder.embed_texts(&texts))
            .await
            .map_err(|_| {
                Error::EmbeddingUnavailable(format!(
                    "timed out after {}ms",
                    self.config.embed_timeout.as_millis()
                ))
            })
            .and_then(|r| r)
            .and_then(|vectors| self.usable_vector(vectors));

        match outcome {
            Ok(v) => {
                debug!(has_vector = true, model = %self.embedder.model_name(), "Query embedded");
                Some(v)
            }
            Err(e) => {
                warn!(
                    has_vector = false,
                    model = %self.embedder.model_name(),
                    error = %e,
                    "Ranking without vector similarity"
                );
                None
            }
        }
    }

    fn usable_vector(&self, vectors: Vec<Vector>) -> Result<Vector> {
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmbeddingUnavailable("no vector returned".to_string()))?;
        let values = vector.as_slice();
        if values.len() != self.config.embed_dimension {
            return Err(Error::EmbeddingUnavailable(format!(
                "expected {} dimensions, got {}",
                self.config.embed_dimension,
                values.len()
            )));
        }
        if values.iter().any(|x| !x.is_finite()) || values.iter().all(|x| *x == 0.0) {
            return Err(Error::EmbeddingUnavailable(
                "vector is zero or not finite".to_string(),
            ));
        }
        Ok(vector)
    }
}

fn log_store_error(e: &Error, op: &str) {
    error!(op, error = %e, "Record store query failed");
}
