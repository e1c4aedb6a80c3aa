//! Domain types for geo-tagged audio recordings and recommendation requests.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// EMBEDDING TYPES
// =============================================================================

/// Embedding vector type (re-exported from pgvector).
pub use pgvector::Vector;

// =============================================================================
// GEOGRAPHY
// =============================================================================

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reject coordinates outside the WGS84 degree ranges (or NaN).
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

// =============================================================================
// AUDIO RECORD
// =============================================================================

/// A persisted, geo-tagged audio recording as seen by the ranking engine.
///
/// The engine never mutates records. Enrichment fields (`transcript`, `story`,
/// `emotion_tag`, `scene_tags`, `embedding`) are filled in asynchronously by
/// the content enricher and may be absent on fresh uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioRecord {
    pub id: Uuid,
    pub file_path: String,
    pub position: GeoPoint,
    pub city: Option<String>,
    pub district: Option<String>,
    /// Capture time, stored in UTC.
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub scene_tags: Vec<String>,
    pub transcript: Option<String>,
    pub story: Option<String>,
    pub emotion_tag: Option<String>,
    /// D-dimensional embedding, absent until enrichment completes.
    /// Never serialized to callers.
    #[serde(skip)]
    pub embedding: Option<Vector>,
    pub like_count: i32,
}

impl AudioRecord {
    /// Minimal record at a position; enrichment fields empty.
    pub fn new(id: Uuid, position: GeoPoint, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            file_path: String::new(),
            position,
            city: None,
            district: None,
            created_at,
            scene_tags: Vec::new(),
            transcript: None,
            story: None,
            emotion_tag: None,
            embedding: None,
            like_count: 0,
        }
    }

    /// UTC hour of day (0-23) the record was captured.
    pub fn created_hour_utc(&self) -> u32 {
        self.created_at.hour()
    }

    /// Scene tags serialized the way the store holds them (a JSON array).
    ///
    /// Substring matching runs against this text, so a token can match
    /// inside a single tag or across the serialized list.
    pub fn scene_tags_text(&self) -> String {
        serde_json::to_string(&self.scene_tags).unwrap_or_default()
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn with_scene_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scene_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self
    }

    pub fn with_story(mut self, story: impl Into<String>) -> Self {
        self.story = Some(story.into());
        self
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion_tag = Some(emotion.into());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(Vector::from(embedding));
        self
    }

    pub fn with_like_count(mut self, like_count: i32) -> Self {
        self.like_count = like_count;
        self
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Resolve an optional caller limit to a positive row count.
pub fn resolve_limit(limit: Option<i64>) -> Result<i64> {
    match limit {
        None => Ok(defaults::RESULT_LIMIT),
        Some(n) if n > 0 => Ok(n),
        Some(n) => Err(Error::InvalidInput(format!(
            "limit must be positive, got {}",
            n
        ))),
    }
}

/// Request for the Resonance strategy (same place, same time of day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResonanceRequest {
    pub context: String,
    /// Caller's local hour of day (0-23) in the configured UTC offset.
    pub reference_hour_local: u32,
    pub limit: Option<i64>,
}

impl ResonanceRequest {
    pub fn new(context: impl Into<String>, reference_hour_local: u32) -> Self {
        Self {
            context: context.into(),
            reference_hour_local,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Request for the Cultural strategy (culturally evocative sounds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CulturalRequest {
    pub context: String,
    pub limit: Option<i64>,
}

impl CulturalRequest {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Request for the Roaming strategy (homesick vs explorer by distance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoamingRequest {
    pub context: String,
    pub user_position: GeoPoint,
    pub limit: Option<i64>,
}

impl RoamingRequest {
    pub fn new(context: impl Into<String>, user_lat: f64, user_lon: f64) -> Self {
        Self {
            context: context.into(),
            user_position: GeoPoint::new(user_lat, user_lon),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}
