//! # echomap-recommend
//!
//! Context-aware recommendation of geo-tagged audio recordings.
//!
//! This crate provides:
//! - Resonance: same place, same time of day, with a no-time fallback
//! - Cultural: ranked by cultural keyword hits
//! - Roaming: homesick or explorer keywords by distance from the place
//! - Engine configuration from constants and environment
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use echomap_db::Database;
//! use echomap_inference::OllamaBackend;
//! use echomap_recommend::{EngineConfig, RecommendationEngine, ResonanceRequest};
//!
//! let db = Database::connect("postgres://...").await?;
//! let engine = RecommendationEngine::new(
//!     Arc::new(db.records.clone()),
//!     Arc::new(OllamaBackend::from_env()),
//!     EngineConfig::from_env(),
//! );
//!
//! let records = engine
//!     .resonance(&ResonanceRequest::new("上海", 9).with_limit(10))
//!     .await?;
//! ```

pub mod config;
pub mod engine;

// Re-export core types
pub use echomap_core::*;

pub use config::EngineConfig;
pub use engine::{RecommendationEngine, RoamingRecommendation};
