//! # echomap-core
//!
//! Core types, traits, and ranking primitives for the echomap recommendation
//! engine.
//!
//! This crate holds everything the strategies need that does not touch a
//! database or a model server: the audio record model, the context filter,
//! keyword scoring, hour windows, centroid and distance math, and the
//! [`RecordStore`] / [`EmbeddingBackend`] seams the other crates implement.

pub mod context_filter;
pub mod defaults;
pub mod error;
pub mod geo;
pub mod keywords;
pub mod logging;
pub mod memory_store;
pub mod models;
pub mod ordering;
pub mod similarity;
pub mod temporal;
pub mod traits;

// Re-export commonly used types at crate root
pub use context_filter::{ContextFilter, MatchGroup, RecordField};
pub use error::{Error, Result};
pub use geo::{RoamingClassification, RoamingMode};
pub use keywords::{KeywordSet, KeywordSets};
pub use memory_store::MemoryRecordStore;
pub use models::*;
pub use ordering::OrderKey;
pub use temporal::HourWindow;
pub use traits::*;
