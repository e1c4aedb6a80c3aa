//! Context filter: the hard eligibility predicate shared by every strategy.
//!
//! A filter is a conjunction of [`MatchGroup`]s. Each group is a single
//! needle searched case-insensitively, as a substring, across a disjunction
//! of record fields. A context string becomes one group per
//! whitespace-separated token over all searchable fields:
//!
//! ```text
//! "上海 茶馆"  ⇒  (city ∋ 上海 ∨ district ∋ 上海 ∨ tags ∋ 上海 ∨ transcript ∋ 上海 ∨ story ∋ 上海)
//!              ∧ (city ∋ 茶馆 ∨ district ∋ 茶馆 ∨ tags ∋ 茶馆 ∨ transcript ∋ 茶馆 ∨ story ∋ 茶馆)
//! ```
//!
//! An empty context yields the empty conjunction, which every record
//! satisfies. The same filter value drives the store query, the centroid
//! computation and the in-memory evaluator, so "context" scopes candidates
//! and the geographic reference point identically.
//!
//! # Example
//!
//! ```
//! use echomap_core::{AudioRecord, ContextFilter, GeoPoint};
//! use chrono::Utc;
//! use uuid::Uuid;
//!
//! let rec = AudioRecord::new(Uuid::nil(), GeoPoint::new(31.2, 121.5), Utc::now())
//!     .with_city("上海")
//!     .with_scene_tags(["茶馆"]);
//!
//! assert!(ContextFilter::from_context("上海 茶馆").matches(&rec));
//! assert!(!ContextFilter::from_context("上海 寺庙").matches(&rec));
//! assert!(ContextFilter::from_context("").matches(&rec));
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::models::AudioRecord;
use crate::temporal::HourWindow;

// =============================================================================
// RECORD FIELDS
// =============================================================================

/// Text fields of an [`AudioRecord`] that predicates can search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    City,
    District,
    /// The scene-tag list in its serialized (JSON array) form.
    SceneTags,
    Transcript,
    Story,
}

impl RecordField {
    /// Fields a context token may match in.
    pub const SEARCHABLE: [RecordField; 5] = [
        RecordField::City,
        RecordField::District,
        RecordField::SceneTags,
        RecordField::Transcript,
        RecordField::Story,
    ];

    /// Fields a scoring keyword may match in.
    pub const SCORED: [RecordField; 2] = [RecordField::SceneTags, RecordField::Transcript];

    /// The field's text on a record, if present.
    pub fn text<'a>(&self, record: &'a AudioRecord) -> Option<Cow<'a, str>> {
        match self {
            Self::City => record.city.as_deref().map(Cow::Borrowed),
            Self::District => record.district.as_deref().map(Cow::Borrowed),
            Self::SceneTags => Some(Cow::Owned(record.scene_tags_text())),
            Self::Transcript => record.transcript.as_deref().map(Cow::Borrowed),
            Self::Story => record.story.as_deref().map(Cow::Borrowed),
        }
    }
}

// =============================================================================
// MATCH GROUP
// =============================================================================

/// One needle OR-ed across a set of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGroup {
    needle: String,
    fields: Vec<RecordField>,
}

impl MatchGroup {
    pub fn new(needle: impl Into<String>, fields: &[RecordField]) -> Self {
        Self {
            needle: needle.into(),
            fields: fields.to_vec(),
        }
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Case-insensitive substring match in at least one field.
    pub fn matches(&self, record: &AudioRecord) -> bool {
        let needle = self.needle.to_lowercase();
        self.fields.iter().any(|field| {
            field
                .text(record)
                .map(|text| text.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }
}

// =============================================================================
// CONTEXT FILTER
// =============================================================================

/// Conjunction of match groups, optionally restricted to an hour window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFilter {
    groups: Vec<MatchGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hour_window: Option<HourWindow>,
}

impl ContextFilter {
    /// Create an empty filter (every record is eligible).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the hard filter for a free-text context.
    ///
    /// Every whitespace-separated token must appear in at least one
    /// searchable field; different tokens may match different fields.
    pub fn from_context(context: &str) -> Self {
        let groups = context
            .split_whitespace()
            .map(|token| MatchGroup::new(token, &RecordField::SEARCHABLE))
            .collect();
        Self {
            groups,
            hour_window: None,
        }
    }

    /// Add a match group to the conjunction.
    pub fn and_group(mut self, group: MatchGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Restrict eligibility to records captured in an hour window.
    pub fn with_hour_window(mut self, window: HourWindow) -> Self {
        self.hour_window = Some(window);
        self
    }

    /// The same filter with the hour window dropped.
    pub fn without_hour_window(&self) -> Self {
        Self {
            groups: self.groups.clone(),
            hour_window: None,
        }
    }

    pub fn groups(&self) -> &[MatchGroup] {
        &self.groups
    }

    pub fn hour_window(&self) -> Option<&HourWindow> {
        self.hour_window.as_ref()
    }

    /// Check if the filter is completely empty (matches all records).
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.hour_window.is_none()
    }

    /// Evaluate the predicate against a record.
    pub fn matches(&self, record: &AudioRecord) -> bool {
        if let Some(window) = &self.hour_window {
            if !window.contains(record.created_hour_utc()) {
                return false;
            }
        }
        self.groups.iter().all(|group| group.matches(record))
    }
}
