//! Soft-rank order keys applied among eligible records.
//!
//! Strategies describe their ordering as a list of [`OrderKey`]s in priority
//! order. Stores render the list natively (SQL `ORDER BY`) or evaluate it in
//! memory with [`sort_records`]. Every ordering ends with the implicit
//! tie-break `created_at DESC, id ASC`, so identical inputs always produce
//! identical output.

use std::cmp::Ordering;

use crate::keywords::KeywordSet;
use crate::models::{AudioRecord, Vector};
use crate::similarity::cosine_distance;

/// A single ordering criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKey {
    /// Descending keyword score.
    KeywordScore(KeywordSet),
    /// Ascending cosine distance to the query vector; records without a
    /// usable embedding sort last.
    CosineDistance(Vector),
    /// Descending like count.
    LikeCount,
}

impl OrderKey {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::KeywordScore(_) => "keyword_score",
            Self::CosineDistance(_) => "cosine_distance",
            Self::LikeCount => "like_count",
        }
    }
}

/// Names of an order key list, for logging.
pub fn describe(keys: &[OrderKey]) -> String {
    keys.iter().map(OrderKey::name).collect::<Vec<_>>().join(",")
}

/// Evaluated value of one order key for one record.
#[derive(Debug, Clone, Copy)]
enum RankValue {
    Score(u32),
    Distance(Option<f32>),
    Likes(i32),
}

impl RankValue {
    fn evaluate(key: &OrderKey, record: &AudioRecord) -> Self {
        match key {
            OrderKey::KeywordScore(set) => Self::Score(set.score(record)),
            OrderKey::CosineDistance(query) => {
                Self::Distance(cosine_distance(query, record.embedding.as_ref()))
            }
            OrderKey::LikeCount => Self::Likes(record.like_count),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Score(a), Self::Score(b)) => b.cmp(a),
            (Self::Distance(a), Self::Distance(b)) => match (a, b) {
                (Some(x), Some(y)) => x.total_cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            (Self::Likes(a), Self::Likes(b)) => b.cmp(a),
            _ => Ordering::Equal,
        }
    }
}

/// Compare two records under an order key list plus the implicit tie-break.
pub fn compare_records(a: &AudioRecord, b: &AudioRecord, keys: &[OrderKey]) -> Ordering {
    for key in keys {
        let ord = RankValue::evaluate(key, a).compare(&RankValue::evaluate(key, b));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    tie_break(a, b)
}

fn tie_break(a: &AudioRecord, b: &AudioRecord) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

/// Sort records in place by an order key list.
///
/// Key values are computed once per record.
pub fn sort_records(records: &mut Vec<AudioRecord>, keys: &[OrderKey]) {
    let mut ranked: Vec<(Vec<RankValue>, AudioRecord)> = records
        .drain(..)
        .map(|r| (keys.iter().map(|k| RankValue::evaluate(k, &r)).collect(), r))
        .collect();

    ranked.sort_by(|(va, a), (vb, b)| {
        va.iter()
            .zip(vb.iter())
            .map(|(x, y)| x.compare(y))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| tie_break(a, b))
    });

    records.extend(ranked.into_iter().map(|(_, r)| r));
}
