//! SQL rendering of context filters and order keys.
//!
//! [`ContextFilterQueryBuilder`] turns a [`ContextFilter`] into a parameterized
//! WHERE fragment and [`OrderClauseBuilder`] turns an [`OrderKey`] list into an
//! ORDER BY clause. Both follow the same `$n` numbering so fragments can be
//! concatenated into one statement, and both agree with the in-memory
//! evaluation in `echomap_core::memory_store`.

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

use echomap_core::{ContextFilter, KeywordSet, MatchGroup, OrderKey, RecordField, Vector};

use crate::escape_like;

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// String parameter (ILIKE patterns).
    String(String),
    /// Array of integers (hour-of-day sets).
    IntArray(Vec<i32>),
    /// Query embedding for `<=>` distance ordering.
    Vector(Vector),
    /// 64-bit integer (LIMIT / OFFSET).
    BigInt(i64),
}

/// Bind parameters to a query in order.
pub fn bind_params(
    mut query: Query<'_, Postgres, PgArguments>,
    params: Vec<QueryParam>,
) -> Query<'_, Postgres, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::String(s) => query.bind(s),
            QueryParam::IntArray(v) => query.bind(v),
            QueryParam::Vector(v) => query.bind(v),
            QueryParam::BigInt(n) => query.bind(n),
        };
    }
    query
}

/// Column expression for a searchable record field, as text.
fn column(field: RecordField) -> &'static str {
    match field {
        RecordField::City => "city",
        RecordField::District => "district",
        RecordField::SceneTags => "scene_tags::text",
        RecordField::Transcript => "transcript",
        RecordField::Story => "generated_story",
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped.
fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}

/// `(a ILIKE $n OR b ILIKE $n ...)` for one match group, sharing a parameter.
fn group_sql(group: &MatchGroup, param_idx: usize) -> String {
    let alternatives: Vec<String> = group
        .fields()
        .iter()
        .map(|f| format!("{} ILIKE ${}", column(*f), param_idx))
        .collect();
    format!("({})", alternatives.join(" OR "))
}

/// Generates the SQL WHERE fragment for a [`ContextFilter`].
///
/// # Example
///
/// ```rust
/// use echomap_core::ContextFilter;
/// use echomap_db::filter_sql::{ContextFilterQueryBuilder, QueryParam};
///
/// let builder = ContextFilterQueryBuilder::new(ContextFilter::from_context("上海 雨声"), 0);
/// let (sql, params) = builder.build();
/// assert!(sql.starts_with("(city ILIKE $1 OR"));
/// assert!(sql.contains(") AND (city ILIKE $2 OR"));
/// assert_eq!(params[0], QueryParam::String("%上海%".to_string()));
/// ```
pub struct ContextFilterQueryBuilder {
    filter: ContextFilter,
    param_offset: usize,
}

impl ContextFilterQueryBuilder {
    /// Create a new builder.
    ///
    /// * `param_offset` - number of parameters already in the query
    pub fn new(filter: ContextFilter, param_offset: usize) -> Self {
        Self {
            filter,
            param_offset,
        }
    }

    /// Build the WHERE fragment and its parameters.
    ///
    /// An empty filter renders as `TRUE` with no parameters.
    pub fn build(&self) -> (String, Vec<QueryParam>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        let mut param_idx = self.param_offset;

        for group in self.filter.groups() {
            param_idx += 1;
            clauses.push(group_sql(group, param_idx));
            params.push(QueryParam::String(contains_pattern(group.needle())));
        }

        if let Some(window) = self.filter.hour_window() {
            param_idx += 1;
            clauses.push(format!(
                "EXTRACT(HOUR FROM created_at AT TIME ZONE 'UTC')::int = ANY(${}::int[])",
                param_idx
            ));
            params.push(QueryParam::IntArray(
                window.hours().into_iter().map(|h| h as i32).collect(),
            ));
        }

        if clauses.is_empty() {
            ("TRUE".to_string(), params)
        } else {
            (clauses.join(" AND "), params)
        }
    }
}

/// Generates the ORDER BY clause for an order key list.
///
/// The implicit tie-break `created_at DESC, id ASC` is always appended.
pub struct OrderClauseBuilder {
    keys: Vec<OrderKey>,
    param_offset: usize,
}

impl OrderClauseBuilder {
    pub fn new(keys: &[OrderKey], param_offset: usize) -> Self {
        Self {
            keys: keys.to_vec(),
            param_offset,
        }
    }

    /// Build the clause (without the `ORDER BY` keyword) and its parameters.
    pub fn build(&self) -> (String, Vec<QueryParam>) {
        let mut terms = Vec::new();
        let mut params = Vec::new();
        let mut param_idx = self.param_offset;

        for key in &self.keys {
            match key {
                OrderKey::KeywordScore(set) => {
                    if set.is_empty() {
                        continue;
                    }
                    let (expr, score_params) = keyword_score_sql(set, param_idx);
                    param_idx += score_params.len();
                    params.extend(score_params);
                    terms.push(format!("{} DESC", expr));
                }
                OrderKey::CosineDistance(query) => {
                    param_idx += 1;
                    terms.push(format!("{} ASC NULLS LAST", cosine_distance_sql(param_idx)));
                    params.push(QueryParam::Vector(query.clone()));
                }
                OrderKey::LikeCount => terms.push("like_count DESC".to_string()),
            }
        }

        terms.push("created_at DESC".to_string());
        terms.push("id ASC".to_string());
        (terms.join(", "), params)
    }
}

/// Cosine distance to `$n`, NULL for missing or zero-norm embeddings.
///
/// `<=>` yields NaN against a zero vector, which would sort between real
/// distances and NULLs; mapping it to NULL ranks it with missing embeddings.
fn cosine_distance_sql(param_idx: usize) -> String {
    format!(
        "(CASE WHEN vector_norm(embedding) > 0 THEN embedding <=> ${} END)",
        param_idx
    )
}

/// `(CASE WHEN (...) THEN 1 ELSE 0 END + ...)`, one term per keyword.
fn keyword_score_sql(set: &KeywordSet, param_offset: usize) -> (String, Vec<QueryParam>) {
    let mut terms = Vec::new();
    let mut params = Vec::new();
    for (i, group) in set.groups().iter().enumerate() {
        let idx = param_offset + i + 1;
        terms.push(format!("CASE WHEN {} THEN 1 ELSE 0 END", group_sql(group, idx)));
        params.push(QueryParam::String(contains_pattern(group.needle())));
    }
    (format!("({})", terms.join(" + ")), params)
}
