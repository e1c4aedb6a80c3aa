//! PostgreSQL record store over the `audio_records` table.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use echomap_core::{
    ordering, AudioRecord, ContextFilter, Error, GeoPoint, OrderKey, RecordStore, Result, Vector,
};

use crate::filter_sql::{bind_params, ContextFilterQueryBuilder, OrderClauseBuilder, QueryParam};
use crate::pool::PoolHealth;

/// Queries slower than this are logged at WARN.
const SLOW_QUERY_MS: u128 = 500;

const RECORD_COLUMNS: &str = "id, file_path, latitude, longitude, city, district, created_at, \
     scene_tags, transcript, generated_story, emotion_tag, embedding, like_count";

/// PostgreSQL implementation of [`RecordStore`].
#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool<Postgres>,
}

impl PgRecordStore {
    /// Create a new record store.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Render the full SELECT for a filtered, ordered, limited query.
    pub fn find_sql(filter: &ContextFilter, order: &[OrderKey], limit: i64) -> (String, Vec<QueryParam>) {
        let (where_sql, mut params) = ContextFilterQueryBuilder::new(filter.clone(), 0).build();
        let (order_sql, order_params) = OrderClauseBuilder::new(order, params.len()).build();
        params.extend(order_params);
        params.push(QueryParam::BigInt(limit));
        let sql = format!(
            "SELECT {} FROM audio_records WHERE {} ORDER BY {} LIMIT ${}",
            RECORD_COLUMNS,
            where_sql,
            order_sql,
            params.len()
        );
        (sql, params)
    }

    /// Render the centroid aggregate for a filter.
    pub fn centroid_sql(filter: &ContextFilter) -> (String, Vec<QueryParam>) {
        let (where_sql, params) = ContextFilterQueryBuilder::new(filter.clone(), 0).build();
        let sql = format!(
            "SELECT AVG(latitude) AS lat, AVG(longitude) AS lon, COUNT(*) AS n \
             FROM audio_records WHERE {}",
            where_sql
        );
        (sql, params)
    }
}

/// Map a row to an [`AudioRecord`].
fn row_to_record(row: &PgRow) -> Result<AudioRecord> {
    let scene_tags: Option<serde_json::Value> = row.try_get("scene_tags")?;
    let scene_tags = match scene_tags {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(AudioRecord {
        id: row.try_get("id")?,
        file_path: row.try_get("file_path")?,
        position: GeoPoint::new(row.try_get("latitude")?, row.try_get("longitude")?),
        city: row.try_get("city")?,
        district: row.try_get("district")?,
        created_at: row.try_get("created_at")?,
        scene_tags,
        transcript: row.try_get("transcript")?,
        story: row.try_get("generated_story")?,
        emotion_tag: row.try_get("emotion_tag")?,
        embedding: row.try_get::<Option<Vector>, _>("embedding")?,
        like_count: row.try_get("like_count")?,
    })
}

fn rows_to_records(rows: &[PgRow]) -> Result<Vec<AudioRecord>> {
    rows.iter().map(row_to_record).collect()
}

#[async_trait]
impl RecordStore for PgRecordStore {
    #[instrument(
        skip(self, filter, order),
        fields(subsystem = "db", component = "records", op = "find", token_count = filter.groups().len())
    )]
    async fn find(
        &self,
        filter: &ContextFilter,
        order: &[OrderKey],
        limit: i64,
    ) -> Result<Vec<AudioRecord>> {
        let start = Instant::now();
        let (sql, params) = Self::find_sql(filter, order, limit);
        debug!(order = %ordering::describe(order), sql = %sql, "Rendered record query");

        let rows = bind_params(sqlx::query(&sql), params)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::StoreUnavailable)?;

        let elapsed = start.elapsed().as_millis();
        if elapsed > SLOW_QUERY_MS {
            let health = PoolHealth::of(&self.pool);
            warn!(
                duration_ms = elapsed as u64,
                result_count = rows.len(),
                pool_size = health.size,
                pool_idle = health.idle,
                pool_saturated = health.is_saturated(),
                slow = true,
                "Slow record query"
            );
        }
        rows_to_records(&rows)
    }

    #[instrument(skip(self, filter), fields(subsystem = "db", component = "records", op = "centroid"))]
    async fn centroid(&self, filter: &ContextFilter) -> Result<Option<GeoPoint>> {
        let (sql, params) = Self::centroid_sql(filter);
        let row = bind_params(sqlx::query(&sql), params)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::StoreUnavailable)?;

        let count: i64 = row.try_get("n")?;
        if count == 0 {
            return Ok(None);
        }
        let lat: Option<f64> = row.try_get("lat")?;
        let lon: Option<f64> = row.try_get("lon")?;
        Ok(lat.zip(lon).map(|(lat, lon)| GeoPoint::new(lat, lon)))
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "records", op = "fetch"))]
    async fn fetch(&self, id: Uuid) -> Result<Option<AudioRecord>> {
        let sql = format!("SELECT {} FROM audio_records WHERE id = $1", RECORD_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::StoreUnavailable)?;
        row.as_ref().map(row_to_record).transpose()
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "records", op = "latest"))]
    async fn latest(&self, limit: i64) -> Result<Vec<AudioRecord>> {
        let sql = format!(
            "SELECT {} FROM audio_records ORDER BY created_at DESC, id ASC LIMIT $1",
            RECORD_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::StoreUnavailable)?;
        rows_to_records(&rows)
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "records", op = "list"))]
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<AudioRecord>> {
        let sql = format!(
            "SELECT {} FROM audio_records ORDER BY created_at ASC, id ASC OFFSET $1 LIMIT $2",
            RECORD_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::StoreUnavailable)?;
        rows_to_records(&rows)
    }
}
