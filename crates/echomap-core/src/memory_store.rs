//! In-memory [`RecordStore`] that evaluates filters and order keys directly.
//!
//! This is the reference semantics for [`ContextFilter`] and [`OrderKey`]:
//! the PostgreSQL store renders the same values to SQL and must agree with
//! it. It also backs engine tests that run without a database.
//!
//! ```
//! use echomap_core::{AudioRecord, ContextFilter, GeoPoint, MemoryRecordStore, OrderKey, RecordStore};
//! use chrono::Utc;
//! use uuid::Uuid;
//!
//! # tokio_test_block_on(async {
//! let store = MemoryRecordStore::new(vec![
//!     AudioRecord::new(Uuid::new_v4(), GeoPoint::new(31.2, 121.5), Utc::now()).with_city("上海"),
//! ]);
//! let hits = store
//!     .find(&ContextFilter::from_context("上海"), &[OrderKey::LikeCount], 10)
//!     .await
//!     .unwrap();
//! assert_eq!(hits.len(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::trace;
use uuid::Uuid;

use crate::context_filter::ContextFilter;
use crate::error::{Error, Result};
use crate::geo;
use crate::models::{AudioRecord, GeoPoint};
use crate::ordering::{sort_records, OrderKey};
use crate::traits::RecordStore;

/// Record store holding a snapshot of records in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<AudioRecord>>,
    offline: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new(records: Vec<AudioRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            offline: AtomicBool::new(false),
        }
    }

    /// Append a record (insertion order is storage order).
    pub fn insert(&self, record: AudioRecord) {
        if let Ok(mut records) = self.records.write() {
            records.push(record);
        }
    }

    /// Simulate an unreachable store: every query fails with `StoreFailure`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Result<Vec<AudioRecord>> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(Error::StoreFailure("memory store is offline".to_string()));
        }
        self.records
            .read()
            .map(|r| r.clone())
            .map_err(|_| Error::StoreFailure("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find(
        &self,
        filter: &ContextFilter,
        order: &[OrderKey],
        limit: i64,
    ) -> Result<Vec<AudioRecord>> {
        let mut eligible: Vec<AudioRecord> = self
            .snapshot()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        trace!(eligible = eligible.len(), "memory store find");

        sort_records(&mut eligible, order);
        eligible.truncate(limit.max(0) as usize);
        Ok(eligible)
    }

    async fn centroid(&self, filter: &ContextFilter) -> Result<Option<GeoPoint>> {
        let records = self.snapshot()?;
        Ok(geo::centroid(
            records
                .iter()
                .filter(|r| filter.matches(r))
                .map(|r| &r.position),
        ))
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<AudioRecord>> {
        Ok(self.snapshot()?.into_iter().find(|r| r.id == id))
    }

    async fn latest(&self, limit: i64) -> Result<Vec<AudioRecord>> {
        let mut records = self.snapshot()?;
        sort_records(&mut records, &[]);
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<AudioRecord>> {
        let mut records = self.snapshot()?;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(hour: u32, city: &str) -> AudioRecord {
        AudioRecord::new(
            Uuid::new_v4(),
            GeoPoint::new(31.0 + hour as f64 / 100.0, 121.0),
            Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
        )
        .with_city(city)
    }

    #[tokio::test]
    async fn test_find_filters_sorts_and_limits() {
        let store = MemoryRecordStore::new(vec![
            record(1, "上海").with_like_count(3),
            record(2, "北京").with_like_count(100),
            record(3, "上海").with_like_count(9),
            record(4, "上海").with_like_count(1),
        ]);
        let hits = store
            .find(&ContextFilter::from_context("上海"), &[OrderKey::LikeCount], 2)
            .await
            .unwrap();
        let likes: Vec<i32> = hits.iter().map(|r| r.like_count).collect();
        assert_eq!(likes, vec![9, 3]);
    }

    #[tokio::test]
    async fn test_centroid_over_eligible_only() {
        let store = MemoryRecordStore::new(vec![
            AudioRecord::new(Uuid::new_v4(), GeoPoint::new(30.0, 120.0), Utc::now()).with_city("上海"),
            AudioRecord::new(Uuid::new_v4(), GeoPoint::new(32.0, 122.0), Utc::now()).with_city("上海"),
            AudioRecord::new(Uuid::new_v4(), GeoPoint::new(40.0, 116.0), Utc::now()).with_city("北京"),
        ]);
        let c = store
            .centroid(&ContextFilter::from_context("上海"))
            .await
            .unwrap()
            .unwrap();
        assert!((c.latitude - 31.0).abs() < 1e-9);
        assert!((c.longitude - 121.0).abs() < 1e-9);

        let none = store
            .centroid(&ContextFilter::from_context("广州"))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let store = MemoryRecordStore::new(vec![record(1, "上海")]);
        store.set_offline(true);
        let err = store.find(&ContextFilter::new(), &[], 10).await.unwrap_err();
        assert!(err.is_store_unavailable());
        assert!(store.centroid(&ContextFilter::new()).await.is_err());

        store.set_offline(false);
        assert_eq!(store.find(&ContextFilter::new(), &[], 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_latest_and_list() {
        let first = record(1, "上海");
        let store = MemoryRecordStore::new(vec![first.clone(), record(5, "上海"), record(3, "上海")]);

        assert_eq!(store.fetch(first.id).await.unwrap(), Some(first.clone()));
        assert_eq!(store.fetch(Uuid::nil()).await.unwrap(), None);

        let latest: Vec<u32> = store
            .latest(2)
            .await
            .unwrap()
            .iter()
            .map(|r| r.created_hour_utc())
            .collect();
        assert_eq!(latest, vec![5, 3]);

        let page: Vec<u32> = store
            .list(1, 5)
            .await
            .unwrap()
            .iter()
            .map(|r| r.created_hour_utc())
            .collect();
        assert_eq!(page, vec![3, 5]);
    }

    #[tokio::test]
    async fn test_insert_and_len() {
        let store = MemoryRecordStore::default();
        assert!(store.is_empty());
        let mut rec = record(1, "上海");
        rec.created_at = rec.created_at + Duration::days(1);
        store.insert(rec);
        assert_eq!(store.len(), 1);
    }
}
