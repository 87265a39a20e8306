//! In-memory store for tests and dry runs.

use super::{AuditStore, CursorStore, LedgerStore, StoreError};
use crate::domain::{Address, AuditId, AuditRecord, EventOrderingKey, Point};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    points: HashMap<Address, Point>,
    audits: HashMap<AuditId, AuditRecord>,
    cursor: Option<EventOrderingKey>,
    point_saves: usize,
    save_budget: Option<usize>,
}

/// Store keeping everything in a `HashMap` behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing entries.
    pub fn with_points(points: Vec<Point>) -> Self {
        let inner = Inner {
            points: points.into_iter().map(|p| (p.address, p)).collect(),
            ..Inner::default()
        };
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Make every `save` after the first `budget` successful ones fail with
    /// `StoreError::Unavailable`.
    pub fn fail_saves_after(mut self, budget: usize) -> Self {
        self.inner.get_mut().save_budget = Some(budget);
        self
    }

    /// All entries, ordered by address.
    pub async fn points(&self) -> Vec<Point> {
        let inner = self.inner.lock().await;
        let mut points: Vec<Point> = inner.points.values().cloned().collect();
        points.sort_by(|a, b| a.address.cmp(&b.address));
        points
    }

    /// Number of successful `save` calls so far.
    pub async fn point_saves(&self) -> usize {
        self.inner.lock().await.point_saves
    }

    pub async fn audit_count(&self) -> usize {
        self.inner.lock().await.audits.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load(&self, address: &Address) -> Result<Option<Point>, StoreError> {
        Ok(self.inner.lock().await.points.get(address).cloned())
    }

    async fn save(&self, point: &Point) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(budget) = inner.save_budget {
            if inner.point_saves >= budget {
                return Err(StoreError::Unavailable(format!(
                    "save budget of {} exhausted",
                    budget
                )));
            }
        }
        inner.points.insert(point.address, point.clone());
        inner.point_saves += 1;
        Ok(())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_audit(&self, record: &AuditRecord) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.audits.contains_key(&record.id) {
            return Ok(false);
        }
        inner.audits.insert(record.id, record.clone());
        Ok(true)
    }

    async fn load_audit(&self, id: &AuditId) -> Result<Option<AuditRecord>, StoreError> {
        Ok(self.inner.lock().await.audits.get(id).cloned())
    }
}

#[async_trait]
impl CursorStore for MemoryStore {
    async fn load_cursor(&self) -> Result<Option<EventOrderingKey>, StoreError> {
        Ok(self.inner.lock().await.cursor)
    }

    async fn save_cursor(&self, key: EventOrderingKey) -> Result<(), StoreError> {
        self.inner.lock().await.cursor = Some(key);
        Ok(())
    }
}
