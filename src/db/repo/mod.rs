//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct, the SQLite implementation of
//! the store traits. Methods are organized across submodules:
//! - `points.rs` - Point entries
//! - `audit.rs` - Audit records and the indexer cursor

mod audit;
mod points;

use crate::domain::{Address, AuditId, AuditRecord, EventOrderingKey, Point};
use crate::store::{AuditStore, CursorStore, LedgerStore, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }
}

/// Convert an unsigned chain integer to SQLite's signed INTEGER.
fn to_sql_int(value: u64, key: &str, field: &'static str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Corrupt {
        key: key.to_string(),
        field,
        message: format!("{} does not fit in a signed 64-bit column", value),
    })
}

fn from_sql_int(value: i64, key: &str, field: &'static str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt {
        key: key.to_string(),
        field,
        message: format!("negative value {}", value),
    })
}

#[async_trait]
impl LedgerStore for Repository {
    async fn load(&self, address: &Address) -> Result<Option<Point>, StoreError> {
        self.load_point(address).await
    }

    async fn save(&self, point: &Point) -> Result<(), StoreError> {
        self.upsert_point(point).await
    }
}

#[async_trait]
impl AuditStore for Repository {
    async fn append_audit(&self, record: &AuditRecord) -> Result<bool, StoreError> {
        self.insert_audit_record(record).await
    }

    async fn load_audit(&self, id: &AuditId) -> Result<Option<AuditRecord>, StoreError> {
        self.load_audit_record(id).await
    }
}

#[async_trait]
impl CursorStore for Repository {
    async fn load_cursor(&self) -> Result<Option<EventOrderingKey>, StoreError> {
        self.get_cursor().await
    }

    async fn save_cursor(&self, key: EventOrderingKey) -> Result<(), StoreError> {
        self.store_cursor(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_int_conversions() {
        assert_eq!(to_sql_int(42, "k", "block_number").unwrap(), 42);
        assert!(matches!(
            to_sql_int(u64::MAX, "k", "block_number"),
            Err(StoreError::Corrupt { field: "block_number", .. })
        ));
        assert_eq!(from_sql_int(7, "k", "log_index").unwrap(), 7);
        assert!(from_sql_int(-1, "k", "log_index").is_err());
    }
}
