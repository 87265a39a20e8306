//! Store abstractions the ledger writes through.
//!
//! The core only needs a keyed get/put over `Point` entries (`LedgerStore`).
//! Audit records and the indexer cursor live behind their own traits so a
//! store can be swapped without touching the accumulator.

use crate::domain::{Address, AuditId, AuditRecord, EventOrderingKey, Point};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

/// Keyed persistence for `Point` entries.
///
/// Calls are awaited one at a time; implementations need single-key
/// read-modify-write semantics only, no cross-key transactions.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load the entry for a canonical address.
    async fn load(&self, address: &Address) -> Result<Option<Point>, StoreError>;

    /// Insert or replace the entry keyed by `point.address`.
    async fn save(&self, point: &Point) -> Result<(), StoreError>;
}

/// Append-only storage for administrative event mirrors.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append a record. Returns `false` and keeps the existing record when
    /// the id is already present.
    async fn append_audit(&self, record: &AuditRecord) -> Result<bool, StoreError>;

    async fn load_audit(&self, id: &AuditId) -> Result<Option<AuditRecord>, StoreError>;
}

/// Position of the last event the indexer finished handling.
#[async_trait]
pub trait CursorStore: Send + Sync {
    async fn load_cursor(&self) -> Result<Option<EventOrderingKey>, StoreError>;

    async fn save_cursor(&self, key: EventOrderingKey) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("corrupt {field} for {key}: {message}")]
    Corrupt {
        key: String,
        field: &'static str,
        message: String,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
