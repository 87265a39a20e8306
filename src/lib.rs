pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use config::Config;
pub use datasource::{DataSourceError, EventSource, JsonLinesSource, MockEventSource};
pub use db::{init_db, Repository};
pub use domain::{
    canonicalize, Address, Amount, AuditId, AuditRecord, EventOrderingKey, LedgerEvent, Point,
    SignedAmount, TransferEvent, TxHash,
};
pub use engine::{AuditMirror, PointAccumulator, PointError, WeightTable, DENOMINATOR};
pub use error::AppError;
pub use orchestration::{EventErrorPolicy, Indexer, IndexerReport};
pub use store::{AuditStore, CursorStore, LedgerStore, MemoryStore, StoreError};
