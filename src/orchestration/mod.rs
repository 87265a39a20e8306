//! Runtime orchestration: pulls events from a source and applies them.

pub mod indexer;

pub use indexer::{EventErrorPolicy, Indexer, IndexerError, IndexerReport};
