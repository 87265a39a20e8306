//! Event source abstraction for feeding decoded events to the indexer.

use crate::domain::{EventOrderingKey, LedgerEvent};
use async_trait::async_trait;
use std::fmt;

pub mod jsonl;
pub mod mock;

pub use jsonl::JsonLinesSource;
pub use mock::MockEventSource;

/// Source of decoded contract events.
///
/// Implementations deliver events in the order the chain produced them,
/// ascending by `(block_number, log_index)`. The indexer applies them exactly
/// as delivered.
#[async_trait]
pub trait EventSource: Send + Sync + fmt::Debug {
    /// Fetch the events strictly after `after`, or every event when `after`
    /// is `None`.
    ///
    /// # Returns
    /// Vector of events in source order
    async fn fetch_events(
        &self,
        after: Option<EventOrderingKey>,
    ) -> Result<Vec<LedgerEvent>, DataSourceError>;
}

/// Error type for event source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// I/O error reading the feed
    Io(String),
    /// A record could not be decoded
    ParseError { line: usize, message: String },
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::Io(msg) => write!(f, "I/O error: {}", msg),
            DataSourceError::ParseError { line, message } => {
                write!(f, "Parse error on line {}: {}", line, message)
            }
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}

impl From<std::io::Error> for DataSourceError {
    fn from(err: std::io::Error) -> Self {
        DataSourceError::Io(err.to_string())
    }
}
