//! Mock event source for testing without a feed file.

use super::{DataSourceError, EventSource};
use crate::domain::{EventOrderingKey, LedgerEvent};
use async_trait::async_trait;

/// Mock event source that returns predefined events in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MockEventSource {
    events: Vec<LedgerEvent>,
    failure: Option<DataSourceError>,
}

impl MockEventSource {
    /// Create a new mock source with no events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event to the mock source.
    pub fn with_event(mut self, event: impl Into<LedgerEvent>) -> Self {
        self.events.push(event.into());
        self
    }

    /// Add multiple events to the mock source.
    pub fn with_events(mut self, events: Vec<LedgerEvent>) -> Self {
        self.events.extend(events);
        self
    }

    /// Make every fetch fail with the given error.
    pub fn with_failure(mut self, error: DataSourceError) -> Self {
        self.failure = Some(error);
        self
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn fetch_events(
        &self,
        after: Option<EventOrderingKey>,
    ) -> Result<Vec<LedgerEvent>, DataSourceError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        Ok(self
            .events
            .iter()
            .filter(|e| after.map_or(true, |cursor| e.ordering_key().follows(&cursor)))
            .cloned()
            .collect())
    }
}
