use crate::datasource::{DataSourceError, EventSource};
use crate::domain::{EventOrderingKey, LedgerEvent};
use crate::engine::{AuditError, AuditMirror, PointAccumulator, PointError};
use crate::store::{CursorStore, StoreError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// What to do when a single event cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventErrorPolicy {
    /// Stop the run; the cursor stays on the last handled event.
    #[default]
    Halt,
    /// Log the failure, move the cursor past the event and continue.
    Skip,
}

impl FromStr for EventErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "halt" => Ok(EventErrorPolicy::Halt),
            "skip" => Ok(EventErrorPolicy::Skip),
            other => Err(format!("must be halt or skip, got {}", other)),
        }
    }
}

impl fmt::Display for EventErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventErrorPolicy::Halt => write!(f, "halt"),
            EventErrorPolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Drives events from a source into the ledger, one at a time.
pub struct Indexer {
    source: Arc<dyn EventSource>,
    accumulator: PointAccumulator,
    mirror: AuditMirror,
    cursor: Arc<dyn CursorStore>,
    policy: EventErrorPolicy,
}

impl Indexer {
    pub fn new(
        source: Arc<dyn EventSource>,
        accumulator: PointAccumulator,
        mirror: AuditMirror,
        cursor: Arc<dyn CursorStore>,
        policy: EventErrorPolicy,
    ) -> Self {
        Self {
            source,
            accumulator,
            mirror,
            cursor,
            policy,
        }
    }

    /// Apply every event after the stored cursor.
    ///
    /// Events are applied in the order the source delivers them. After each
    /// handled or skipped event the cursor moves to the highest ordering key
    /// seen, so a later run resumes after it. An event whose key does not
    /// advance is still applied, with a warning.
    ///
    /// # Errors
    /// Source and store failures always stop the run. Unknown token weights
    /// and arithmetic overflow stop it only under `EventErrorPolicy::Halt`.
    pub async fn run(&self) -> Result<IndexerReport, IndexerError> {
        let start = self.cursor.load_cursor().await?;
        let events = self.source.fetch_events(start).await?;

        info!(
            cursor = ?start.map(|k| k.to_string()),
            pending = events.len(),
            policy = %self.policy,
            "indexer run started"
        );

        let mut report = IndexerReport {
            events_fetched: events.len(),
            cursor: start,
            ..IndexerReport::default()
        };

        for event in &events {
            let key = event.ordering_key();
            if let Some(prev) = report.cursor {
                if !key.follows(&prev) {
                    warn!(event = %key, previous = %prev, "event does not advance the cursor, applying as delivered");
                }
            }

            match self.handle(event, &mut report).await {
                Ok(()) => {}
                Err(err) if self.policy == EventErrorPolicy::Skip && err.is_event_local() => {
                    warn!(event = %key, kind = event.payload.kind(), error = %err, "skipping event");
                    report.events_skipped += 1;
                }
                Err(err) => return Err(err),
            }

            if report.cursor.map_or(true, |prev| key.follows(&prev)) {
                self.cursor.save_cursor(key).await?;
                report.cursor = Some(key);
            }
        }

        info!(
            transfers = report.transfers_applied,
            audits = report.audits_mirrored,
            duplicates = report.audits_duplicate,
            skipped = report.events_skipped,
            cursor = ?report.cursor.map(|k| k.to_string()),
            "indexer run finished"
        );

        Ok(report)
    }

    async fn handle(
        &self,
        event: &LedgerEvent,
        report: &mut IndexerReport,
    ) -> Result<(), IndexerError> {
        let key = event.ordering_key();

        if let Some(transfer) = event.as_transfer() {
            self.accumulator
                .apply_transfer(&transfer)
                .await
                .map_err(|source| IndexerError::Point { key, source })?;
            report.transfers_applied += 1;
            return Ok(());
        }

        let inserted = self
            .mirror
            .mirror(&event.payload, &event.meta)
            .await
            .map_err(|source| IndexerError::Audit { key, source })?;
        if inserted {
            report.audits_mirrored += 1;
        } else {
            report.audits_duplicate += 1;
        }
        debug!(event = %key, kind = event.payload.kind(), inserted, "handled admin event");
        Ok(())
    }
}

/// Counters for one indexer run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexerReport {
    pub events_fetched: usize,
    pub transfers_applied: usize,
    pub audits_mirrored: usize,
    pub audits_duplicate: usize,
    pub events_skipped: usize,
    /// Cursor after the run.
    pub cursor: Option<EventOrderingKey>,
}

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("event {key}: {source}")]
    Point {
        key: EventOrderingKey,
        #[source]
        source: PointError,
    },
    #[error("event {key}: {source}")]
    Audit {
        key: EventOrderingKey,
        #[source]
        source: AuditError,
    },
}

impl IndexerError {
    /// True when only the failing event is affected and the run may continue.
    pub fn is_event_local(&self) -> bool {
        match self {
            IndexerError::Point { source, .. } => source.is_event_local(),
            _ => false,
        }
    }
}
