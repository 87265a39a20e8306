//! JSON-lines event feed.
//!
//! Each non-blank line holds one event object tagged by `kind`, for example
//! `{"kind":"transfer","tokenAddress":"0x..","from":"0x..","to":"0x..",
//! "value":"1000","blockNumber":1,"blockTimestamp":100,"logIndex":0,
//! "transactionHash":"0x.."}`.

use super::{DataSourceError, EventSource};
use crate::domain::{EventOrderingKey, LedgerEvent};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
}

impl JsonLinesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decode every event in a JSON-lines document. Line numbers in errors are
/// 1-based.
pub fn parse_events(content: &str) -> Result<Vec<LedgerEvent>, DataSourceError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<LedgerEvent>(line).map_err(|e| DataSourceError::ParseError {
                line: idx + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl EventSource for JsonLinesSource {
    async fn fetch_events(
        &self,
        after: Option<EventOrderingKey>,
    ) -> Result<Vec<LedgerEvent>, DataSourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DataSourceError::Io(format!("{}: {}", self.path.display(), e)))?;

        let events = parse_events(&content)?;
        let total = events.len();
        let pending: Vec<LedgerEvent> = match after {
            Some(cursor) => events
                .into_iter()
                .filter(|e| e.ordering_key().follows(&cursor))
                .collect(),
            None => events,
        };

        debug!(
            path = %self.path.display(),
            total,
            pending = pending.len(),
            "read event feed"
        );
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventPayload;
    use tempfile::TempDir;

    const TOKEN: &str = "0x7b1fcd81f8b91c5ef3743c4d56bf7c1e52c93360";

    fn transfer_line(block_number: u64, log_index: u32) -> String {
        format!(
            r#"{{"kind":"transfer","tokenAddress":"{}","from":"0x0000000000000000000000000000000000000000","to":"0x00000000000000000000000000000000000000AA","value":"1000","blockNumber":{},"blockTimestamp":100,"logIndex":{},"transactionHash":"0x{}"}}"#,
            TOKEN,
            block_number,
            log_index,
            "01".repeat(32)
        )
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let content = format!("{}\n\n   \n{}\n", transfer_line(1, 0), transfer_line(1, 1));
        let events = parse_events(&content).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].ordering_key(), EventOrderingKey::new(1, 1));
    }

    #[test]
    fn test_parse_error_names_line() {
        let content = format!("{}\n\n{{\"kind\":\"transfer\"}}\n", transfer_line(1, 0));
        match parse_events(&content) {
            Err(DataSourceError::ParseError { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_admin_event() {
        let line = format!(
            r#"{{"kind":"initialized","version":1,"blockNumber":5,"blockTimestamp":60,"logIndex":2,"transactionHash":"0x{}"}}"#,
            "02".repeat(32)
        );
        let events = parse_events(&line).unwrap();
        assert!(matches!(
            events[0].payload,
            EventPayload::Initialized { version: 1 }
        ));
    }

    #[tokio::test]
    async fn test_fetch_events_after_cursor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let content = [transfer_line(1, 0), transfer_line(1, 1), transfer_line(2, 0)].join("\n");
        std::fs::write(&path, content).unwrap();

        let source = JsonLinesSource::new(&path);
        assert_eq!(source.fetch_events(None).await.unwrap().len(), 3);

        let pending = source
            .fetch_events(Some(EventOrderingKey::new(1, 1)))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].ordering_key(), EventOrderingKey::new(2, 0));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = JsonLinesSource::new(dir.path().join("absent.jsonl"));
        assert!(matches!(
            source.fetch_events(None).await,
            Err(DataSourceError::Io(_))
        ));
    }
}
