//! Mirrors administrative events into append-only audit records.

use crate::domain::{AuditRecord, EventMeta, EventPayload};
use crate::store::{AuditStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("transfer events are not mirrored")]
    NotAdministrative,
    #[error("failed to encode event parameters: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct AuditMirror {
    store: Arc<dyn AuditStore>,
}

impl AuditMirror {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Append the record for one administrative event.
    ///
    /// Returns `false` when a record with the same `(transaction_hash,
    /// log_index)` id already exists; the stored record is left as is.
    pub async fn mirror(&self, payload: &EventPayload, meta: &EventMeta) -> Result<bool, AuditError> {
        if matches!(payload, EventPayload::Transfer(_)) {
            return Err(AuditError::NotAdministrative);
        }

        let record = AuditRecord::from_event(payload, meta)?;
        let inserted = self.store.append_audit(&record).await?;
        if inserted {
            debug!(id = %record.id, kind = %record.kind, "mirrored event");
        } else {
            warn!(id = %record.id, kind = %record.kind, "audit record already present, keeping stored record");
        }
        Ok(inserted)
    }
}
