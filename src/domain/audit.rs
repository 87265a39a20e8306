//! Append-only mirror records for administrative events.

use crate::domain::primitives::decode_fixed;
use crate::domain::{AddressParseError, EventMeta, EventPayload, TxHash};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Record id: transaction hash followed by the log index as 4 little-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AuditId([u8; 36]);

impl AuditId {
    pub fn new(transaction_hash: &TxHash, log_index: u32) -> Self {
        let mut bytes = [0u8; 36];
        bytes[..32].copy_from_slice(transaction_hash.as_bytes());
        bytes[32..].copy_from_slice(&(log_index as i32).to_le_bytes());
        AuditId(bytes)
    }
}

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AuditId {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<36>(s).map(AuditId)
    }
}

impl Serialize for AuditId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AuditId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A verbatim copy of one administrative event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: AuditId,
    pub kind: String,
    /// The event's own parameters, without the `kind` tag.
    pub params: serde_json::Value,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub transaction_hash: TxHash,
}

impl AuditRecord {
    /// Build the record for an administrative payload.
    ///
    /// # Errors
    /// Returns an error if the parameters cannot be represented as JSON.
    pub fn from_event(payload: &EventPayload, meta: &EventMeta) -> Result<Self, serde_json::Error> {
        let mut params = serde_json::to_value(payload)?;
        if let Some(object) = params.as_object_mut() {
            object.remove("kind");
        }

        Ok(AuditRecord {
            id: AuditId::new(&meta.transaction_hash, meta.log_index),
            kind: payload.kind().to_string(),
            params,
            block_number: meta.block_number,
            block_timestamp: meta.block_timestamp,
            transaction_hash: meta.transaction_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Amount;

    fn meta(log_index: u32) -> EventMeta {
        EventMeta {
            block_number: 12,
            block_timestamp: 1_700_000_000,
            log_index,
            transaction_hash: format!("0x{}", "0f".repeat(32)).parse().unwrap(),
        }
    }

    #[test]
    fn test_audit_id_appends_log_index_little_endian() {
        let id = AuditId::new(&meta(0).transaction_hash, 1);
        let hex = id.to_string();
        assert_eq!(hex.len(), 2 + 72);
        assert!(hex.ends_with("01000000"));
        assert!(hex.starts_with(&format!("0x{}", "0f".repeat(32))));
    }

    #[test]
    fn test_audit_ids_differ_by_log_index() {
        let tx = meta(0).transaction_hash;
        assert_ne!(AuditId::new(&tx, 1), AuditId::new(&tx, 2));
    }

    #[test]
    fn test_audit_id_parses_its_display_form() {
        let id = AuditId::new(&meta(0).transaction_hash, 9);
        assert_eq!(id.to_string().parse::<AuditId>().unwrap(), id);
        assert!("0x1234".parse::<AuditId>().is_err());
    }

    #[test]
    fn test_record_copies_params_verbatim() {
        let payload = EventPayload::Approval {
            owner: "0x1111111111111111111111111111111111111111".parse().unwrap(),
            spender: "0x2222222222222222222222222222222222222222".parse().unwrap(),
            value: Amount::from(77),
        };
        let record = AuditRecord::from_event(&payload, &meta(4)).unwrap();
        assert_eq!(record.kind, "approval");
        assert_eq!(record.block_number, 12);
        assert_eq!(record.block_timestamp, 1_700_000_000);
        assert_eq!(
            record.params,
            serde_json::json!({
                "owner": "0x1111111111111111111111111111111111111111",
                "spender": "0x2222222222222222222222222222222222222222",
                "value": "77",
            })
        );
    }

    #[test]
    fn test_unit_event_has_empty_params() {
        let record = AuditRecord::from_event(&EventPayload::Eip712DomainChanged, &meta(0)).unwrap();
        assert_eq!(record.kind, "eip712DomainChanged");
        assert_eq!(record.params, serde_json::json!({}));
    }
}
