//! Domain types for the weighted points ledger.
//!
//! This module provides:
//! - Address canonicalization and fixed-width hex identifiers
//! - Arbitrary-precision amounts with explicit 256-bit range checks
//! - Decoded transfer and administrative events
//! - The per-account `Point` entry and audit mirror records

pub mod amount;
pub mod audit;
pub mod event;
pub mod ordering;
pub mod point;
pub mod primitives;

pub use amount::{Amount, AmountParseError, SignedAmount};
pub use audit::{AuditId, AuditRecord};
pub use event::{EventMeta, EventPayload, LedgerEvent, TransferEvent, TransferParams};
pub use ordering::EventOrderingKey;
pub use point::Point;
pub use primitives::{canonicalize, Address, AddressParseError, TxHash};
