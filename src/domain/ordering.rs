//! Event ordering key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an event in the chain: `(block_number, log_index)`.
///
/// The upstream source delivers events in ascending key order. Nothing in
/// the crate reorders events; the key is only compared to report a feed that
/// goes backwards and to persist the indexer cursor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct EventOrderingKey {
    pub block_number: u64,
    pub log_index: u32,
}

impl EventOrderingKey {
    pub fn new(block_number: u64, log_index: u32) -> Self {
        Self {
            block_number,
            log_index,
        }
    }

    /// Returns true if `self` strictly follows `previous`.
    pub fn follows(&self, previous: &EventOrderingKey) -> bool {
        self > previous
    }
}

impl fmt::Display for EventOrderingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}
