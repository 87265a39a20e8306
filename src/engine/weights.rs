//! Static per-token price weights.

use crate::domain::Address;
use std::collections::HashMap;
use thiserror::Error;

/// Fixed denominator every weight numerator is expressed over.
pub const DENOMINATOR: u32 = 10_000;

/// Reference configuration: `(token, weight)` with weights over [`DENOMINATOR`].
pub const REFERENCE_WEIGHTS: [(&str, u32); 4] = [
    // stETH, 1.0x
    ("0x7b1fcd81f8b91c5ef3743c4d56bf7c1e52c93360", 10_000),
    // mETH, 1.024x
    ("0xb5b8c247c740d53b6fbab10f1c17922788baed54", 10_240),
    // wBETH, 1.033x
    ("0x7f62b7a0a9848d5e261960ff4b4009206ad00bd5", 10_330),
    // swETH, 1.053x
    ("0xbb68f4548a1c26b6611cbb8087c25a616edd8569", 10_530),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no weight configured for token {0}")]
pub struct UnknownTokenWeight(pub Address);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightTableError {
    #[error("token {0} listed more than once")]
    DuplicateToken(Address),
    #[error("token {0} has a zero weight")]
    ZeroWeight(Address),
    #[error("invalid token address: {0}")]
    InvalidToken(String),
}

/// Immutable map from canonical token address to weight numerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    weights: HashMap<Address, u32>,
}

impl WeightTable {
    /// Build a table from `(token, weight)` entries.
    ///
    /// # Errors
    /// Rejects tokens listed twice and zero weights.
    pub fn new(entries: impl IntoIterator<Item = (Address, u32)>) -> Result<Self, WeightTableError> {
        let mut weights = HashMap::new();
        for (token, weight) in entries {
            if weight == 0 {
                return Err(WeightTableError::ZeroWeight(token));
            }
            if weights.insert(token, weight).is_some() {
                return Err(WeightTableError::DuplicateToken(token));
            }
        }
        Ok(Self { weights })
    }

    /// The four liquid staking tokens of the reference deployment.
    pub fn reference() -> Self {
        let entries = REFERENCE_WEIGHTS.iter().filter_map(|(token, weight)| {
            token.parse::<Address>().ok().map(|address| (address, *weight))
        });
        Self {
            weights: entries.collect(),
        }
    }

    /// Parse `addr:weight` pairs separated by commas.
    ///
    /// # Errors
    /// Returns an error for malformed pairs, bad addresses, duplicates and
    /// zero weights.
    pub fn parse(raw: &str) -> Result<Self, WeightTableError> {
        let mut entries = Vec::new();
        for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (token, weight) = pair
                .split_once(':')
                .ok_or_else(|| WeightTableError::InvalidToken(pair.to_string()))?;
            let token: Address = token
                .trim()
                .parse()
                .map_err(|_| WeightTableError::InvalidToken(token.trim().to_string()))?;
            let weight: u32 = weight
                .trim()
                .parse()
                .map_err(|_| WeightTableError::InvalidToken(pair.to_string()))?;
            entries.push((token, weight));
        }
        Self::new(entries)
    }

    /// Weight numerator for a token.
    ///
    /// # Errors
    /// Returns `UnknownTokenWeight` when the token is not configured. There is
    /// no default weight.
    pub fn weight_of(&self, token: &Address) -> Result<u32, UnknownTokenWeight> {
        self.weights
            .get(token)
            .copied()
            .ok_or(UnknownTokenWeight(*token))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
