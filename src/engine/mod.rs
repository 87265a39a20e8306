//! Ledger engine: weight lookup, point accumulation and audit mirroring.

pub mod accumulator;
pub mod audit;
pub mod weights;

pub use accumulator::{PointAccumulator, PointError, TransferDelta, TransferOutcome};
pub use audit::{AuditError, AuditMirror};
pub use weights::{UnknownTokenWeight, WeightTable, WeightTableError, DENOMINATOR};
