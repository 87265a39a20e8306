use crate::domain::{Address, Amount, Point, TransferEvent};
use crate::store::{LedgerStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::weights::{UnknownTokenWeight, WeightTable, DENOMINATOR};

#[derive(Debug, Error)]
pub enum PointError {
    #[error(transparent)]
    UnknownTokenWeight(#[from] UnknownTokenWeight),
    #[error("arithmetic overflow: {0} exceeds its 256-bit range")]
    ArithmeticOverflow(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PointError {
    /// True for failures confined to the event being applied, as opposed to
    /// store failures that affect every following event.
    pub fn is_event_local(&self) -> bool {
        !matches!(self, PointError::Store(_))
    }
}

/// Weighted amounts derived from one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDelta {
    /// `floor(value * weight / DENOMINATOR)`.
    pub weighted_shares: Amount,
    /// `block_timestamp * weighted_shares`.
    pub time_contribution: Amount,
}

impl TransferDelta {
    /// Compute the weighted shares and time contribution of a transfer.
    ///
    /// Multiplies before dividing; the division floors. All arithmetic is
    /// exact, and each intermediate is checked against the uint256 range.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` when the value or a derived amount does not
    /// fit in 256 bits.
    pub fn compute(value: &Amount, weight: u32, block_timestamp: u64) -> Result<Self, PointError> {
        if !value.fits_u256() {
            return Err(PointError::ArithmeticOverflow("transfer value"));
        }

        let scaled = value * &Amount::from(u64::from(weight));
        let weighted_shares = &scaled / &Amount::from(u64::from(DENOMINATOR));
        if !weighted_shares.fits_u256() {
            return Err(PointError::ArithmeticOverflow("weighted shares"));
        }

        let time_contribution = &Amount::from(block_timestamp) * &weighted_shares;
        if !time_contribution.fits_u256() {
            return Err(PointError::ArithmeticOverflow("time contribution"));
        }

        Ok(Self {
            weighted_shares,
            time_contribution,
        })
    }
}

/// What one applied transfer did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub delta: TransferDelta,
    /// Debited account, `None` for mints.
    pub sender: Option<Address>,
    /// Credited account, `None` for burns.
    pub receiver: Option<Address>,
}

/// Applies transfers to the points ledger.
///
/// Holds the immutable weight table and the store. Transfers must be applied
/// one at a time, in `(block_number, log_index)` order; the accumulator does
/// no reordering or deduplication, so applying the same event twice counts
/// it twice.
pub struct PointAccumulator {
    weights: Arc<WeightTable>,
    store: Arc<dyn LedgerStore>,
}

impl PointAccumulator {
    pub fn new(weights: Arc<WeightTable>, store: Arc<dyn LedgerStore>) -> Self {
        Self { weights, store }
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Apply one transfer to both endpoints.
    ///
    /// The sender (unless it is the zero address) is debited and its outbound
    /// time-weighted sum grows; the receiver (unless it is the zero address)
    /// is credited and its inbound sum grows. A self-transfer updates a single
    /// loaded entry, outflow first, and persists it once.
    ///
    /// Both endpoints are computed and range-checked before anything is
    /// written. The two writes are independent: a store failure between them
    /// leaves the sender updated and the receiver not.
    ///
    /// # Errors
    /// - `UnknownTokenWeight`: nothing was loaded or written.
    /// - `ArithmeticOverflow`: no endpoint was updated. Entries created by
    ///   load-or-create stay.
    /// - `Store`: propagated unchanged.
    pub async fn apply_transfer(&self, event: &TransferEvent) -> Result<TransferOutcome, PointError> {
        let weight = self.weights.weight_of(&event.token_address)?;
        let delta = TransferDelta::compute(&event.value, weight, event.block_timestamp)?;

        let sender = (!event.from.is_zero()).then_some(event.from);
        let receiver = (!event.to.is_zero()).then_some(event.to);

        match (sender, receiver) {
            (Some(from), Some(to)) if from == to => {
                let mut point = self.load_or_create(from).await?;
                point.apply_outflow(&delta.weighted_shares, &delta.time_contribution);
                point.apply_inflow(&delta.weighted_shares, &delta.time_contribution);
                ensure_output_widths(&point)?;
                self.store.save(&point).await?;
            }
            _ => {
                let mut from_point = match sender {
                    Some(address) => Some(self.load_or_create(address).await?),
                    None => None,
                };
                if let Some(point) = from_point.as_mut() {
                    point.apply_outflow(&delta.weighted_shares, &delta.time_contribution);
                    ensure_output_widths(point)?;
                }

                let mut to_point = match receiver {
                    Some(address) => Some(self.load_or_create(address).await?),
                    None => None,
                };
                if let Some(point) = to_point.as_mut() {
                    point.apply_inflow(&delta.weighted_shares, &delta.time_contribution);
                    ensure_output_widths(point)?;
                }

                if let Some(point) = &from_point {
                    self.store.save(point).await?;
                }
                if let Some(point) = &to_point {
                    self.store.save(point).await?;
                }
            }
        }

        debug!(
            token = %event.token_address,
            block = event.block_number,
            log_index = event.log_index,
            weighted_shares = %delta.weighted_shares,
            time_contribution = %delta.time_contribution,
            "applied transfer"
        );

        Ok(TransferOutcome {
            delta,
            sender,
            receiver,
        })
    }

    /// Load the entry for `address`, creating and persisting a zero entry if
    /// none exists yet.
    pub async fn load_or_create(&self, address: Address) -> Result<Point, PointError> {
        if let Some(point) = self.store.load(&address).await? {
            return Ok(point);
        }

        let point = Point::new(address);
        self.store.save(&point).await?;
        debug!(address = %address, "created point");
        Ok(point)
    }
}

fn ensure_output_widths(point: &Point) -> Result<(), PointError> {
    if !point.balance.fits_i256() {
        return Err(PointError::ArithmeticOverflow("balance"));
    }
    if !point.time_weight_amount_in.fits_u256() {
        return Err(PointError::ArithmeticOverflow("timeWeightAmountIn"));
    }
    if !point.time_weight_amount_out.fits_u256() {
        return Err(PointError::ArithmeticOverflow("timeWeightAmountOut"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SignedAmount, TxHash};
    use crate::store::MemoryStore;

    const WBETH: &str = "0x7f62b7a0a9848d5e261960ff4b4009206ad00bd5";

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn transfer(from: Address, to: Address, value: u64, timestamp: u64) -> TransferEvent {
        TransferEvent {
            token_address: WBETH.parse().unwrap(),
            from,
            to,
            value: Amount::from(value),
            block_number: 1,
            block_timestamp: timestamp,
            log_index: 0,
            transaction_hash: TxHash::default(),
        }
    }

    fn setup() -> (PointAccumulator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let accumulator = PointAccumulator::new(Arc::new(WeightTable::reference()), store.clone());
        (accumulator, store)
    }

    #[test]
    fn test_delta_multiplies_before_dividing() {
        // Dividing first would give 14999 / 10000 * 10330 = 10330.
        let delta = TransferDelta::compute(&Amount::from(14_999), 10_330, 2).unwrap();
        assert_eq!(delta.weighted_shares, Amount::from(15_493));
        assert_eq!(delta.time_contribution, Amount::from(30_986));
    }

    #[test]
    fn test_delta_truncates_toward_zero() {
        // 1 * 10330 / 10000 = 1.033
        let delta = TransferDelta::compute(&Amount::from(1), 10_330, 100).unwrap();
        assert_eq!(delta.weighted_shares, Amount::from(1));
        assert_eq!(delta.time_contribution, Amount::from(100));

        // 9 * 1000 / 10000 = 0.9
        let delta = TransferDelta::compute(&Amount::from(9), 1_000, 100).unwrap();
        assert!(delta.weighted_shares.is_zero());
        assert!(delta.time_contribution.is_zero());
    }

    #[test]
    fn test_delta_overflow_is_reported() {
        let max = Amount::from_str_canonical(
            "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        )
        .unwrap();
        let err = TransferDelta::compute(&max, 10_330, 1).unwrap_err();
        assert!(matches!(err, PointError::ArithmeticOverflow("weighted shares")));

        let err = TransferDelta::compute(&max, DENOMINATOR, 2).unwrap_err();
        assert!(matches!(err, PointError::ArithmeticOverflow("time contribution")));
    }

    #[tokio::test]
    async fn test_load_or_create_persists_zero_point() {
        let (accumulator, store) = setup();
        let point = accumulator.load_or_create(addr(1)).await.unwrap();
        assert_eq!(point, Point::new(addr(1)));
        assert_eq!(store.load(&addr(1)).await.unwrap(), Some(point));
        assert_eq!(store.point_saves().await, 1);

        // A second call loads instead of re-creating.
        accumulator.load_or_create(addr(1)).await.unwrap();
        assert_eq!(store.point_saves().await, 1);
    }

    #[tokio::test]
    async fn test_weighted_transfer_updates_both_sides() {
        let (accumulator, store) = setup();
        let outcome = accumulator
            .apply_transfer(&transfer(addr(1), addr(2), 1000, 50))
            .await
            .unwrap();

        assert_eq!(outcome.delta.weighted_shares, Amount::from(1033));
        assert_eq!(outcome.delta.time_contribution, Amount::from(51_650));
        assert_eq!(outcome.sender, Some(addr(1)));
        assert_eq!(outcome.receiver, Some(addr(2)));

        let a = store.load(&addr(1)).await.unwrap().unwrap();
        assert_eq!(a.balance, SignedAmount::from(-1033));
        assert_eq!(a.time_weight_amount_out, Amount::from(51_650));
        assert!(a.time_weight_amount_in.is_zero());

        let b = store.load(&addr(2)).await.unwrap().unwrap();
        assert_eq!(b.balance, SignedAmount::from(1033));
        assert_eq!(b.time_weight_amount_in, Amount::from(51_650));
        assert!(b.time_weight_amount_out.is_zero());
    }

    #[tokio::test]
    async fn test_burn_skips_zero_address() {
        let (accumulator, store) = setup();
        let outcome = accumulator
            .apply_transfer(&transfer(addr(1), Address::ZERO, 10_000, 3))
            .await
            .unwrap();
        assert_eq!(outcome.receiver, None);
        assert!(store.load(&Address::ZERO).await.unwrap().is_none());

        let a = store.load(&addr(1)).await.unwrap().unwrap();
        assert_eq!(a.balance, SignedAmount::from(-10_330));
        assert_eq!(a.time_weight_amount_out, Amount::from(30_990));
    }

    #[tokio::test]
    async fn test_zero_to_zero_touches_nothing() {
        let (accumulator, store) = setup();
        accumulator
            .apply_transfer(&transfer(Address::ZERO, Address::ZERO, 5, 5))
            .await
            .unwrap();
        assert!(store.points().await.is_empty());
    }

    #[tokio::test]
    async fn test_self_transfer_saves_once() {
        let (accumulator, store) = setup();
        accumulator
            .apply_transfer(&transfer(addr(1), addr(1), 1000, 50))
            .await
            .unwrap();

        // One save for creation, one for the combined update.
        assert_eq!(store.point_saves().await, 2);
        let a = store.load(&addr(1)).await.unwrap().unwrap();
        assert!(a.balance.is_zero());
        assert_eq!(a.time_weight_amount_in, Amount::from(51_650));
        assert_eq!(a.time_weight_amount_out, Amount::from(51_650));
    }

    #[tokio::test]
    async fn test_unknown_token_writes_nothing() {
        let (accumulator, store) = setup();
        let mut event = transfer(addr(1), addr(2), 1000, 50);
        event.token_address = addr(9);

        let err = accumulator.apply_transfer(&event).await.unwrap_err();
        assert!(matches!(err, PointError::UnknownTokenWeight(UnknownTokenWeight(t)) if t == addr(9)));
        assert!(err.is_event_local());
        assert_eq!(store.point_saves().await, 0);
    }

    #[tokio::test]
    async fn test_balance_overflow_leaves_endpoints_untouched() {
        let half = Amount::from_str_canonical(
            "57896044618658097711785492504343953926634992332820282019728792003956564819968",
        )
        .unwrap();
        let mut rich = Point::new(addr(2));
        rich.balance = &SignedAmount::from(&half) - &Amount::from(1);
        let before = rich.clone();

        let store = Arc::new(MemoryStore::with_points(vec![rich]));
        let weights = WeightTable::new(vec![(addr(7), DENOMINATOR)]).unwrap();
        let accumulator = PointAccumulator::new(Arc::new(weights), store.clone());

        let mut event = transfer(Address::ZERO, addr(2), 1, 0);
        event.token_address = addr(7);
        let err = accumulator.apply_transfer(&event).await.unwrap_err();
        assert!(matches!(err, PointError::ArithmeticOverflow("balance")));
        assert_eq!(store.load(&addr(2)).await.unwrap(), Some(before));
    }

    #[tokio::test]
    async fn test_store_failure_between_endpoints_is_not_rolled_back() {
        // Budget: create sender, create receiver, save sender; receiver save fails.
        let store = Arc::new(MemoryStore::new().fail_saves_after(3));
        let accumulator = PointAccumulator::new(Arc::new(WeightTable::reference()), store.clone());

        let err = accumulator
            .apply_transfer(&transfer(addr(1), addr(2), 1000, 50))
            .await
            .unwrap_err();
        assert!(matches!(err, PointError::Store(StoreError::Unavailable(_))));
        assert!(!err.is_event_local());

        let a = store.load(&addr(1)).await.unwrap().unwrap();
        assert_eq!(a.balance, SignedAmount::from(-1033));
        let b = store.load(&addr(2)).await.unwrap().unwrap();
        assert!(b.balance.is_zero());
    }
}
