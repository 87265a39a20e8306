//! Per-account points ledger entry.

use crate::domain::{Address, Amount, SignedAmount};
use serde::{Deserialize, Serialize};

/// Weighted ledger entry for one canonical account address.
///
/// Created lazily the first time an address appears on either side of a
/// transfer and never deleted. `balance` is the running net of weighted
/// shares and may go negative on malformed input. The two time-weighted
/// sums only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub address: Address,
    pub balance: SignedAmount,
    pub time_weight_amount_in: Amount,
    pub time_weight_amount_out: Amount,
}

impl Point {
    /// A fresh, all-zero entry.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balance: SignedAmount::zero(),
            time_weight_amount_in: Amount::zero(),
            time_weight_amount_out: Amount::zero(),
        }
    }

    /// Record an outbound transfer.
    pub fn apply_outflow(&mut self, weighted_shares: &Amount, time_contribution: &Amount) {
        self.time_weight_amount_out = &self.time_weight_amount_out + time_contribution;
        self.balance = &self.balance - weighted_shares;
    }

    /// Record an inbound transfer.
    pub fn apply_inflow(&mut self, weighted_shares: &Amount, time_contribution: &Amount) {
        self.time_weight_amount_in = &self.time_weight_amount_in + time_contribution;
        self.balance = &self.balance + weighted_shares;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        "0x1111111111111111111111111111111111111111".parse().unwrap()
    }

    #[test]
    fn test_new_point_is_zero() {
        let point = Point::new(alice());
        assert!(point.balance.is_zero());
        assert!(point.time_weight_amount_in.is_zero());
        assert!(point.time_weight_amount_out.is_zero());
    }

    #[test]
    fn test_outflow_then_inflow_cancels_balance() {
        let mut point = Point::new(alice());
        let shares = Amount::from(1033);
        let contribution = Amount::from(51650);

        point.apply_outflow(&shares, &contribution);
        assert_eq!(point.balance, SignedAmount::from(-1033));
        assert_eq!(point.time_weight_amount_out, contribution);

        point.apply_inflow(&shares, &contribution);
        assert!(point.balance.is_zero());
        assert_eq!(point.time_weight_amount_in, contribution);
        assert_eq!(point.time_weight_amount_out, contribution);
    }

    #[test]
    fn test_point_json_shape() {
        let mut point = Point::new(alice());
        point.apply_inflow(&Amount::from(1000), &Amount::from(100000));
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["address"], "0x1111111111111111111111111111111111111111");
        assert_eq!(json["balance"], "1000");
        assert_eq!(json["timeWeightAmountIn"], "100000");
        assert_eq!(json["timeWeightAmountOut"], "0");
    }
}
