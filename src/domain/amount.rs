//! Arbitrary-precision integer amounts backed by num-bigint.
//!
//! Token values, weighted shares and time-weighted sums are unbounded
//! integers in memory; range checks against the 256-bit output widths are
//! explicit (`fits_u256` / `fits_i256`) so overflow is reported instead of
//! wrapping. Amounts serialize as decimal strings.

use num_bigint::{BigInt, BigUint, Sign};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid integer amount: {0:?}")]
pub struct AmountParseError(pub String);

fn two_pow(bits: u32) -> BigUint {
    BigUint::from(1u8) << bits
}

/// Unsigned integer amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    pub fn new(value: BigUint) -> Self {
        Amount(value)
    }

    pub fn zero() -> Self {
        Amount(BigUint::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    pub fn inner(&self) -> &BigUint {
        &self.0
    }

    /// Parse a decimal string, or a `0x`-prefixed hex string.
    pub fn from_str_canonical(s: &str) -> Result<Self, AmountParseError> {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix("0x") {
            Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
            None => BigUint::parse_bytes(trimmed.as_bytes(), 10),
        };
        parsed
            .filter(|_| !trimmed.contains('_'))
            .map(Amount)
            .ok_or_else(|| AmountParseError(s.to_string()))
    }

    /// Decimal representation without separators or leading zeros.
    pub fn to_canonical_string(&self) -> String {
        self.0.to_str_radix(10)
    }

    /// True when the value is representable as a uint256.
    pub fn fits_u256(&self) -> bool {
        self.0.bits() <= 256
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(BigUint::from(value))
    }
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Amount(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl std::ops::Add<&Amount> for &Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl std::ops::Mul<&Amount> for &Amount {
    type Output = Amount;

    fn mul(self, rhs: &Amount) -> Amount {
        Amount(&self.0 * &rhs.0)
    }
}

/// Floor division; panics on a zero divisor like the primitive integers.
impl std::ops::Div<&Amount> for &Amount {
    type Output = Amount;

    fn div(self, rhs: &Amount) -> Amount {
        Amount(&self.0 / &rhs.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        u64::try_from(v)
            .map(Amount::from)
            .map_err(|_| E::custom(format!("negative amount {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str_canonical(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Signed integer amount, used for balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedAmount(BigInt);

impl SignedAmount {
    pub fn new(value: BigInt) -> Self {
        SignedAmount(value)
    }

    pub fn zero() -> Self {
        SignedAmount(BigInt::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0.sign() == Sign::NoSign
    }

    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    pub fn inner(&self) -> &BigInt {
        &self.0
    }

    pub fn from_str_canonical(s: &str) -> Result<Self, AmountParseError> {
        let trimmed = s.trim();
        BigInt::parse_bytes(trimmed.as_bytes(), 10)
            .filter(|_| !trimmed.contains('_'))
            .map(SignedAmount)
            .ok_or_else(|| AmountParseError(s.to_string()))
    }

    pub fn to_canonical_string(&self) -> String {
        self.0.to_str_radix(10)
    }

    /// True when the value is representable as an int256.
    pub fn fits_i256(&self) -> bool {
        let limit = two_pow(255);
        match self.0.sign() {
            Sign::Minus => *self.0.magnitude() <= limit,
            _ => *self.0.magnitude() < limit,
        }
    }
}

impl From<i64> for SignedAmount {
    fn from(value: i64) -> Self {
        SignedAmount(BigInt::from(value))
    }
}

impl From<&Amount> for SignedAmount {
    fn from(value: &Amount) -> Self {
        SignedAmount(BigInt::from(value.0.clone()))
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for SignedAmount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl std::ops::Add<&Amount> for &SignedAmount {
    type Output = SignedAmount;

    fn add(self, rhs: &Amount) -> SignedAmount {
        SignedAmount(&self.0 + BigInt::from(rhs.0.clone()))
    }
}

impl std::ops::Sub<&Amount> for &SignedAmount {
    type Output = SignedAmount;

    fn sub(self, rhs: &Amount) -> SignedAmount {
        SignedAmount(&self.0 - BigInt::from(rhs.0.clone()))
    }
}

impl std::ops::Add<&SignedAmount> for &SignedAmount {
    type Output = SignedAmount;

    fn add(self, rhs: &SignedAmount) -> SignedAmount {
        SignedAmount(&self.0 + &rhs.0)
    }
}

impl Serialize for SignedAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct SignedAmountVisitor;

impl<'de> Visitor<'de> for SignedAmountVisitor {
    type Value = SignedAmount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SignedAmount, E> {
        Ok(SignedAmount(BigInt::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SignedAmount, E> {
        Ok(SignedAmount::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SignedAmount, E> {
        SignedAmount::from_str_canonical(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for SignedAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SignedAmountVisitor)
    }
}
