//! Exact decimal type for prices, quantities and balances
//!
//! Venues report numbers as JSON strings (`"0.0495"`), JSON numbers
//! (`0.0495`) or occasionally in scientific notation (`1e-8`). `Fixed`
//! accepts all three and never goes through `f64`.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt::{self, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Exact decimal used for every price and quantity crossing the API boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed {
    value: Decimal,
}

impl Fixed {
    pub const ZERO: Fixed = Fixed {
        value: Decimal::ZERO,
    };

    pub const ONE: Fixed = Fixed {
        value: Decimal::ONE,
    };

    /// Parse a decimal string, accepting scientific notation
    pub fn from_str_exact(s: &str) -> Result<Self, FixedError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(FixedError::Empty);
        }

        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Self::from)
            .map_err(|_| FixedError::InvalidValue(trimmed.to_string()))
    }

    /// Decode a JSON string or number
    pub fn from_json(value: &Value) -> Result<Self, FixedError> {
        match value {
            Value::String(s) => Self::from_str_exact(s),
            Value::Number(n) => Self::from_str_exact(&n.to_string()),
            other => Err(FixedError::InvalidValue(other.to_string())),
        }
    }

    pub fn from_i64(value: i64) -> Self {
        Self::from(Decimal::from(value))
    }

    /// Scale an integer amount expressed in minor units (e.g. satoshis)
    pub fn from_minor_units(value: i64, decimals: u32) -> Self {
        Self::from(Decimal::new(value, decimals))
    }

    /// Express this amount as an integer count of minor units, truncating
    pub fn to_minor_units(&self, decimals: u32) -> Option<i64> {
        let factor = Decimal::from(10i64.checked_pow(decimals)?);
        self.value.checked_mul(factor)?.trunc().to_i64()
    }

    pub fn to_decimal(&self) -> Decimal {
        self.value
    }

    /// Lossy conversion for display or statistics
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(0.0)
    }

    /// Render without trailing zeros, the way venues expect order fields
    pub fn to_plain_string(&self) -> String {
        self.value.normalize().to_string()
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.value.is_sign_positive() && !self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.value.is_zero()
    }

    pub fn abs(&self) -> Self {
        Self::from(self.value.abs())
    }

    pub fn round_dp(&self, dp: u32) -> Self {
        Self::from(self.value.round_dp(dp))
    }

    pub fn checked_div(&self, rhs: Fixed) -> Option<Fixed> {
        self.value.checked_div(rhs.value).map(Self::from)
    }
}

/// Decimal parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixedError {
    #[error("Empty decimal value")]
    Empty,
    #[error("Invalid decimal value: {0}")]
    InvalidValue(String),
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Self) -> Self::Output {
        Fixed::from(self.value + rhs.value)
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Self) -> Self::Output {
        Fixed::from(self.value - rhs.value)
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Self) -> Self::Output {
        Fixed::from(self.value * rhs.value)
    }
}

impl Div for Fixed {
    type Output = Fixed;

    fn div(self, rhs: Self) -> Self::Output {
        Fixed::from(self.value / rhs.value)
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Self::Output {
        Fixed::from(-self.value)
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
    }
}

impl Sum for Fixed {
    fn sum<I: Iterator<Item = Fixed>>(iter: I) -> Self {
        iter.fold(Fixed::ZERO, |acc, x| acc + x)
    }
}

impl Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Fixed {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl From<Decimal> for Fixed {
    fn from(value: Decimal) -> Self {
        Fixed { value }
    }
}

impl From<Fixed> for Decimal {
    fn from(fixed: Fixed) -> Self {
        fixed.value
    }
}

impl Serialize for Fixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for Fixed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Fixed::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Build a `Fixed` from a literal, panicking on malformed input
#[macro_export]
macro_rules! fixed {
    ($value:expr) => {
        $crate::fixed::Fixed::from_str_exact(stringify!($value)).unwrap()
    };
}
