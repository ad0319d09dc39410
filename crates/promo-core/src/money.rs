//! Money type for promotional price arithmetic.
//!
//! Amounts are integer minor units of a single implicit currency, which
//! sidesteps floating-point drift in discount math. The two rounding rules
//! the engine needs are explicit methods: flash prices round half-up,
//! voucher percent discounts floor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A monetary amount in integer minor units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount: i64,
}

impl Money {
    /// Create a new amount.
    pub fn new(amount: i64) -> Self {
        Self { amount }
    }

    /// The zero amount.
    pub fn zero() -> Self {
        Self::new(0)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Check if this is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Try to add, returning `None` on overflow.
    pub fn try_add(&self, other: Money) -> Option<Money> {
        self.amount.checked_add(other.amount).map(Money::new)
    }

    /// Try to multiply by a quantity, returning `None` on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount.checked_mul(factor).map(Money::new)
    }

    /// Subtract, saturating at zero. Discounts never push a total negative.
    pub fn saturating_sub_floor_zero(&self, other: Money) -> Money {
        Money::new(self.amount.saturating_sub(other.amount).max(0))
    }

    /// Price after a percentage discount, rounded half-up.
    ///
    /// `percent` is clamped to 0..=100. This is the flash-sale rule:
    /// `round(amount * (100 - percent) / 100)`.
    pub fn percent_off_rounded(&self, percent: u8) -> Money {
        let keep = 100 - i128::from(percent.min(100));
        let scaled = i128::from(self.amount) * keep;
        Money::new(((scaled + 50) / 100) as i64)
    }

    /// A percentage of this amount, floored. This is the voucher rule:
    /// `floor(amount * percent / 100)`.
    pub fn percent_floored(&self, percent: u8) -> Money {
        let scaled = i128::from(self.amount) * i128::from(percent.min(100));
        Money::new((scaled / 100) as i64)
    }

    /// Try to sum an iterator of amounts, returning `None` on overflow.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>) -> Option<Money> {
        iter.try_fold(Money::zero(), |acc, m| acc.try_add(*m))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::new(self.amount + other.amount)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::new(self.amount - other.amount)
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, factor: i64) -> Money {
        Money::new(self.amount * factor)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount)
    }
}
