use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const VND_CURRENCY_CODE: &str = "VND";
pub const VND_CURRENCY_CODE_LOWER: &str = "vnd";

//--------------------------------------       Money         ---------------------------------------------------------
/// An exact monetary amount in minor currency units.
///
/// All arithmetic is integer arithmetic. Rounding, where it happens at all ([`Money::percent`] and
/// [`Money::divided_by`]), is half-up to the minor unit, so repeated calculations never accumulate binary
/// floating-point drift.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in minor currency units: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to Money", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}đ", self.0)
    }
}

/// Integer division rounded half-up (half away from zero for negative values).
fn div_round_half_up(num: i128, den: i128) -> i64 {
    debug_assert!(den > 0);
    let q = if num >= 0 { (num + den / 2) / den } else { -((-num + den / 2) / den) };
    #[allow(clippy::cast_possible_truncation)]
    {
        q as i64
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// Const constructor from minor currency units, for tolerance and rate constants.
    pub const fn from_minor(value: i64) -> Self {
        Self(value)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// The given percentage of this amount, rounded half-up to the minor unit.
    pub fn percent(self, pct: u32) -> Self {
        Self(div_round_half_up(i128::from(self.0) * i128::from(pct), 100))
    }

    /// This amount divided into `n` parts, rounded half-up to the minor unit.
    pub fn divided_by(self, n: u32) -> Self {
        assert!(n > 0, "cannot divide an amount into zero parts");
        Self(div_round_half_up(i128::from(self.0), i128::from(n)))
    }

    /// The absolute difference between two amounts.
    pub fn abs_diff(self, other: Self) -> Self {
        Self((self.0 - other.0).abs())
    }
}
