use std::fmt;

use crate::model::Denomination;

/// Currency value in the machine's single integer unit.
///
/// Signed so that a depleted reserve can report a negative profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_units(value: i64) -> Self {
        Amount(value)
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Value of `count` coins of `denomination`.
    pub fn of_coins(denomination: Denomination, count: u32) -> Self {
        Amount(i64::from(denomination) * i64::from(count))
    }
}

impl From<Denomination> for Amount {
    fn from(value: Denomination) -> Self {
        Amount(i64::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}
