use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{EstimatorError, Result};

/// Number of mojos in one XCH.
pub const MOJO_PER_XCH: u64 = 1_000_000_000_000;

/// Number of fractional decimal digits an XCH amount can carry.
const XCH_DECIMALS: usize = 12;

/// Represents a fee rate in mojos per CLVM cost.
///
/// The mojo is the smallest indivisible unit, so the stored value is exact.
/// Conversions from XCH amounts divide by a cost and round toward zero;
/// conversions back to mojos or XCH are exact multiplications.
///
/// # Example
/// ```
/// use mempool_fee_estimator::{FeeRate, Xch};
///
/// // 0.000000011 XCH spent on 1_000 cost is 11 mojos per cost
/// let amount: Xch = "0.000000011".parse().unwrap();
/// let rate = FeeRate::from_native(amount, 1_000).unwrap();
/// assert_eq!(rate.to_subunit_per_cost(), 11);
/// assert_eq!(rate.fee_for_cost(1_000).unwrap(), 11_000);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FeeRate {
    mojos_per_clvm_cost: u64,
}

impl FeeRate {
    /// A fee rate of zero, valid for free inclusion.
    pub const ZERO: FeeRate = FeeRate::new(0);

    /// Creates a fee rate from a mojo-per-cost value.
    pub const fn new(mojos_per_clvm_cost: u64) -> Self {
        Self {
            mojos_per_clvm_cost,
        }
    }

    /// Converts an XCH amount paid for `cost` into a fee rate.
    ///
    /// The division rounds toward zero.
    ///
    /// # Errors
    /// `InvalidArgument` if `cost` is zero or `amount` is negative, and
    /// `Overflow` if the resulting rate does not fit in 64 bits.
    pub fn from_native(amount: Xch, cost: u64) -> Result<Self> {
        if cost == 0 {
            return Err(EstimatorError::invalid_argument("cost must be non-zero"));
        }
        if amount.is_negative() {
            return Err(EstimatorError::invalid_argument(format!(
                "amount must not be negative, got {amount} XCH"
            )));
        }

        let per_cost = amount.mojos() / i128::from(cost);
        u64::try_from(per_cost)
            .map(Self::new)
            .map_err(|_| EstimatorError::overflow(format!("{per_cost} mojos per cost")))
    }

    /// Converts a mojo amount paid for `cost` into a fee rate, rounding toward zero.
    pub fn from_mojos(mojos: u64, cost: u64) -> Result<Self> {
        if cost == 0 {
            return Err(EstimatorError::invalid_argument("cost must be non-zero"));
        }
        Ok(Self::new(mojos / cost))
    }

    /// Returns the fee rate in mojos per cost.
    pub const fn to_subunit_per_cost(self) -> u64 {
        self.mojos_per_clvm_cost
    }

    /// Returns the fee rate in XCH per cost.
    pub fn to_native_per_cost(self) -> Xch {
        Xch::from_mojos(i128::from(self.mojos_per_clvm_cost))
    }

    /// Returns the total fee in mojos for an item of the given cost.
    pub fn fee_for_cost(self, cost: u64) -> Result<u64> {
        self.mojos_per_clvm_cost.checked_mul(cost).ok_or_else(|| {
            EstimatorError::overflow(format!(
                "{} mojos per cost times {cost} cost",
                self.mojos_per_clvm_cost
            ))
        })
    }

    /// Adds two fee rates.
    pub fn checked_add(self, other: FeeRate) -> Result<Self> {
        self.mojos_per_clvm_cost
            .checked_add(other.mojos_per_clvm_cost)
            .map(Self::new)
            .ok_or_else(|| EstimatorError::overflow(format!("{self} + {other}")))
    }

    /// Subtracts a fee rate, stopping at zero.
    pub const fn saturating_sub(self, other: FeeRate) -> Self {
        Self::new(
            self.mojos_per_clvm_cost
                .saturating_sub(other.mojos_per_clvm_cost),
        )
    }

    /// Multiplies the fee rate by `numerator / denominator`, rounding toward zero.
    pub fn scale(self, numerator: u64, denominator: u64) -> Result<Self> {
        if denominator == 0 {
            return Err(EstimatorError::invalid_argument(
                "scale denominator must be non-zero",
            ));
        }

        let scaled = u128::from(self.mojos_per_clvm_cost) * u128::from(numerator)
            / u128::from(denominator);
        u64::try_from(scaled)
            .map(Self::new)
            .map_err(|_| EstimatorError::overflow(format!("{self} scaled by {numerator}/{denominator}")))
    }
}

impl From<u64> for FeeRate {
    fn from(mojos_per_clvm_cost: u64) -> Self {
        Self::new(mojos_per_clvm_cost)
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mojo/cost", self.mojos_per_clvm_cost)
    }
}

/// An exact XCH amount, held as a signed mojo count.
///
/// Parsing never goes through floating point: `"1.5"` is exactly
/// 1_500_000_000_000 mojos, and more than 12 fractional digits is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Xch {
    mojos: i128,
}

impl Xch {
    /// Creates an amount from a mojo count.
    pub const fn from_mojos(mojos: i128) -> Self {
        Self { mojos }
    }

    /// Creates an amount from a whole number of XCH.
    pub const fn from_whole(xch: i64) -> Self {
        Self {
            mojos: xch as i128 * MOJO_PER_XCH as i128,
        }
    }

    /// Returns the signed mojo count.
    pub const fn mojos(self) -> i128 {
        self.mojos
    }

    /// Returns true if the amount is below zero.
    pub const fn is_negative(self) -> bool {
        self.mojos < 0
    }

    /// Returns the amount in mojos as an unsigned 64-bit value.
    ///
    /// # Errors
    /// `InvalidArgument` for negative amounts and `Overflow` for amounts
    /// above `u64::MAX` mojos.
    pub fn to_mojos(self) -> Result<u64> {
        if self.is_negative() {
            return Err(EstimatorError::invalid_argument(format!(
                "amount must not be negative, got {self} XCH"
            )));
        }
        u64::try_from(self.mojos)
            .map_err(|_| EstimatorError::overflow(format!("{self} XCH exceeds u64 mojos")))
    }
}

impl FromStr for Xch {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction)
        {
            return Err(EstimatorError::invalid_argument(format!(
                "not a decimal XCH amount: {s:?}"
            )));
        }
        if fraction.len() > XCH_DECIMALS {
            return Err(EstimatorError::invalid_argument(format!(
                "XCH amounts carry at most {XCH_DECIMALS} decimals: {s:?}"
            )));
        }

        let overflow = || EstimatorError::overflow(format!("XCH amount out of range: {s:?}"));

        let whole_mojos = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i128>()
                .map_err(|_| overflow())?
                .checked_mul(i128::from(MOJO_PER_XCH))
                .ok_or_else(overflow)?
        };

        // Right-pad the fraction to exactly 12 digits of mojos
        let fraction_mojos = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<width$}", width = XCH_DECIMALS)
                .parse::<i128>()
                .map_err(|_| overflow())?
        };

        let mojos = whole_mojos
            .checked_add(fraction_mojos)
            .ok_or_else(overflow)?;

        Ok(Self::from_mojos(if negative { -mojos } else { mojos }))
    }
}

impl fmt::Display for Xch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.mojos.unsigned_abs();
        let whole = magnitude / u128::from(MOJO_PER_XCH);
        let fraction = magnitude % u128::from(MOJO_PER_XCH);

        if fraction == 0 {
            write!(f, "{sign}{whole}")
        } else {
            let fraction = format!("{fraction:0width$}", width = XCH_DECIMALS);
            write!(f, "{sign}{whole}.{}", fraction.trim_end_matches('0'))
        }
    }
}

impl Serialize for Xch {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Xch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xch() {
        assert_eq!("1".parse::<Xch>().unwrap().mojos(), 1_000_000_000_000);
        assert_eq!("1.5".parse::<Xch>().unwrap().mojos(), 1_500_000_000_000);
        assert_eq!("0.000000000001".parse::<Xch>().unwrap().mojos(), 1);
        assert_eq!(".25".parse::<Xch>().unwrap().mojos(), 250_000_000_000);
        assert_eq!("-2".parse::<Xch>().unwrap().mojos(), -2_000_000_000_000);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", ".", "abc", "1.2.3", "1e5", "0.0000000000001", "+1"] {
            let result = input.parse::<Xch>();
            assert!(
                matches!(result, Err(EstimatorError::InvalidArgument(_))),
                "{input:?} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        let huge = "9".repeat(40);
        assert!(matches!(
            huge.parse::<Xch>(),
            Err(EstimatorError::Overflow(_))
        ));
    }

    #[test]
    fn test_xch_display() {
        assert_eq!(Xch::from_mojos(1_500_000_000_000).to_string(), "1.5");
        assert_eq!(Xch::from_whole(3).to_string(), "3");
        assert_eq!(Xch::from_mojos(1).to_string(), "0.000000000001");
        assert_eq!(Xch::from_mojos(-250_000_000_000).to_string(), "-0.25");
    }

    #[test]
    fn test_from_native() {
        let rate = FeeRate::from_native(Xch::from_mojos(5_000), 1_000).unwrap();
        assert_eq!(rate.to_subunit_per_cost(), 5);

        // Rounds toward zero
        let rate = FeeRate::from_native(Xch::from_mojos(5_999), 1_000).unwrap();
        assert_eq!(rate.to_subunit_per_cost(), 5);
    }

    #[test]
    fn test_from_native_invalid() {
        assert!(matches!(
            FeeRate::from_native(Xch::from_whole(1), 0),
            Err(EstimatorError::InvalidArgument(_))
        ));
        assert!(matches!(
            FeeRate::from_native(Xch::from_mojos(-1), 10),
            Err(EstimatorError::InvalidArgument(_))
        ));
        assert!(matches!(
            FeeRate::from_native(Xch::from_whole(i64::MAX), 1),
            Err(EstimatorError::Overflow(_))
        ));
    }

    #[test]
    fn test_round_trip_exact_multiple() {
        let amount: Xch = "0.75".parse().unwrap();
        let cost = 250_000;
        let rate = FeeRate::from_native(amount, cost).unwrap();
        assert_eq!(rate.fee_for_cost(cost).unwrap(), amount.to_mojos().unwrap());
        assert_eq!(rate.to_native_per_cost().mojos(), 3_000_000);
    }

    #[test]
    fn test_fee_for_cost_overflow() {
        let rate = FeeRate::new(u64::MAX / 2);
        assert!(matches!(
            rate.fee_for_cost(3),
            Err(EstimatorError::Overflow(_))
        ));
    }

    #[test]
    fn test_arithmetic() {
        let a = FeeRate::new(10);
        let b = FeeRate::new(4);
        assert_eq!(a.checked_add(b).unwrap(), FeeRate::new(14));
        assert_eq!(b.saturating_sub(a), FeeRate::ZERO);
        assert_eq!(a.scale(3, 4).unwrap(), FeeRate::new(7));
        assert!(FeeRate::new(u64::MAX).checked_add(b).is_err());
        assert!(a.scale(1, 0).is_err());
        assert!(FeeRate::new(u64::MAX).scale(2, 1).is_err());
        assert!(b < a);
    }

    #[test]
    fn test_to_mojos() {
        assert_eq!(Xch::from_whole(2).to_mojos().unwrap(), 2 * MOJO_PER_XCH);
        assert!(matches!(
            Xch::from_mojos(-5).to_mojos(),
            Err(EstimatorError::InvalidArgument(_))
        ));
        assert!(matches!(
            Xch::from_mojos(i128::from(u64::MAX) + 1).to_mojos(),
            Err(EstimatorError::Overflow(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(FeeRate::new(42).to_string(), "42 mojo/cost");
    }
}
