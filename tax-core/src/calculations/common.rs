//! Rounding shared by the tax calculations.
//!
//! Liabilities are rounded exactly once, on the final total. Rounding each
//! bracket's share separately would accumulate error across bands.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounds `value` to `decimal_places` using half-up rounding.
///
/// Values exactly at the midpoint are rounded away from zero, which for the
/// non-negative amounts handled here is the same as rounding up.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(49999.95), 0), dec!(50000));
/// assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_up(dec!(2.5), 0), dec!(3));
/// ```
pub fn round_half_up(
    value: Decimal,
    decimal_places: u32,
) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds `value` to `decimal_places` using banker's rounding.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_even;
///
/// assert_eq!(round_half_even(dec!(2.5), 0), dec!(2));
/// assert_eq!(round_half_even(dec!(3.5), 0), dec!(4));
/// ```
pub fn round_half_even(
    value: Decimal,
    decimal_places: u32,
) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

/// Tie-breaking rule used when a total falls exactly between two units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    #[default]
    HalfUp,
    HalfEven,
}

/// Precision and tie-breaking applied to a final tax total.
///
/// The default rounds to whole currency units, half-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingPolicy {
    /// Digits kept after the decimal point; `0` means whole currency units.
    pub decimal_places: u32,
    pub mode: RoundingMode,
}

impl RoundingPolicy {
    /// Whole currency units, half-up.
    pub const fn whole_units() -> Self {
        Self {
            decimal_places: 0,
            mode: RoundingMode::HalfUp,
        }
    }

    /// Two decimal places, half-up.
    pub const fn cents() -> Self {
        Self {
            decimal_places: 2,
            mode: RoundingMode::HalfUp,
        }
    }

    pub fn apply(
        &self,
        value: Decimal,
    ) -> Decimal {
        match self.mode {
            RoundingMode::HalfUp => round_half_up(value, self.decimal_places),
            RoundingMode::HalfEven => round_half_even(value, self.decimal_places),
        }
    }
}
