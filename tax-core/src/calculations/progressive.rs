//! Progressive (marginal bracket) tax calculation.
//!
//! The amount is poured through the brackets of a [`BracketSchedule`] in
//! ascending order. Each bracket takes at most its width, taxes that share at
//! its own rate, and passes the remainder on; the unbounded final bracket
//! absorbs whatever is left. The sum is rounded once, at the end.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::BracketSchedule;
//! use tax_core::calculations::ProgressiveTax;
//!
//! let schedule = BracketSchedule::reference();
//! let calculator = ProgressiveTax::new(&schedule);
//!
//! assert_eq!(calculator.compute(dec!(4000000)).unwrap(), dec!(200000));
//!
//! let breakdown = calculator.calculate(dec!(4000000)).unwrap();
//! assert_eq!(breakdown.unrounded_tax, dec!(199999.90));
//! assert_eq!(breakdown.portions.len(), 3);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::RoundingPolicy;
use crate::models::schedule::{BoundaryConvention, BracketSchedule, ScheduleError};
use crate::TaxBracket;

/// Errors that can occur while computing a tax liability.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxError {
    /// The amount is negative or not finite.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The bracket table is not a usable schedule.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),
}

/// A validated, non-negative monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, TaxError> {
        if value < Decimal::ZERO {
            return Err(TaxError::InvalidAmount(format!(
                "{value} is negative"
            )));
        }
        Ok(Self(value))
    }

    /// Converts a floating-point figure supplied by an external caller.
    ///
    /// NaN and infinities are rejected rather than coerced.
    ///
    /// ```
    /// use tax_core::calculations::Amount;
    ///
    /// assert!(Amount::try_from_f64(1500.25).is_ok());
    /// assert!(Amount::try_from_f64(f64::NAN).is_err());
    /// assert!(Amount::try_from_f64(-1.0).is_err());
    /// ```
    pub fn try_from_f64(value: f64) -> Result<Self, TaxError> {
        if !value.is_finite() {
            return Err(TaxError::InvalidAmount(format!("{value} is not finite")));
        }
        let decimal = Decimal::try_from(value)
            .map_err(|err| TaxError::InvalidAmount(format!("{value}: {err}")))?;
        Self::new(decimal)
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = TaxError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<f64> for Amount {
    type Error = TaxError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_from_f64(value)
    }
}

/// The share of an amount that fell into one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketPortion {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    /// Part of the amount taxed in this bracket.
    pub taxable_amount: Decimal,
    /// `taxable_amount × rate`, unrounded.
    pub tax: Decimal,
}

/// Result of a progressive tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputation {
    pub amount: Decimal,

    /// Total liability after the rounding policy was applied.
    pub tax: Decimal,

    /// Sum of the bracket shares before rounding.
    pub unrounded_tax: Decimal,

    /// `unrounded_tax / amount`, or zero for a zero amount.
    pub effective_rate: Decimal,

    /// One entry per bracket the amount reached, in schedule order.
    pub portions: Vec<BracketPortion>,
}

/// Calculator applying a bracket schedule to amounts.
///
/// Holds no mutable state; one instance may be shared across threads.
#[derive(Debug, Clone)]
pub struct ProgressiveTax<'a> {
    schedule: &'a BracketSchedule,
    rounding: RoundingPolicy,
}

impl<'a> ProgressiveTax<'a> {
    /// Creates a calculator rounding to whole currency units, half-up.
    pub fn new(schedule: &'a BracketSchedule) -> Self {
        Self {
            schedule,
            rounding: RoundingPolicy::default(),
        }
    }

    pub fn with_rounding(
        mut self,
        rounding: RoundingPolicy,
    ) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn schedule(&self) -> &BracketSchedule {
        self.schedule
    }

    /// Computes the rounded liability for `amount`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] if `amount` is negative.
    pub fn compute(
        &self,
        amount: Decimal,
    ) -> Result<Decimal, TaxError> {
        self.calculate(amount).map(|computation| computation.tax)
    }

    /// Computes the liability for `amount` together with its per-bracket
    /// breakdown.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] if `amount` is negative.
    pub fn calculate(
        &self,
        amount: Decimal,
    ) -> Result<TaxComputation, TaxError> {
        let amount = Amount::new(amount)?.value();

        let mut remaining = amount;
        let mut unrounded_tax = Decimal::ZERO;
        let mut portions = Vec::new();

        for bracket in self.schedule.brackets() {
            if remaining <= Decimal::ZERO {
                break;
            }

            let taxable_amount = match self.schedule.width(bracket) {
                Some(width) => remaining.min(width),
                None => remaining,
            };
            // Rates are at most one, so neither a share nor the running total
            // can exceed the amount itself.
            let tax = taxable_amount * bracket.rate;

            unrounded_tax += tax;
            remaining -= taxable_amount;

            portions.push(BracketPortion {
                lower_bound: bracket.lower_bound,
                upper_bound: bracket.upper_bound,
                rate: bracket.rate,
                taxable_amount,
                tax,
            });
        }

        let tax = self.rounding.apply(unrounded_tax);
        let effective_rate = if amount.is_zero() {
            Decimal::ZERO
        } else {
            unrounded_tax / amount
        };

        debug!(%amount, %tax, brackets = portions.len(), "computed bracketed tax");

        Ok(TaxComputation {
            amount,
            tax,
            unrounded_tax,
            effective_rate,
            portions,
        })
    }

    /// Rate applied to the next currency unit earned above `amount`.
    pub fn marginal_rate(
        &self,
        amount: Decimal,
    ) -> Result<Decimal, TaxError> {
        let amount = Amount::new(amount)?.value();
        let mut filled = Decimal::ZERO;

        self.schedule
            .brackets()
            .iter()
            .find(|bracket| match self.schedule.width(bracket) {
                Some(width) => {
                    filled += width;
                    amount < filled
                }
                None => true,
            })
            .map(|bracket| bracket.rate)
            .ok_or(TaxError::InvalidSchedule(ScheduleError::Empty))
    }
}

/// Computes the tax on `amount` under `brackets`, using inclusive whole-unit
/// boundaries and whole-unit half-up rounding.
///
/// The bracket table is validated before the amount.
///
/// # Errors
///
/// Returns [`TaxError::InvalidSchedule`] for a malformed table and
/// [`TaxError::InvalidAmount`] for a negative amount.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{BracketSchedule, TaxError, compute_tax};
///
/// let brackets = BracketSchedule::reference().brackets().to_vec();
///
/// assert_eq!(compute_tax(dec!(25000000), &brackets), Ok(dec!(4250000)));
/// assert!(matches!(
///     compute_tax(dec!(-100), &brackets),
///     Err(TaxError::InvalidAmount(_))
/// ));
/// ```
pub fn compute_tax(
    amount: Decimal,
    brackets: &[TaxBracket],
) -> Result<Decimal, TaxError> {
    let schedule = BracketSchedule::new(brackets.to_vec(), BoundaryConvention::default())?;
    ProgressiveTax::new(&schedule).compute(amount)
}
