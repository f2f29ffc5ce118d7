//! Validated bracket schedules.
//!
//! A [`BracketSchedule`] is an ordered, contiguous list of [`TaxBracket`]s
//! covering every amount from zero to infinity. Schedules are checked once
//! at construction; the engine relies on that check and never re-validates.
//!
//! # Boundary framing
//!
//! Two framings are supported through [`BoundaryConvention`]:
//!
//! | Convention  | Next lower bound        | Width of a bounded band   |
//! |-------------|-------------------------|---------------------------|
//! | `Inclusive` | previous upper + `unit` | `upper - lower + unit`    |
//! | `HalfOpen`  | previous upper          | `upper - lower`           |
//!
//! `Inclusive` with a unit of one is the default and matches integer
//! currency tables such as `0–1,000,000` followed by `1,000,001–3,000,000`.
//! Because the first band starts at zero and both ends are inclusive, it
//! holds `upper + 1` units: the step from `upper` to `upper + 1` is still
//! taxed at that band's rate, and the next band's rate begins one unit later.
//!
//! `HalfOpen` treats each band as `[lower, upper)` and suits tables written
//! in continuous amounts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::TaxBracket;

/// Errors raised when a bracket table cannot be used as a schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The schedule has no brackets at all.
    #[error("bracket schedule is empty")]
    Empty,

    /// The first bracket must begin at zero.
    #[error("first bracket must start at 0, got {0}")]
    DoesNotStartAtZero(Decimal),

    /// A bracket's lower bound is below the previous bracket's lower bound.
    #[error("bracket {index} starts at {lower_bound}, below the previous bracket")]
    NotAscending { index: usize, lower_bound: Decimal },

    /// A bracket starts before the previous bracket ends.
    #[error("bracket {index} overlaps the previous bracket: expected start {expected}, got {found}")]
    Overlap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    /// A bracket starts after the previous bracket ends, leaving amounts uncovered.
    #[error("gap before bracket {index}: expected start {expected}, got {found}")]
    Gap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    /// A bracket's upper bound does not lie above its lower bound.
    #[error("bracket {index} has upper bound {upper_bound} not above lower bound {lower_bound}")]
    InvertedBounds {
        index: usize,
        lower_bound: Decimal,
        upper_bound: Decimal,
    },

    /// Only the final bracket may be unbounded.
    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd(usize),

    /// The final bracket is bounded, so large amounts are not covered.
    #[error("last bracket ends at {0}; the final bracket must be unbounded")]
    BoundedFinalBracket(Decimal),

    /// The bracket after `index` would have to start beyond the decimal range.
    #[error("bracket {index} ends at {upper_bound}; the next bracket's start is out of range")]
    BoundOverflow { index: usize, upper_bound: Decimal },

    /// Rates are fractions and must lie in `[0, 1]`.
    #[error("bracket {index} has rate {rate}, expected a value between 0 and 1")]
    InvalidRate { index: usize, rate: Decimal },

    /// The inclusive boundary unit must be positive.
    #[error("boundary unit must be positive, got {0}")]
    InvalidUnit(Decimal),

    /// No schedule is in effect for the requested tax year.
    #[error("no bracket schedule in effect for tax year {0}")]
    NoScheduleForYear(i32),
}

/// How adjacent bracket boundaries relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "convention", rename_all = "snake_case")]
pub enum BoundaryConvention {
    /// Both bounds are inclusive; the next bracket starts `unit` above the
    /// previous upper bound.
    Inclusive { unit: Decimal },

    /// Brackets are `[lower, upper)`; the next bracket starts exactly at the
    /// previous upper bound.
    HalfOpen,
}

impl BoundaryConvention {
    /// Inclusive framing over whole currency units.
    pub const fn whole_units() -> Self {
        Self::Inclusive { unit: Decimal::ONE }
    }

    /// Lower bound the bracket following one ending at `upper_bound` must have,
    /// or `None` when it does not fit in a `Decimal`.
    fn next_lower_bound(
        &self,
        upper_bound: Decimal,
    ) -> Option<Decimal> {
        match self {
            Self::Inclusive { unit } => upper_bound.checked_add(*unit),
            Self::HalfOpen => Some(upper_bound),
        }
    }
}

impl Default for BoundaryConvention {
    fn default() -> Self {
        Self::whole_units()
    }
}

/// An ordered, contiguous bracket table covering `[0, ∞)`.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{BoundaryConvention, BracketSchedule, TaxBracket};
///
/// let schedule = BracketSchedule::new(
///     vec![
///         TaxBracket::bounded(dec!(0), dec!(1000), dec!(0)),
///         TaxBracket::unbounded(dec!(1001), dec!(0.10)),
///     ],
///     BoundaryConvention::default(),
/// )
/// .unwrap();
///
/// assert_eq!(schedule.brackets().len(), 2);
/// assert!(schedule.is_progressive());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketSchedule {
    brackets: Vec<TaxBracket>,
    convention: BoundaryConvention,
}

impl BracketSchedule {
    /// Validates `brackets` under `convention` and builds a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] describing the first violation found:
    /// an empty table, a first bracket not starting at zero, out-of-order,
    /// overlapping or gapped brackets, inverted bounds, an upper bound with
    /// no representable successor, an unbounded bracket
    /// before the end, a bounded final bracket, or a rate outside `[0, 1]`.
    pub fn new(
        brackets: Vec<TaxBracket>,
        convention: BoundaryConvention,
    ) -> Result<Self, ScheduleError> {
        validate(&brackets, convention)
            .inspect_err(|err| warn!(%err, "rejected bracket schedule"))?;

        Ok(Self {
            brackets,
            convention,
        })
    }

    /// The six-band municipal reference schedule, with inclusive whole-unit
    /// boundaries.
    ///
    /// ```
    /// use tax_core::BracketSchedule;
    ///
    /// let schedule = BracketSchedule::reference();
    /// assert_eq!(schedule.brackets().len(), 6);
    /// ```
    pub fn reference() -> Self {
        Self {
            brackets: vec![
                TaxBracket::bounded(dec!(0), dec!(1000000), dec!(0)),
                TaxBracket::bounded(dec!(1000001), dec!(3000000), dec!(0.05)),
                TaxBracket::bounded(dec!(3000001), dec!(6000000), dec!(0.10)),
                TaxBracket::bounded(dec!(6000001), dec!(10000000), dec!(0.15)),
                TaxBracket::bounded(dec!(10000001), dec!(20000000), dec!(0.20)),
                TaxBracket::unbounded(dec!(20000001), dec!(0.25)),
            ],
            convention: BoundaryConvention::whole_units(),
        }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn convention(&self) -> BoundaryConvention {
        self.convention
    }

    /// Amount of revenue a bracket can hold, or `None` when unbounded.
    ///
    /// For a bracket of this schedule the width is the distance to the next
    /// bracket's lower bound, which validation has already computed once.
    /// A foreign bracket whose width does not fit in a `Decimal` also
    /// yields `None`.
    pub fn width(
        &self,
        bracket: &TaxBracket,
    ) -> Option<Decimal> {
        let upper = bracket.upper_bound?;
        let end = self.convention.next_lower_bound(upper)?;
        end.checked_sub(bracket.lower_bound)
    }

    /// Whether rates never decrease from one bracket to the next.
    pub fn is_progressive(&self) -> bool {
        self.brackets.windows(2).all(|pair| pair[0].rate <= pair[1].rate)
    }
}

fn validate(
    brackets: &[TaxBracket],
    convention: BoundaryConvention,
) -> Result<(), ScheduleError> {
    if let BoundaryConvention::Inclusive { unit } = convention {
        if unit <= Decimal::ZERO {
            return Err(ScheduleError::InvalidUnit(unit));
        }
    }

    let Some(first) = brackets.first() else {
        return Err(ScheduleError::Empty);
    };
    if first.lower_bound != Decimal::ZERO {
        return Err(ScheduleError::DoesNotStartAtZero(first.lower_bound));
    }

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(ScheduleError::InvalidRate {
                index,
                rate: bracket.rate,
            });
        }

        if index > 0 {
            let previous = &brackets[index - 1];
            let Some(previous_upper) = previous.upper_bound else {
                return Err(ScheduleError::UnboundedBeforeEnd(index - 1));
            };
            let expected = convention.next_lower_bound(previous_upper).ok_or(
                ScheduleError::BoundOverflow {
                    index: index - 1,
                    upper_bound: previous_upper,
                },
            )?;
            let found = bracket.lower_bound;

            if found < previous.lower_bound {
                return Err(ScheduleError::NotAscending {
                    index,
                    lower_bound: found,
                });
            }
            if found < expected {
                return Err(ScheduleError::Overlap {
                    index,
                    expected,
                    found,
                });
            }
            if found > expected {
                return Err(ScheduleError::Gap {
                    index,
                    expected,
                    found,
                });
            }
        }

        if let Some(upper_bound) = bracket.upper_bound {
            let inverted = match convention {
                BoundaryConvention::Inclusive { .. } => upper_bound < bracket.lower_bound,
                BoundaryConvention::HalfOpen => upper_bound <= bracket.lower_bound,
            };
            if inverted {
                return Err(ScheduleError::InvertedBounds {
                    index,
                    lower_bound: bracket.lower_bound,
                    upper_bound,
                });
            }
        }
    }

    match brackets.last().and_then(|last| last.upper_bound) {
        Some(upper_bound) => Err(ScheduleError::BoundedFinalBracket(upper_bound)),
        None => Ok(()),
    }
}
