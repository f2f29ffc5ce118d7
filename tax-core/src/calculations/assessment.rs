//! Assessment of quarterly financial reports.
//!
//! A report's tax is levied on its revenue, not its net income; expenses
//! only feed the net income figure recorded alongside.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::RoundingPolicy;
use crate::calculations::progressive::{ProgressiveTax, TaxError};
use crate::models::{FinancialReport, ReviewStatus, ScheduleBook, TaxStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("quarter must be between 1 and 4, got {0}")]
    InvalidQuarter(u8),

    #[error("expenses must be non-negative, got {0}")]
    InvalidExpenses(Decimal),

    #[error(transparent)]
    Tax(#[from] TaxError),
}

/// Figures derived from a [`FinancialReport`] at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAssessment {
    pub year: i32,
    pub quarter: u8,
    pub revenue: Decimal,
    pub expenses: Decimal,
    /// Revenue minus expenses; negative for a loss-making quarter.
    pub net_income: Decimal,
    pub tax_amount: Decimal,
    pub review_status: ReviewStatus,
    pub tax_status: TaxStatus,
}

/// Assesses `report` against the schedule in effect for its year.
///
/// # Errors
///
/// - [`AssessmentError::InvalidQuarter`] if the quarter is outside 1..=4
/// - [`AssessmentError::InvalidExpenses`] if expenses are negative
/// - [`AssessmentError::Tax`] if revenue is negative or no schedule covers the year
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::{RoundingPolicy, assess_report};
/// use tax_core::{BracketSchedule, FinancialReport, ScheduleBook};
///
/// let book: ScheduleBook = [(2024, BracketSchedule::reference())].into_iter().collect();
/// let report = FinancialReport {
///     year: 2025,
///     quarter: 2,
///     revenue: dec!(4000000),
///     expenses: dec!(1500000),
/// };
///
/// let assessment = assess_report(&book, &report, RoundingPolicy::default()).unwrap();
///
/// assert_eq!(assessment.net_income, dec!(2500000));
/// assert_eq!(assessment.tax_amount, dec!(200000));
/// ```
pub fn assess_report(
    book: &ScheduleBook,
    report: &FinancialReport,
    rounding: RoundingPolicy,
) -> Result<ReportAssessment, AssessmentError> {
    if !(1..=4).contains(&report.quarter) {
        return Err(AssessmentError::InvalidQuarter(report.quarter));
    }
    if report.expenses < Decimal::ZERO {
        return Err(AssessmentError::InvalidExpenses(report.expenses));
    }

    let schedule = book.for_year(report.year).map_err(TaxError::from)?;
    let tax_amount = ProgressiveTax::new(schedule)
        .with_rounding(rounding)
        .compute(report.revenue)?;

    Ok(ReportAssessment {
        year: report.year,
        quarter: report.quarter,
        revenue: report.revenue,
        expenses: report.expenses,
        net_income: report.revenue - report.expenses,
        tax_amount,
        review_status: ReviewStatus::Pending,
        tax_status: TaxStatus::Pending,
    })
}
