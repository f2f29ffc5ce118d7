use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quarterly figures a business submits for assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialReport {
    pub year: i32,
    /// Calendar quarter, 1 through 4.
    pub quarter: u8,
    pub revenue: Decimal,
    pub expenses: Decimal,
}

/// Whether staff have reviewed a submitted report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Payment state of the tax assessed on a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}
