//! Tax calculations over bracket schedules.
//!
//! [`progressive`] holds the marginal bracket engine, [`assessment`] applies
//! it to quarterly reports, and [`common`] holds the rounding rules both use.

pub mod assessment;
pub mod common;
pub mod progressive;

pub use assessment::{AssessmentError, ReportAssessment, assess_report};
pub use common::{RoundingMode, RoundingPolicy};
pub use progressive::{Amount, BracketPortion, ProgressiveTax, TaxComputation, TaxError, compute_tax};
