mod financial_report;
pub mod schedule;
mod schedule_book;
mod tax_bracket;

pub use financial_report::{FinancialReport, ReviewStatus, TaxStatus};
pub use schedule::{BoundaryConvention, BracketSchedule, ScheduleError};
pub use schedule_book::ScheduleBook;
pub use tax_bracket::TaxBracket;
