use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One marginal band of a schedule.
///
/// `upper_bound` is `None` for the final, unbounded band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn bounded(
        lower_bound: Decimal,
        upper_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn unbounded(
        lower_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound: None,
            rate,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.upper_bound.is_none()
    }
}
