pub mod calculations;
pub mod models;

pub use calculations::{TaxError, compute_tax};
pub use models::*;
