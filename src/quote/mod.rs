//! Quote data structures and validation

mod data;
pub mod validation;

pub use data::{Gender, Quote, SmokingStatus};
pub use validation::{
    FieldError, QuoteField, QuoteInput, ValidationErrors, MAX_COVERAGE_AMOUNT, MIN_COVERAGE_AMOUNT,
};
