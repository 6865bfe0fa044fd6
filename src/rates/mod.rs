//! Premium rate tables, their sources, and modal factors

pub mod loader;
mod modal;
mod table;

pub use loader::{FileRateTables, InMemoryRateTables, RateTableProvider, DEFAULT_RATES_PATH};
pub use modal::{ModalFactors, PaymentMode, DEFAULT_MODAL_FACTORS_PATH};
pub use table::{
    AgeRates, GenderRates, PremiumRateNotFoundError, RateKey, RateSchedule, RateTable,
    RateTableFormatError, SmokingRates,
};

#[cfg(test)]
pub(crate) use table::tests::{sample_age_table, sample_term_table};
