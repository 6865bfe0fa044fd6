//! Life Premium - premium calculation for term and whole life quotes
//!
//! This library provides:
//! - Insurance age conventions (last, next and nearest birthday)
//! - Quote validation with field-level messages
//! - Per-plan premium rate tables loaded from JSON
//! - Rate strategies dispatched by plan code through an extensible registry
//! - Annual and modal premium calculation

pub mod age;
pub mod calculator;
pub mod config;
pub mod engine;
pub mod plans;
pub mod quote;
pub mod rates;

// Re-export commonly used types
pub use age::AgeBasis;
pub use calculator::{PremiumCalculator, PremiumError};
pub use config::{ConfigError, EngineConfig};
pub use engine::{PremiumEngine, QuoteSummary};
pub use plans::{PlanRegistry, PremiumRate, RateError};
pub use quote::{Gender, Quote, QuoteInput, SmokingStatus, ValidationErrors};
pub use rates::{FileRateTables, ModalFactors, PaymentMode, RateTable, RateTableProvider};
