//! Plan-specific premium rate strategies
//!
//! Each plan type resolves a rate for a quote by walking its own rate table
//! shape. Strategies are chosen per plan code through a [`PlanRegistry`], so a
//! new plan type only needs a [`PlanRate`] implementation and a registration.

mod age_based;
mod registry;
mod term;

pub use age_based::AgeBasedRate;
pub use registry::{PlanRegistry, UnhandledRate};
pub use term::TermBasedRate;

use crate::age::AgeBasis;
use crate::quote::Quote;
use crate::rates::{PremiumRateNotFoundError, RateKey, RateTable, RateTableProvider};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// 15-year level term
pub const T15: &str = "T15";

/// Whole life
pub const WLF: &str = "WLF";

/// Plan codes currently offered for quoting
pub const ACTIVE_PLANS: [&str; 2] = [T15, WLF];

/// Failure to resolve a premium rate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateError {
    /// Out-of-table input; recoverable
    #[error(transparent)]
    NotFound(#[from] PremiumRateNotFoundError),

    /// No strategy handles the plan code
    #[error("called abstract method rate: no premium rate strategy for plan {plan_code}")]
    NotImplemented { plan_code: String },

    /// A strategy handles the plan but no rate table is configured for it
    #[error("no premium rate table configured for plan {plan_code}")]
    Unconfigured { plan_code: String },

    /// Rates resolved but the table carries no usable divisor
    #[error("no divisor configured for plan {plan_code}")]
    MissingDivisor { plan_code: String },
}

impl RateError {
    /// Failing dimension, for rate-not-found errors
    pub fn not_found_key(&self) -> Option<RateKey> {
        match self {
            RateError::NotFound(err) => Some(err.key),
            _ => None,
        }
    }
}

/// Everything a strategy needs: the quote, its rating age and its plan's table
#[derive(Debug, Clone)]
pub struct RateInputs {
    pub quote: Quote,
    pub age: u32,
    pub table: Arc<RateTable>,
}

impl RateInputs {
    /// Age the quote under `age_basis` and bind the table for its plan code
    pub fn new(quote: &Quote, age_basis: AgeBasis, rates: &dyn RateTableProvider) -> Self {
        Self {
            quote: quote.clone(),
            age: age_basis.age(quote.date_of_birth, quote.effective_date),
            table: rates.rate_table(&quote.plan_code),
        }
    }

    /// Turn a table lookup into a rate, treating an absent table as a configuration gap
    fn resolve(&self, lookup: Option<Result<u32, PremiumRateNotFoundError>>) -> Result<u32, RateError> {
        match lookup {
            Some(result) => result.map_err(RateError::from),
            None => Err(RateError::Unconfigured {
                plan_code: self.quote.plan_code.clone(),
            }),
        }
    }
}

/// Capability shared by every rate strategy
pub trait PremiumRate: fmt::Debug + Send + Sync {
    /// Rate per `divisor` of coverage
    fn rate(&self) -> Result<u32, RateError>;

    /// Coverage the rate is expressed per; `None` when the plan is unconfigured
    fn divisor(&self) -> Option<f64>;

    /// Rating age used for the lookup
    fn age(&self) -> u32;
}

/// A strategy that can be registered by type
pub trait PlanRate: PremiumRate + Sized + 'static {
    /// Name reported in logs and by the registry
    const NAME: &'static str;

    fn handles(plan_code: &str) -> bool;

    fn from_inputs(inputs: RateInputs) -> Self;
}
