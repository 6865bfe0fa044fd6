//! Plan code to rate strategy dispatch
//!
//! The registry is an ordered list of (predicate, factory) pairs. Resolution
//! walks it from the most recently registered entry backwards and takes the
//! first predicate that claims the plan code, so a later, more specific handler
//! shadows an earlier generic one. Unclaimed plan codes get [`UnhandledRate`].

use super::{AgeBasedRate, PlanRate, PremiumRate, RateError, RateInputs, TermBasedRate};
use crate::age::AgeBasis;
use crate::quote::Quote;
use crate::rates::RateTableProvider;
use std::fmt;

/// Predicate deciding whether an entry handles a plan code
pub type PlanPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Builds a strategy from resolved inputs
pub type RateFactory = Box<dyn Fn(RateInputs) -> Box<dyn PremiumRate> + Send + Sync>;

/// Fallback strategy for plan codes no entry claims
///
/// `rate()` always fails: reaching it means the registry is missing a handler.
#[derive(Debug, Clone)]
pub struct UnhandledRate {
    inputs: RateInputs,
}

impl UnhandledRate {
    pub const NAME: &'static str = "UnhandledRate";

    pub fn new(inputs: RateInputs) -> Self {
        Self { inputs }
    }
}

impl PremiumRate for UnhandledRate {
    fn rate(&self) -> Result<u32, RateError> {
        Err(RateError::NotImplemented {
            plan_code: self.inputs.quote.plan_code.clone(),
        })
    }

    fn divisor(&self) -> Option<f64> {
        self.inputs.table.divisor()
    }

    fn age(&self) -> u32 {
        self.inputs.age
    }
}

struct PlanEntry {
    name: String,
    handles: PlanPredicate,
    build: RateFactory,
}

/// Registered rate strategies, most recent first at resolution time
#[derive(Default)]
pub struct PlanRegistry {
    entries: Vec<PlanEntry>,
}

impl fmt::Debug for PlanRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanRegistry")
            .field("entries", &self.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

impl PlanRegistry {
    /// Registry with no entries; every plan code resolves to [`UnhandledRate`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the term and whole-life strategies
    pub fn with_default_plans() -> Self {
        let mut registry = Self::new();
        registry.register::<TermBasedRate>().register::<AgeBasedRate>();
        registry
    }

    /// Register a strategy type; it takes precedence over earlier entries
    pub fn register<T: PlanRate>(&mut self) -> &mut Self {
        self.register_with(
            T::NAME,
            T::handles,
            |inputs| Box::new(T::from_inputs(inputs)) as Box<dyn PremiumRate>,
        )
    }

    /// Register an explicit (predicate, factory) pair
    pub fn register_with<P, F>(&mut self, name: impl Into<String>, handles: P, build: F) -> &mut Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
        F: Fn(RateInputs) -> Box<dyn PremiumRate> + Send + Sync + 'static,
    {
        let name = name.into();
        log::debug!("Registering premium rate strategy {}", name);
        self.entries.push(PlanEntry {
            name,
            handles: Box::new(handles),
            build: Box::new(build),
        });
        self
    }

    fn entry_for(&self, plan_code: &str) -> Option<&PlanEntry> {
        self.entries.iter().rev().find(|entry| (entry.handles)(plan_code))
    }

    /// True when some registered entry claims `plan_code`
    pub fn handles(&self, plan_code: &str) -> bool {
        self.entry_for(plan_code).is_some()
    }

    /// Name of the strategy `plan_code` resolves to
    pub fn strategy_name(&self, plan_code: &str) -> &str {
        self.entry_for(plan_code)
            .map(|entry| entry.name.as_str())
            .unwrap_or(UnhandledRate::NAME)
    }

    /// Entry names in resolution order
    pub fn strategy_names(&self) -> Vec<&str> {
        self.entries.iter().rev().map(|e| e.name.as_str()).collect()
    }

    /// Build the strategy for the inputs' plan code
    pub fn resolver_for(&self, inputs: RateInputs) -> Box<dyn PremiumRate> {
        match self.entry_for(&inputs.quote.plan_code) {
            Some(entry) => {
                log::debug!("Plan {} resolved to {}", inputs.quote.plan_code, entry.name);
                (entry.build)(inputs)
            }
            None => {
                log::debug!("Plan {} has no registered strategy", inputs.quote.plan_code);
                Box::new(UnhandledRate::new(inputs))
            }
        }
    }

    /// Age the quote, bind its table and build the strategy in one step
    pub fn resolve(
        &self,
        quote: &Quote,
        age_basis: AgeBasis,
        rates: &dyn RateTableProvider,
    ) -> Box<dyn PremiumRate> {
        self.resolver_for(RateInputs::new(quote, age_basis, rates))
    }
}
