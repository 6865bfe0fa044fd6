//! Term plans: rates by coverage term, gender, smoking status and age

use super::{PlanRate, PremiumRate, RateError, RateInputs, T15};

/// Rate strategy for term plans
#[derive(Debug, Clone)]
pub struct TermBasedRate {
    inputs: RateInputs,
}

impl PremiumRate for TermBasedRate {
    fn rate(&self) -> Result<u32, RateError> {
        let quote = &self.inputs.quote;
        self.inputs.resolve(self.inputs.table.lookup(
            Some(quote.coverage_terms),
            quote.gender,
            quote.smoking_status,
            self.inputs.age,
        ))
    }

    fn divisor(&self) -> Option<f64> {
        self.inputs.table.divisor()
    }

    fn age(&self) -> u32 {
        self.inputs.age
    }
}

impl PlanRate for TermBasedRate {
    const NAME: &'static str = "TermBasedRate";

    fn handles(plan_code: &str) -> bool {
        plan_code == T15
    }

    fn from_inputs(inputs: RateInputs) -> Self {
        Self { inputs }
    }
}
