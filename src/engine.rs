//! Pre-loaded premium engine for repeated quoting
//!
//! Holds the plan registry, rate source and modal factors once, then prices
//! any number of quotes against them.
//!
//! # Example
//! ```ignore
//! let engine = PremiumEngine::from_config(&EngineConfig::from_env()?)?;
//! let summary = engine.quote(&input, Some(PaymentMode::Monthly))?;
//! ```

use crate::age::AgeBasis;
use crate::calculator::{PremiumCalculator, PremiumError};
use crate::config::EngineConfig;
use crate::plans::PlanRegistry;
use crate::quote::{Quote, QuoteInput};
use crate::rates::{FileRateTables, ModalFactors, PaymentMode, RateTableProvider};
use serde::Serialize;
use std::error::Error;

/// Outcome of pricing one quote
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSummary {
    pub plan_code: String,
    pub strategy: String,
    pub age_basis: AgeBasis,
    pub age: u32,
    /// Annual premium; `None` when the quote is outside the rate table
    pub premium_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<PaymentMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal_premium_amount: Option<f64>,
}

#[derive(Debug)]
pub struct PremiumEngine {
    registry: PlanRegistry,
    rates: Box<dyn RateTableProvider>,
    modal_factors: Option<ModalFactors>,
    age_basis: AgeBasis,
}

impl PremiumEngine {
    /// Engine over the given rate source with the default plans registered
    pub fn with_rates(rates: impl RateTableProvider + 'static) -> Self {
        Self {
            registry: PlanRegistry::with_default_plans(),
            rates: Box::new(rates),
            modal_factors: None,
            age_basis: AgeBasis::default(),
        }
    }

    /// Engine reading rate tables and modal factors from the configured paths
    pub fn from_config(config: &EngineConfig) -> Result<Self, Box<dyn Error>> {
        let modal_factors = ModalFactors::load_from(&config.modal_factors_path)?;
        if modal_factors.is_none() {
            log::info!(
                "Modal factors not configured at {}",
                config.modal_factors_path.display()
            );
        }

        Ok(Self {
            modal_factors,
            age_basis: config.age_basis,
            ..Self::with_rates(FileRateTables::new(&config.rates_path))
        })
    }

    pub fn with_modal_factors(mut self, factors: ModalFactors) -> Self {
        self.modal_factors = Some(factors);
        self
    }

    pub fn with_age_basis(mut self, age_basis: AgeBasis) -> Self {
        self.age_basis = age_basis;
        self
    }

    /// Registry for adding plan strategies
    pub fn registry_mut(&mut self) -> &mut PlanRegistry {
        &mut self.registry
    }

    pub fn registry(&self) -> &PlanRegistry {
        &self.registry
    }

    pub fn modal_factors(&self) -> Option<&ModalFactors> {
        self.modal_factors.as_ref()
    }

    /// Calculator bound to this engine's registry, rates and age basis
    pub fn calculator(&self, quote: Quote) -> Result<PremiumCalculator<'_>, PremiumError> {
        Ok(PremiumCalculator::new(quote, &self.registry, self.rates.as_ref())?
            .with_age_basis(self.age_basis))
    }

    /// Annual premium for a typed quote
    pub fn premium_amount(&self, quote: Quote) -> Result<Option<f64>, PremiumError> {
        self.calculator(quote)?.premium_amount()
    }

    /// Validate raw input and price it, optionally for a billing frequency
    pub fn quote(&self, input: &QuoteInput, mode: Option<PaymentMode>) -> Result<QuoteSummary, PremiumError> {
        let quote = input.validate()?;
        let calculator = self.calculator(quote)?;
        let (age, premium_amount) = calculator.rated_premium()?;

        let modal_premium_amount = match (mode, premium_amount, &self.modal_factors) {
            (Some(mode), Some(annual), Some(factors)) => factors
                .factor(&calculator.quote().plan_code, mode)
                .map(|factor| annual * factor),
            _ => None,
        };

        Ok(QuoteSummary {
            plan_code: calculator.quote().plan_code.clone(),
            strategy: self.registry.strategy_name(&calculator.quote().plan_code).to_string(),
            age_basis: self.age_basis,
            age,
            premium_amount,
            payment_mode: mode,
            modal_premium_amount,
        })
    }

    /// Price many quotes independently
    pub fn premium_batch(&self, quotes: &[Quote]) -> Vec<Result<Option<f64>, PremiumError>> {
        quotes
            .iter()
            .map(|quote| self.premium_amount(quote.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::{T15, WLF};
    use crate::quote::{Gender, SmokingStatus};
    use crate::rates::{sample_term_table, InMemoryRateTables};
    use chrono::NaiveDate;
    use serde_json::json;

    fn input() -> QuoteInput {
        serde_json::from_value(json!({
            "gender": "M",
            "date_of_birth": "2003-01-01",
            "smoking_status": "S",
            "coverage_amount": 100000,
            "effective_date": "2021-01-01",
            "plan_code": "T15",
            "coverage_terms": 15
        }))
        .unwrap()
    }

    #[test]
    fn test_quote_from_default_config() {
        let engine = PremiumEngine::from_config(&EngineConfig::default()).unwrap();
        let summary = engine.quote(&input(), Some(PaymentMode::Yearly)).unwrap();

        assert_eq!(summary.strategy, "TermBasedRate");
        assert_eq!(summary.age, 18);
        assert_eq!(summary.premium_amount, Some(153.0));
        assert_eq!(summary.modal_premium_amount, Some(153.0));
    }

    #[test]
    fn test_quote_without_mode() {
        let engine = PremiumEngine::from_config(&EngineConfig::default()).unwrap();
        let summary = engine.quote(&input(), None).unwrap();
        assert_eq!(summary.modal_premium_amount, None);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["premium_amount"], json!(153.0));
        assert_eq!(json["age_basis"], json!("LastBirthday"));
        assert!(json.get("modal_premium_amount").is_none());
    }

    #[test]
    fn test_engine_age_basis() {
        let engine = PremiumEngine::from_config(&EngineConfig::default())
            .unwrap()
            .with_age_basis(AgeBasis::NextBirthday);
        let summary = engine.quote(&input(), None).unwrap();
        assert_eq!(summary.age, 19);
        assert_eq!(summary.premium_amount, Some(156.0));
    }

    #[test]
    fn test_whole_life_has_no_modal_factors() {
        let engine = PremiumEngine::from_config(&EngineConfig::default()).unwrap();
        let input = QuoteInput {
            date_of_birth: Some("2000-01-01".into()),
            plan_code: Some(WLF.into()),
            ..input()
        };
        let summary = engine.quote(&input, Some(PaymentMode::Monthly)).unwrap();

        assert_eq!(summary.premium_amount, Some(2501.0));
        assert_eq!(summary.payment_mode, Some(PaymentMode::Monthly));
        assert_eq!(summary.modal_premium_amount, None);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let engine = PremiumEngine::with_rates(InMemoryRateTables::new().with_table(T15, sample_term_table()));
        let base = Quote::new(
            Gender::Female,
            NaiveDate::from_ymd_opt(2003, 1, 1).unwrap(),
            SmokingStatus::NonSmoker,
            100_000.0,
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            T15,
            15,
        );
        let quotes = vec![
            base.clone(),
            Quote { coverage_terms: 20, ..base.clone() },
            Quote { plan_code: WLF.into(), ..base.clone() },
            Quote { coverage_amount: 1.0, ..base },
        ];

        let results = engine.premium_batch(&quotes);
        assert_eq!(results[0], Ok(Some(80.0)));
        assert_eq!(results[1], Ok(None));
        assert!(matches!(results[2], Err(PremiumError::Rate(_))));
        assert!(matches!(results[3], Err(PremiumError::InvalidQuote(_))));
    }
}
