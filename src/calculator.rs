//! Premium calculation for a single quote
//!
//! premium = coverage_amount * rate / divisor
//!
//! Out-of-table quotes (rate not found) are recovered here and reported as an
//! absent premium; every other rate failure propagates.

use crate::age::AgeBasis;
use crate::plans::{PlanRegistry, PremiumRate, RateError};
use crate::quote::{Quote, QuoteInput, ValidationErrors};
use crate::rates::{ModalFactors, PaymentMode, RateKey, RateTableProvider};
use thiserror::Error;

/// Failure to produce a premium
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PremiumError {
    /// The quote failed validation; carries the first full message
    #[error("invalid quote: {0}")]
    InvalidQuote(String),

    #[error(transparent)]
    Rate(#[from] RateError),
}

impl From<ValidationErrors> for PremiumError {
    fn from(errors: ValidationErrors) -> Self {
        PremiumError::InvalidQuote(errors.first_full_message().unwrap_or_else(|| errors.to_string()))
    }
}

/// Diagnostic logged when a quote falls outside its plan's rate table
fn rate_not_found_message(plan_code: &str, age: u32, key: RateKey) -> String {
    format!(
        "No premium rate for plan {} at age {}: missing {}",
        plan_code, age, key
    )
}

/// Calculates the premium for one validated quote
#[derive(Debug)]
pub struct PremiumCalculator<'a> {
    quote: Quote,
    registry: &'a PlanRegistry,
    rates: &'a dyn RateTableProvider,
    age_basis: AgeBasis,
}

impl<'a> PremiumCalculator<'a> {
    /// Validate the quote and bind it to a registry and rate source
    pub fn new(
        quote: Quote,
        registry: &'a PlanRegistry,
        rates: &'a dyn RateTableProvider,
    ) -> Result<Self, PremiumError> {
        quote.validate()?;
        Ok(Self {
            quote,
            registry,
            rates,
            age_basis: AgeBasis::default(),
        })
    }

    /// Validate raw input, then build the calculator
    pub fn from_input(
        input: &QuoteInput,
        registry: &'a PlanRegistry,
        rates: &'a dyn RateTableProvider,
    ) -> Result<Self, PremiumError> {
        let quote = input.validate()?;
        Self::new(quote, registry, rates)
    }

    /// Age convention used for rating; Age Last Birthday unless set
    pub fn with_age_basis(mut self, age_basis: AgeBasis) -> Self {
        self.age_basis = age_basis;
        self
    }

    pub fn quote(&self) -> &Quote {
        &self.quote
    }

    pub fn age_basis(&self) -> AgeBasis {
        self.age_basis
    }

    /// Rate strategy for the quote's plan
    pub fn resolver(&self) -> Box<dyn PremiumRate> {
        self.registry.resolve(&self.quote, self.age_basis, self.rates)
    }

    /// Annual premium, or `None` when the quote falls outside the plan's rate table
    pub fn premium_amount(&self) -> Result<Option<f64>, PremiumError> {
        self.rated_premium().map(|(_, premium)| premium)
    }

    /// Rating age and annual premium from a single strategy resolution
    pub fn rated_premium(&self) -> Result<(u32, Option<f64>), PremiumError> {
        let resolver = self.resolver();
        let age = resolver.age();

        let rate = match resolver.rate() {
            Ok(rate) => rate,
            Err(RateError::NotFound(err)) => {
                log::warn!("{}", rate_not_found_message(&self.quote.plan_code, age, err.key));
                return Ok((age, None));
            }
            Err(err) => return Err(err.into()),
        };

        let divisor = resolver
            .divisor()
            .filter(|d| d.is_finite() && *d != 0.0)
            .ok_or_else(|| RateError::MissingDivisor {
                plan_code: self.quote.plan_code.clone(),
            })?;

        Ok((age, Some(self.quote.coverage_amount * f64::from(rate) / divisor)))
    }

    /// Premium per billing period for `mode`
    ///
    /// `None` when the annual premium is absent or the plan has no factor for the mode.
    pub fn modal_premium_amount(
        &self,
        mode: PaymentMode,
        factors: &ModalFactors,
    ) -> Result<Option<f64>, PremiumError> {
        let Some(annual) = self.premium_amount()? else {
            return Ok(None);
        };
        Ok(factors
            .factor(&self.quote.plan_code, mode)
            .map(|factor| annual * factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::{T15, WLF};
    use crate::quote::{Gender, SmokingStatus};
    use crate::rates::{sample_term_table, FileRateTables, InMemoryRateTables};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn term_quote() -> Quote {
        Quote::new(
            Gender::Female,
            date(2003, 1, 1),
            SmokingStatus::NonSmoker,
            100_000.0,
            date(2021, 1, 1),
            T15,
            15,
        )
    }

    fn age_based_quote() -> Quote {
        Quote::new(
            Gender::Female,
            date(2000, 1, 1),
            SmokingStatus::NonSmoker,
            100_000.0,
            date(2021, 1, 1),
            WLF,
            64,
        )
    }

    fn premium(quote: Quote) -> Option<f64> {
        let registry = PlanRegistry::with_default_plans();
        let rates = FileRateTables::load_default();
        PremiumCalculator::new(quote, &registry, &rates)
            .unwrap()
            .premium_amount()
            .unwrap()
    }

    #[test]
    fn test_term_premiums() {
        let cases = [
            (Gender::Female, SmokingStatus::NonSmoker, 80.0),
            (Gender::Female, SmokingStatus::Smoker, 107.0),
            (Gender::Male, SmokingStatus::NonSmoker, 108.0),
            (Gender::Male, SmokingStatus::Smoker, 153.0),
        ];
        for (gender, smoking_status, expected) in cases {
            let quote = Quote { gender, smoking_status, ..term_quote() };
            assert_eq!(premium(quote), Some(expected));
        }
    }

    #[test]
    fn test_premium_scales_with_coverage() {
        let quote = Quote { coverage_amount: 150_000.0, ..term_quote() };
        assert_eq!(premium(quote), Some(120.0));

        let quote = Quote { coverage_amount: 150_000.0, ..age_based_quote() };
        assert_eq!(premium(quote), Some(3054.0));
    }

    #[test]
    fn test_older_applicant() {
        let quote = Quote { date_of_birth: date(1961, 1, 1), ..term_quote() };
        assert_eq!(premium(quote), Some(934.0));

        let quote = Quote {
            date_of_birth: date(1961, 1, 1),
            coverage_terms: 25,
            ..age_based_quote()
        };
        assert_eq!(premium(quote), Some(7847.0));
    }

    #[test]
    fn test_age_based_premiums() {
        let cases = [
            (Gender::Female, SmokingStatus::NonSmoker, 2036.0),
            (Gender::Female, SmokingStatus::Smoker, 2069.0),
            (Gender::Male, SmokingStatus::NonSmoker, 2413.0),
            (Gender::Male, SmokingStatus::Smoker, 2501.0),
        ];
        for (gender, smoking_status, expected) in cases {
            let quote = Quote { gender, smoking_status, ..age_based_quote() };
            assert_eq!(premium(quote), Some(expected));
        }
    }

    #[test]
    fn test_unfound_age_is_absent() {
        let quote = Quote { date_of_birth: date(2004, 1, 1), ..term_quote() };
        assert_eq!(premium(quote), None);

        for year in [2006, 1960] {
            let quote = Quote { date_of_birth: date(year, 1, 1), ..age_based_quote() };
            assert_eq!(premium(quote), None);
        }
    }

    #[test]
    fn test_premium_is_idempotent() {
        let registry = PlanRegistry::with_default_plans();
        let rates = FileRateTables::load_default();
        let calculator = PremiumCalculator::new(term_quote(), &registry, &rates).unwrap();
        assert_eq!(calculator.premium_amount(), calculator.premium_amount());
        assert_eq!(calculator.quote(), &term_quote());
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let registry = PlanRegistry::with_default_plans();
        let rates = FileRateTables::load_default();
        let mut input = QuoteInput::from(&term_quote());

        input.smoking_status = Some("X".into());
        let err = PremiumCalculator::from_input(&input, &registry, &rates).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("smoking status"));

        input.smoking_status = Some("N".into());
        input.gender = Some("X".into());
        let err = PremiumCalculator::from_input(&input, &registry, &rates).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("gender"));

        input.gender = Some("F".into());
        input.coverage_amount = Some(json!(5_000));
        let err = PremiumCalculator::from_input(&input, &registry, &rates).unwrap_err();
        assert_eq!(
            err,
            PremiumError::InvalidQuote("Coverage amount must be greater than or equal to 10000".into())
        );
    }

    #[test]
    fn test_invalid_typed_quote_is_rejected() {
        let registry = PlanRegistry::with_default_plans();
        let rates = FileRateTables::load_default();
        let quote = Quote { plan_code: "XXX".into(), ..term_quote() };
        let err = PremiumCalculator::new(quote, &registry, &rates).unwrap_err();
        assert_eq!(err, PremiumError::InvalidQuote("Plan code is not included in the list".into()));
    }

    #[test]
    fn test_unhandled_plan_propagates() {
        // An active plan code with no registered strategy
        let registry = PlanRegistry::new();
        let rates = FileRateTables::load_default();
        let calculator = PremiumCalculator::new(term_quote(), &registry, &rates).unwrap();
        assert_eq!(
            calculator.premium_amount(),
            Err(PremiumError::Rate(RateError::NotImplemented { plan_code: T15.into() }))
        );
    }

    #[test]
    fn test_unconfigured_plan_propagates() {
        let registry = PlanRegistry::with_default_plans();
        let rates = InMemoryRateTables::new().with_table(T15, sample_term_table());
        let calculator = PremiumCalculator::new(age_based_quote(), &registry, &rates).unwrap();
        assert_eq!(
            calculator.premium_amount(),
            Err(PremiumError::Rate(RateError::Unconfigured { plan_code: WLF.into() }))
        );
    }

    #[test]
    fn test_age_basis() {
        let registry = PlanRegistry::with_default_plans();
        let rates = FileRateTables::load_default();
        let calculator = PremiumCalculator::new(term_quote(), &registry, &rates)
            .unwrap()
            .with_age_basis(AgeBasis::NextBirthday);
        assert_eq!(calculator.age_basis(), AgeBasis::NextBirthday);
        assert_eq!(calculator.premium_amount(), Ok(Some(81.0)));
    }

    #[test]
    fn test_rate_not_found_message_names_key() {
        let message = rate_not_found_message(T15, 17, RateKey::Age);
        assert_eq!(message, "No premium rate for plan T15 at age 17: missing age");

        let message = rate_not_found_message(T15, 18, RateKey::CoverageTerms);
        assert!(message.ends_with("missing coverage_terms"));
    }

    #[test]
    fn test_rated_premium_reports_age() {
        let registry = PlanRegistry::with_default_plans();
        let rates = FileRateTables::load_default();

        let calculator = PremiumCalculator::new(term_quote(), &registry, &rates).unwrap();
        assert_eq!(calculator.rated_premium(), Ok((18, Some(80.0))));

        let young = Quote { date_of_birth: date(2004, 1, 1), ..term_quote() };
        let calculator = PremiumCalculator::new(young, &registry, &rates).unwrap();
        assert_eq!(calculator.rated_premium(), Ok((17, None)));
    }

    #[test]
    fn test_modal_premium() {
        let registry = PlanRegistry::with_default_plans();
        let rates = FileRateTables::load_default();
        let factors = ModalFactors::load_default().unwrap().unwrap();
        let calculator = PremiumCalculator::new(term_quote(), &registry, &rates).unwrap();

        let yearly = calculator.modal_premium_amount(PaymentMode::Yearly, &factors).unwrap();
        assert_eq!(yearly, Some(80.0));
        let monthly = calculator.modal_premium_amount(PaymentMode::Monthly, &factors).unwrap();
        assert_relative_eq!(monthly.unwrap(), 80.0 * 0.0865, epsilon = 1e-9);

        let empty = ModalFactors::new();
        assert_eq!(calculator.modal_premium_amount(PaymentMode::Monthly, &empty), Ok(None));
    }
}
