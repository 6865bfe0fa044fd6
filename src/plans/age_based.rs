//! Whole-life-style plans: rates by gender, smoking status and age only
//!
//! The quote's coverage term is carried but plays no part in the lookup.

use super::{PlanRate, PremiumRate, RateError, RateInputs, WLF};

/// Rate strategy for plans without a coverage term dimension
#[derive(Debug, Clone)]
pub struct AgeBasedRate {
    inputs: RateInputs,
}

impl PremiumRate for AgeBasedRate {
    fn rate(&self) -> Result<u32, RateError> {
        let quote = &self.inputs.quote;
        self.inputs.resolve(self.inputs.table.lookup(
            None,
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

impl PlanRate for AgeBasedRate {
    const NAME: &'static str = "AgeBasedRate";

    fn handles(plan_code: &str) -> bool {
        plan_code == WLF
    }

    fn from_inputs(inputs: RateInputs) -> Self {
        Self { inputs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::AgeBasis;
    use crate::quote::{Gender, Quote, SmokingStatus};
    use crate::rates::{sample_age_table, FileRateTables, InMemoryRateTables, RateKey};
    use chrono::NaiveDate;

    fn quote() -> Quote {
        Quote::new(
            Gender::Female,
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            SmokingStatus::NonSmoker,
            100_000.0,
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            WLF,
            64,
        )
    }

    fn age_rate(quote: &Quote) -> AgeBasedRate {
        AgeBasedRate::from_inputs(RateInputs::new(
            quote,
            AgeBasis::LastBirthday,
            &FileRateTables::load_default(),
        ))
    }

    #[test]
    fn test_rates_by_gender_and_smoking_status() {
        let cases = [
            (Gender::Female, SmokingStatus::NonSmoker, 2036),
            (Gender::Female, SmokingStatus::Smoker, 2069),
            (Gender::Male, SmokingStatus::NonSmoker, 2413),
            (Gender::Male, SmokingStatus::Smoker, 2501),
        ];
        for (gender, smoking_status, expected) in cases {
            let quote = Quote { gender, smoking_status, ..quote() };
            assert_eq!(age_rate(&quote).rate(), Ok(expected));
        }
    }

    #[test]
    fn test_rate_higher_age() {
        let quote = Quote {
            date_of_birth: NaiveDate::from_ymd_opt(1961, 1, 1).unwrap(),
            coverage_terms: 25,
            ..quote()
        };
        assert_eq!(age_rate(&quote).rate(), Ok(7847));
    }

    #[test]
    fn test_coverage_terms_ignored() {
        for coverage_terms in [1, 15, 64, 99] {
            let quote = Quote { coverage_terms, ..quote() };
            assert_eq!(age_rate(&quote).rate(), Ok(2036));
        }
    }

    #[test]
    fn test_unfound_age() {
        for year in [2006, 1960] {
            let quote = Quote {
                date_of_birth: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
                ..quote()
            };
            assert_eq!(age_rate(&quote).rate().unwrap_err().not_found_key(), Some(RateKey::Age));
        }
    }

    #[test]
    fn test_missing_gender_then_smoking_status() {
        let tables = InMemoryRateTables::new().with_table(WLF, sample_age_table());

        let male_smoker = Quote {
            gender: Gender::Male,
            smoking_status: SmokingStatus::Smoker,
            ..quote()
        };
        let rate = AgeBasedRate::from_inputs(RateInputs::new(&male_smoker, AgeBasis::LastBirthday, &tables));
        assert_eq!(rate.rate().unwrap_err().not_found_key(), Some(RateKey::Gender));

        let smoker = Quote { smoking_status: SmokingStatus::Smoker, ..quote() };
        let rate = AgeBasedRate::from_inputs(RateInputs::new(&smoker, AgeBasis::LastBirthday, &tables));
        assert_eq!(rate.rate().unwrap_err().not_found_key(), Some(RateKey::SmokingStatus));
    }

    #[test]
    fn test_divisor() {
        assert_eq!(age_rate(&quote()).divisor(), Some(100_000.0));
    }
}
