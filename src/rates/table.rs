//! Premium rate tables
//!
//! A table holds integer rates per `divisor` of coverage, keyed by exact match on
//! every dimension:
//!
//! ```text
//! term plans:      rates[coverage_terms][gender][smoking_status][age]
//! whole-life-style: rates[gender][smoking_status][age]
//! ```
//!
//! Lookups check each stage before descending and report the first missing
//! stage in the fixed order coverage_terms, gender, smoking_status, age.

use crate::quote::{Gender, SmokingStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Rates by attained age
pub type AgeRates = BTreeMap<u32, u32>;

/// Rates by smoking status code, then age
pub type SmokingRates = BTreeMap<String, AgeRates>;

/// Rates by gender code, then smoking status, then age
pub type GenderRates = BTreeMap<String, SmokingRates>;

/// Lookup dimension of a rate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKey {
    CoverageTerms,
    Gender,
    SmokingStatus,
    Age,
}

impl RateKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateKey::CoverageTerms => "coverage_terms",
            RateKey::Gender => "gender",
            RateKey::SmokingStatus => "smoking_status",
            RateKey::Age => "age",
        }
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// No rate for the requested coordinates; `key` is the first stage that missed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("premium rate not found: {key}")]
pub struct PremiumRateNotFoundError {
    pub key: RateKey,
}

impl PremiumRateNotFoundError {
    pub fn new(key: RateKey) -> Self {
        Self { key }
    }
}

/// Rate data that does not fit either table shape
#[derive(Debug, Error)]
pub enum RateTableFormatError {
    #[error("{dimension} key '{key}' is not an integer")]
    InvalidKey { dimension: RateKey, key: String },
    #[error("malformed rate structure: {0}")]
    Structure(#[from] serde_json::Error),
}

/// Shape of the nested rate structure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RateSchedule {
    /// Outer `coverage_terms` dimension ahead of gender
    ByTerm(BTreeMap<u32, GenderRates>),
    /// Gender, smoking status and age only
    ByAge(GenderRates),
}

impl RateSchedule {
    pub fn has_term_dimension(&self) -> bool {
        matches!(self, RateSchedule::ByTerm(_))
    }
}

/// Rate table for one plan, as held in configuration
///
/// Both fields are `None` when the plan has no configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRateTable")]
pub struct RateTable {
    pub divisor: Option<f64>,
    pub rates: Option<RateSchedule>,
}

/// Rate table as written in JSON, where every map key is a string
#[derive(Debug, Deserialize)]
struct RawRateTable {
    #[serde(default)]
    divisor: Option<f64>,
    #[serde(default)]
    rates: Option<BTreeMap<String, serde_json::Value>>,
}

type RawGenderRates = BTreeMap<String, BTreeMap<String, BTreeMap<String, u32>>>;

fn parse_key(key: &str, dimension: RateKey) -> Result<u32, RateTableFormatError> {
    key.trim().parse().map_err(|_| RateTableFormatError::InvalidKey {
        dimension,
        key: key.to_string(),
    })
}

fn gender_rates(value: serde_json::Value) -> Result<GenderRates, RateTableFormatError> {
    let raw: RawGenderRates = serde_json::from_value(value)?;
    let mut by_gender = GenderRates::new();
    for (gender, by_smoking) in raw {
        let mut smoking_rates = SmokingRates::new();
        for (smoking_status, by_age) in by_smoking {
            let mut ages = AgeRates::new();
            for (age, rate) in by_age {
                ages.insert(parse_key(&age, RateKey::Age)?, rate);
            }
            smoking_rates.insert(smoking_status, ages);
        }
        by_gender.insert(gender, smoking_rates);
    }
    Ok(by_gender)
}

impl TryFrom<RawRateTable> for RateTable {
    type Error = RateTableFormatError;

    fn try_from(raw: RawRateTable) -> Result<Self, Self::Error> {
        let Some(rates) = raw.rates else {
            return Ok(Self {
                divisor: raw.divisor,
                rates: None,
            });
        };

        // Integer outer keys mean a coverage_terms dimension
        let term_shaped = !rates.is_empty() && rates.keys().all(|k| k.trim().parse::<u32>().is_ok());

        let schedule = if term_shaped {
            let mut by_term = BTreeMap::new();
            for (terms, value) in rates {
                by_term.insert(parse_key(&terms, RateKey::CoverageTerms)?, gender_rates(value)?);
            }
            RateSchedule::ByTerm(by_term)
        } else {
            let value = serde_json::Value::Object(rates.into_iter().collect());
            RateSchedule::ByAge(gender_rates(value)?)
        };

        Ok(Self {
            divisor: raw.divisor,
            rates: Some(schedule),
        })
    }
}

fn rate_by_gender(
    rates: &GenderRates,
    gender: Gender,
    smoking_status: SmokingStatus,
    age: u32,
) -> Result<u32, PremiumRateNotFoundError> {
    let by_smoking = rates
        .get(gender.code())
        .ok_or(PremiumRateNotFoundError::new(RateKey::Gender))?;
    let by_age = by_smoking
        .get(smoking_status.code())
        .ok_or(PremiumRateNotFoundError::new(RateKey::SmokingStatus))?;
    by_age
        .get(&age)
        .copied()
        .ok_or(PremiumRateNotFoundError::new(RateKey::Age))
}

impl RateTable {
    pub fn new(divisor: f64, rates: RateSchedule) -> Self {
        Self {
            divisor: Some(divisor),
            rates: Some(rates),
        }
    }

    /// Table for a plan with no configuration
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.rates.is_some()
    }

    pub fn divisor(&self) -> Option<f64> {
        self.divisor
    }

    pub fn rates(&self) -> Option<&RateSchedule> {
        self.rates.as_ref()
    }

    /// Staged lookup of a single rate
    ///
    /// Pass `coverage_terms` for term-shaped tables and `None` for age-only
    /// tables; a coordinate that does not match the table's shape misses on
    /// `coverage_terms`. Returns `None` when the table is unconfigured.
    pub fn lookup(
        &self,
        coverage_terms: Option<u32>,
        gender: Gender,
        smoking_status: SmokingStatus,
        age: u32,
    ) -> Option<Result<u32, PremiumRateNotFoundError>> {
        let schedule = self.rates.as_ref()?;

        let result = match (schedule, coverage_terms) {
            (RateSchedule::ByTerm(by_term), Some(terms)) => by_term
                .get(&terms)
                .ok_or(PremiumRateNotFoundError::new(RateKey::CoverageTerms))
                .and_then(|rates| rate_by_gender(rates, gender, smoking_status, age)),
            (RateSchedule::ByAge(rates), None) => rate_by_gender(rates, gender, smoking_status, age),
            (RateSchedule::ByTerm(_), None) | (RateSchedule::ByAge(_), Some(_)) => {
                Err(PremiumRateNotFoundError::new(RateKey::CoverageTerms))
            }
        };
        Some(result)
    }
}
