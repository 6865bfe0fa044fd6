//! Quote data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gender of the applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
}

impl Gender {
    /// Code used as the rate table key
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "F" => Ok(Gender::Female),
            "M" => Ok(Gender::Male),
            other => Err(format!("Unknown Gender: {}", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Smoking status of the applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingStatus {
    #[serde(rename = "N")]
    NonSmoker,
    #[serde(rename = "S")]
    Smoker,
}

impl SmokingStatus {
    /// Code used as the rate table key
    pub fn code(&self) -> &'static str {
        match self {
            SmokingStatus::NonSmoker => "N",
            SmokingStatus::Smoker => "S",
        }
    }
}

impl FromStr for SmokingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(SmokingStatus::NonSmoker),
            "S" => Ok(SmokingStatus::Smoker),
            other => Err(format!("Unknown SmokingStatus: {}", other)),
        }
    }
}

impl fmt::Display for SmokingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A request for a premium quote
///
/// Never mutated by the calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub gender: Gender,

    pub date_of_birth: NaiveDate,

    pub smoking_status: SmokingStatus,

    /// Sum assured
    pub coverage_amount: f64,

    /// Date the applicant is aged at
    pub effective_date: NaiveDate,

    /// Plan code, e.g. `T15` or `WLF`
    pub plan_code: String,

    /// Term length in years for term plans; carried but unused by whole-life plans
    pub coverage_terms: u32,
}

impl Quote {
    pub fn new(
        gender: Gender,
        date_of_birth: NaiveDate,
        smoking_status: SmokingStatus,
        coverage_amount: f64,
        effective_date: NaiveDate,
        plan_code: impl Into<String>,
        coverage_terms: u32,
    ) -> Self {
        Self {
            gender,
            date_of_birth,
            smoking_status,
            coverage_amount,
            effective_date,
            plan_code: plan_code.into(),
            coverage_terms,
        }
    }
}
