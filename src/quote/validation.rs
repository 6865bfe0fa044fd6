//! Quote validation
//!
//! Raw quote input (e.g. a JSON request body) is checked field by field, in a
//! fixed order, and converted into a typed [`Quote`] only when every check passes.

use super::{Gender, Quote, SmokingStatus};
use crate::plans::ACTIVE_PLANS;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Smallest accepted coverage amount
pub const MIN_COVERAGE_AMOUNT: f64 = 10_000.0;

/// Largest accepted coverage amount
pub const MAX_COVERAGE_AMOUNT: f64 = 10_000_000.0;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Quote fields in validation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteField {
    Gender,
    DateOfBirth,
    SmokingStatus,
    CoverageAmount,
    EffectiveDate,
    PlanCode,
    CoverageTerms,
}

impl QuoteField {
    /// Human-readable name used to build full messages
    pub fn label(&self) -> &'static str {
        match self {
            QuoteField::Gender => "Gender",
            QuoteField::DateOfBirth => "Date of birth",
            QuoteField::SmokingStatus => "Smoking status",
            QuoteField::CoverageAmount => "Coverage amount",
            QuoteField::EffectiveDate => "Effective date",
            QuoteField::PlanCode => "Plan code",
            QuoteField::CoverageTerms => "Coverage terms",
        }
    }
}

/// A single failed check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: QuoteField,
    pub message: String,
}

impl FieldError {
    pub fn full_message(&self) -> String {
        format!("{} {}", self.field.label(), self.message)
    }
}

/// Every failed check, in field order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn add(&mut self, field: QuoteField, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_error(&self, field: QuoteField) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn first_error_message(&self, field: QuoteField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn first_full_message(&self) -> Option<String> {
        self.errors.first().map(FieldError::full_message)
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(FieldError::full_message).collect()
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Unvalidated quote, as received from a form or API request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteInput {
    pub gender: Option<String>,
    /// ISO 8601 calendar date (`YYYY-MM-DD`)
    pub date_of_birth: Option<String>,
    pub smoking_status: Option<String>,
    pub coverage_amount: Option<Value>,
    /// ISO 8601 calendar date (`YYYY-MM-DD`)
    pub effective_date: Option<String>,
    pub plan_code: Option<String>,
    pub coverage_terms: Option<Value>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn check_coverage_amount(amount: f64, errors: &mut ValidationErrors) {
    if !amount.is_finite() {
        errors.add(QuoteField::CoverageAmount, "is not a number");
    } else if amount < MIN_COVERAGE_AMOUNT {
        errors.add(
            QuoteField::CoverageAmount,
            format!("must be greater than or equal to {}", MIN_COVERAGE_AMOUNT),
        );
    } else if amount > MAX_COVERAGE_AMOUNT {
        errors.add(
            QuoteField::CoverageAmount,
            format!("must be less than or equal to {}", MAX_COVERAGE_AMOUNT),
        );
    }
}

fn check_plan_code(plan_code: &str, errors: &mut ValidationErrors) {
    if plan_code.trim().is_empty() {
        errors.add(QuoteField::PlanCode, "can't be blank");
    } else if !ACTIVE_PLANS.iter().any(|active| *active == plan_code) {
        errors.add(QuoteField::PlanCode, "is not included in the list");
    }
}

fn check_coverage_terms(terms: u64, errors: &mut ValidationErrors) -> Option<u32> {
    if terms == 0 {
        errors.add(QuoteField::CoverageTerms, "must be greater than 0");
        return None;
    }
    match u32::try_from(terms) {
        Ok(terms) => Some(terms),
        Err(_) => {
            errors.add(
                QuoteField::CoverageTerms,
                format!("must be less than or equal to {}", u32::MAX),
            );
            None
        }
    }
}

fn parse_date(value: &Option<String>, field: QuoteField, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let Some(text) = present(value) else {
        errors.add(field, "can't be blank");
        return None;
    };
    match NaiveDate::parse_from_str(text, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "is an invalid date");
            None
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

impl QuoteInput {
    /// Check every field and build the typed quote
    pub fn validate(&self) -> Result<Quote, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let gender = match present(&self.gender) {
            None => {
                errors.add(QuoteField::Gender, "can't be blank");
                None
            }
            Some(code) => match code.parse::<Gender>() {
                Ok(gender) => Some(gender),
                Err(_) => {
                    errors.add(QuoteField::Gender, "is not included in the list");
                    None
                }
            },
        };

        let date_of_birth = parse_date(&self.date_of_birth, QuoteField::DateOfBirth, &mut errors);

        let smoking_status = match present(&self.smoking_status) {
            None => {
                errors.add(QuoteField::SmokingStatus, "can't be blank");
                None
            }
            Some(code) => match code.parse::<SmokingStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    errors.add(QuoteField::SmokingStatus, "is not included in the list");
                    None
                }
            },
        };

        let coverage_amount = match &self.coverage_amount {
            None => {
                errors.add(QuoteField::CoverageAmount, "can't be blank");
                None
            }
            Some(value) if is_blank(value) => {
                errors.add(QuoteField::CoverageAmount, "can't be blank");
                None
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(amount) => {
                    let before = errors.errors.len();
                    check_coverage_amount(amount, &mut errors);
                    (errors.errors.len() == before).then_some(amount)
                }
                None => {
                    errors.add(QuoteField::CoverageAmount, "is not a number");
                    None
                }
            },
            Some(_) => {
                errors.add(QuoteField::CoverageAmount, "is not a number");
                None
            }
        };

        let effective_date = parse_date(&self.effective_date, QuoteField::EffectiveDate, &mut errors);

        let plan_code = match present(&self.plan_code) {
            None => {
                errors.add(QuoteField::PlanCode, "can't be blank");
                None
            }
            Some(code) => {
                let before = errors.errors.len();
                check_plan_code(code, &mut errors);
                (errors.errors.len() == before).then(|| code.to_string())
            }
        };

        let coverage_terms = match &self.coverage_terms {
            None => {
                errors.add(QuoteField::CoverageTerms, "can't be blank");
                None
            }
            Some(value) if is_blank(value) => {
                errors.add(QuoteField::CoverageTerms, "can't be blank");
                None
            }
            Some(Value::Number(n)) => {
                if let Some(terms) = n.as_u64() {
                    check_coverage_terms(terms, &mut errors)
                } else if n.is_i64() {
                    errors.add(QuoteField::CoverageTerms, "must be greater than 0");
                    None
                } else {
                    errors.add(QuoteField::CoverageTerms, "must be an integer");
                    None
                }
            }
            Some(_) => {
                errors.add(QuoteField::CoverageTerms, "is not a number");
                None
            }
        };

        match (
            gender,
            date_of_birth,
            smoking_status,
            coverage_amount,
            effective_date,
            plan_code,
            coverage_terms,
        ) {
            (
                Some(gender),
                Some(date_of_birth),
                Some(smoking_status),
                Some(coverage_amount),
                Some(effective_date),
                Some(plan_code),
                Some(coverage_terms),
            ) if errors.is_empty() => Ok(Quote {
                gender,
                date_of_birth,
                smoking_status,
                coverage_amount,
                effective_date,
                plan_code,
                coverage_terms,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Quote> for QuoteInput {
    fn from(quote: &Quote) -> Self {
        Self {
            gender: Some(quote.gender.code().to_string()),
            date_of_birth: Some(quote.date_of_birth.format(DATE_FORMAT).to_string()),
            smoking_status: Some(quote.smoking_status.code().to_string()),
            coverage_amount: serde_json::Number::from_f64(quote.coverage_amount).map(Value::Number),
            effective_date: Some(quote.effective_date.format(DATE_FORMAT).to_string()),
            plan_code: Some(quote.plan_code.clone()),
            coverage_terms: Some(Value::from(quote.coverage_terms)),
        }
    }
}

impl Quote {
    /// Re-check the constraints a typed quote cannot encode on its own
    ///
    /// Gender, smoking status and dates are enforced by their types; the
    /// coverage range, plan code and term still need checking.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_coverage_amount(self.coverage_amount, &mut errors);
        check_plan_code(&self.plan_code, &mut errors);
        check_coverage_terms(u64::from(self.coverage_terms), &mut errors);
        errors.into_result(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
