//! Modal factors for converting an annual premium to a billing frequency

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// Default path to the modal factor CSV
pub const DEFAULT_MODAL_FACTORS_PATH: &str = "data/modal_factors.csv";

/// Billing frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "Y")]
    Yearly,
    #[serde(rename = "HY")]
    HalfYearly,
    #[serde(rename = "Q")]
    Quarterly,
    #[serde(rename = "M")]
    Monthly,
}

impl PaymentMode {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMode::Yearly => "Y",
            PaymentMode::HalfYearly => "HY",
            PaymentMode::Quarterly => "Q",
            PaymentMode::Monthly => "M",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Y" => Ok(PaymentMode::Yearly),
            "HY" => Ok(PaymentMode::HalfYearly),
            "Q" => Ok(PaymentMode::Quarterly),
            "M" => Ok(PaymentMode::Monthly),
            other => Err(format!("Unknown PaymentMode: {}", other)),
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raw CSV row: plan_code,mode,factor
#[derive(Debug, Deserialize)]
struct CsvRow {
    plan_code: String,
    mode: String,
    factor: f64,
}

/// Fractional premium multipliers by plan and billing frequency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalFactors {
    factors: HashMap<(String, PaymentMode), f64>,
}

impl ModalFactors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a CSV file; `None` when the file does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>, Box<dyn Error>> {
        if !path.exists() {
            log::debug!("No modal factor file at {}", path.display());
            return Ok(None);
        }
        let file = File::open(path)?;
        Self::from_reader(file).map(Some)
    }

    /// Load from the default location (data/modal_factors.csv)
    pub fn load_default() -> Result<Option<Self>, Box<dyn Error>> {
        Self::load_from(Path::new(DEFAULT_MODAL_FACTORS_PATH))
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, Box<dyn Error>> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut factors = Self::new();

        for result in csv_reader.deserialize() {
            let row: CsvRow = result?;
            let mode: PaymentMode = row.mode.parse()?;
            factors.insert(row.plan_code, mode, row.factor);
        }

        Ok(factors)
    }

    pub fn insert(&mut self, plan_code: impl Into<String>, mode: PaymentMode, factor: f64) {
        self.factors.insert((plan_code.into(), mode), factor);
    }

    pub fn factor(&self, plan_code: &str, mode: PaymentMode) -> Option<f64> {
        self.factors.get(&(plan_code.to_string(), mode)).copied()
    }

    pub fn yearly(&self, plan_code: &str) -> Option<f64> {
        self.factor(plan_code, PaymentMode::Yearly)
    }

    pub fn half_yearly(&self, plan_code: &str) -> Option<f64> {
        self.factor(plan_code, PaymentMode::HalfYearly)
    }

    pub fn quarterly(&self, plan_code: &str) -> Option<f64> {
        self.factor(plan_code, PaymentMode::Quarterly)
    }

    pub fn monthly(&self, plan_code: &str) -> Option<f64> {
        self.factor(plan_code, PaymentMode::Monthly)
    }
}
