//! Engine configuration
//!
//! Defaults point at the shipped data directory. Environment variables override:
//!   PREMIUM_RATES_PATH, MODAL_FACTORS_PATH, AGE_BASIS (alb | anb | nearest)

use crate::age::AgeBasis;
use crate::rates::{DEFAULT_MODAL_FACTORS_PATH, DEFAULT_RATES_PATH};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const RATES_PATH_VAR: &str = "PREMIUM_RATES_PATH";
pub const MODAL_FACTORS_PATH_VAR: &str = "MODAL_FACTORS_PATH";
pub const AGE_BASIS_VAR: &str = "AGE_BASIS";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Directory holding one `<PLAN>/premium_rates.json` per plan
    pub rates_path: PathBuf,

    /// CSV of modal factors
    pub modal_factors_path: PathBuf,

    pub age_basis: AgeBasis,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rates_path: PathBuf::from(DEFAULT_RATES_PATH),
            modal_factors_path: PathBuf::from(DEFAULT_MODAL_FACTORS_PATH),
            age_basis: AgeBasis::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with any configured environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Defaults overlaid with values from `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(RATES_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            config.rates_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(MODAL_FACTORS_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            config.modal_factors_path = PathBuf::from(path);
        }
        if let Some(basis) = lookup(AGE_BASIS_VAR).filter(|v| !v.trim().is_empty()) {
            config.age_basis = basis.parse().map_err(|message| ConfigError::InvalidValue {
                var: AGE_BASIS_VAR,
                message,
            })?;
        }

        Ok(config)
    }
}
