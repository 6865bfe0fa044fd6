//! Rate table sources
//!
//! Loads premium rate tables from `data/rates/<PLAN>/premium_rates.json`, or serves
//! them from memory. A plan with no readable configuration gets an unconfigured
//! table rather than an error.

use super::RateTable;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Default path to the rate table directory
pub const DEFAULT_RATES_PATH: &str = "data/rates";

/// File name of a plan's rate table inside its directory
pub const RATE_TABLE_FILE: &str = "premium_rates.json";

/// Source of rate tables by plan code
pub trait RateTableProvider: fmt::Debug + Send + Sync {
    /// Table for `plan_code`; unconfigured when the plan has no data
    fn rate_table(&self, plan_code: &str) -> Arc<RateTable>;
}

/// Load one plan's rate table from a JSON file
pub fn load_rate_table(path: &Path) -> Result<RateTable, Box<dyn Error>> {
    let file = File::open(path)?;
    let table = serde_json::from_reader(BufReader::new(file))?;
    Ok(table)
}

/// Rate tables read from disk, cached per plan code
///
/// Each plan is read at most once; entries are never invalidated.
#[derive(Debug)]
pub struct FileRateTables {
    root: PathBuf,
    cache: RwLock<HashMap<String, Arc<RateTable>>>,
}

impl FileRateTables {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Tables under the default location (data/rates/)
    pub fn load_default() -> Self {
        Self::new(DEFAULT_RATES_PATH)
    }

    /// Path of the table file for `plan_code`
    pub fn table_path(&self, plan_code: &str) -> PathBuf {
        self.root.join(plan_code).join(RATE_TABLE_FILE)
    }

    fn read_table(&self, plan_code: &str) -> RateTable {
        // Plan codes name a directory; anything path-like is not a plan
        if plan_code.is_empty() || plan_code.contains(['/', '\\', '.']) {
            log::warn!("Rejecting rate table lookup for plan code {:?}", plan_code);
            return RateTable::unconfigured();
        }

        let path = self.table_path(plan_code);
        if !path.exists() {
            log::debug!("No rate table for plan {} at {}", plan_code, path.display());
            return RateTable::unconfigured();
        }

        match load_rate_table(&path) {
            Ok(table) => {
                log::debug!("Loaded rate table for plan {} from {}", plan_code, path.display());
                table
            }
            Err(err) => {
                log::warn!("Unreadable rate table {}: {}", path.display(), err);
                RateTable::unconfigured()
            }
        }
    }
}

impl RateTableProvider for FileRateTables {
    fn rate_table(&self, plan_code: &str) -> Arc<RateTable> {
        if let Ok(cache) = self.cache.read() {
            if let Some(table) = cache.get(plan_code) {
                return Arc::clone(table);
            }
        }

        let table = Arc::new(self.read_table(plan_code));
        match self.cache.write() {
            Ok(mut cache) => Arc::clone(cache.entry(plan_code.to_string()).or_insert(table)),
            Err(_) => table,
        }
    }
}

/// Rate tables held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateTables {
    tables: HashMap<String, Arc<RateTable>>,
}

impl InMemoryRateTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, plan_code: impl Into<String>, table: RateTable) {
        self.tables.insert(plan_code.into(), Arc::new(table));
    }

    pub fn with_table(mut self, plan_code: impl Into<String>, table: RateTable) -> Self {
        self.insert(plan_code, table);
        self
    }
}

impl RateTableProvider for InMemoryRateTables {
    fn rate_table(&self, plan_code: &str) -> Arc<RateTable> {
        self.tables
            .get(plan_code)
            .cloned()
            .unwrap_or_else(|| Arc::new(RateTable::unconfigured()))
    }
}
