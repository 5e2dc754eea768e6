//! Rule-table loading functionality.
//!
//! Payroll rules are loaded from a directory of YAML files:
//!
//! ```text
//! config/israel/
//! ├── rates.yaml      # Thresholds, tier multipliers, monthly norm, gates
//! └── calendar.yaml   # Night window and Sabbath fallback estimate
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

use super::types::{CalendarRules, FeatureGates, PayRules, RateRules};

/// File structure of `rates.yaml`.
#[derive(Debug, Deserialize)]
struct RatesFile {
    rates: RateRules,
    #[serde(default)]
    features: FeatureGates,
}

/// File structure of `calendar.yaml`.
#[derive(Debug, Deserialize)]
struct CalendarFile {
    calendar: CalendarRules,
}

impl PayRules {
    /// Loads payroll rules from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the rule directory (e.g. `./config/israel`)
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigNotFound`] if a required file is missing
    /// and [`EngineError::ConfigParseError`] if a file contains invalid YAML.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::PayRules;
    ///
    /// let rules = PayRules::load("./config/israel")?;
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let rates_file: RatesFile = load_yaml(&path.join("rates.yaml"))?;
        let calendar_file: CalendarFile = load_yaml(&path.join("calendar.yaml"))?;

        Ok(Self {
            rates: rates_file.rates,
            calendar: calendar_file.calendar,
            features: rates_file.features,
        })
    }
}

/// Loads and parses a YAML file.
fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let path_str = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
        path: path_str.clone(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
        path: path_str,
        message: e.to_string(),
    })
}
