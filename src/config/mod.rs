use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    currency::CurrencyCode,
    errors::LedgerError,
    utils::{ensure_dir, write_atomic, PathResolver},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_base_currency")]
    pub base_currency: String,
    /// Replaces the pivot stored in the book, for tables whose rates are quoted elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_currency: Option<String>,
    /// Year plotted on dashboards; the current year when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_year: Option<i32>,
    #[serde(default = "Config::default_well_known")]
    pub well_known_currencies: Vec<String>,
    #[serde(default = "Config::default_book_name")]
    pub default_book: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: Self::default_base_currency(),
            pivot_currency: None,
            reporting_year: None,
            well_known_currencies: Self::default_well_known(),
            default_book: Self::default_book_name(),
        }
    }
}

impl Config {
    fn default_base_currency() -> String {
        "EGP".into()
    }

    fn default_well_known() -> Vec<String> {
        ["EGP", "USD", "EUR", "SAR"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn default_book_name() -> String {
        "agency".into()
    }

    pub fn reporting_year(&self) -> i32 {
        self.reporting_year.unwrap_or_else(|| Local::now().year())
    }

    pub fn well_known_codes(&self) -> Vec<CurrencyCode> {
        self.well_known_currencies
            .iter()
            .map(CurrencyCode::new)
            .collect()
    }

    pub fn pivot_code(&self) -> Option<CurrencyCode> {
        self.pivot_currency.as_deref().map(CurrencyCode::new)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Reads the config file, or returns defaults when none has been written yet.
    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            debug!(path = %self.path.display(), "loaded configuration");
            Ok(serde_json::from_str(&data)?)
        } else {
            debug!(path = %self.path.display(), "no configuration file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
