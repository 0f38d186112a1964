//! TOML configuration.
//!
//! ```toml
//! [paths]
//! positions = "data/processed/positions_latest.csv"
//! holdings = "data/processed/holdings_latest.csv"
//! raw_positions_dir = "data/raw/positions"
//! factor_file = "data/raw/factors/F-F_Research_Data_Factors.csv"
//!
//! [mapping]
//! ticker = "TICKER"
//! shares = "SHARES"
//! name = "STOCK"
//! sector = "SECTOR"
//!
//! [options]
//! include_as_of = true
//! history_years = 5
//! weight_tolerance = 1e-6
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use exposure_primitives::DEFAULT_WEIGHT_TOLERANCE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ColumnMapping, DataError};

/// File locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Canonical positions written by `sync`, read by `holdings`.
    pub positions: PathBuf,
    /// Weight table written by `holdings`, read by `regress`.
    pub holdings: PathBuf,
    /// Directory for dated position snapshots.
    pub raw_positions_dir: PathBuf,
    /// Three-factor dataset.
    pub factor_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            positions: PathBuf::from("data/processed/positions_latest.csv"),
            holdings: PathBuf::from("data/processed/holdings_latest.csv"),
            raw_positions_dir: PathBuf::from("data/raw/positions"),
            factor_file: PathBuf::from("data/raw/factors/F-F_Research_Data_Factors.csv"),
        }
    }
}

/// Behavioural switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsConfig {
    /// Stamp synced positions with the sync date.
    pub include_as_of: bool,
    /// Years of monthly history used by the regression.
    pub history_years: u32,
    /// Allowed deviation of the weight sum from one.
    pub weight_tolerance: f64,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self { include_as_of: true, history_years: 5, weight_tolerance: DEFAULT_WEIGHT_TOLERANCE }
    }
}

/// Top-level configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExposureConfig {
    /// File locations.
    pub paths: PathsConfig,
    /// Canonical field to sheet column.
    pub mapping: BTreeMap<String, String>,
    /// Behavioural switches.
    pub options: OptionsConfig,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        let mapping = [("ticker", "TICKER"), ("shares", "SHARES"), ("name", "STOCK"), ("sector", "SECTOR")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { paths: PathsConfig::default(), mapping, options: OptionsConfig::default() }
    }
}

impl ExposureConfig {
    /// Parse from TOML text. Absent sections and fields take defaults.
    ///
    /// # Errors
    /// Returns an error on malformed TOML or unknown keys.
    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                info!(path = %path.display(), "loaded config");
                Self::from_toml(&content)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(DataError::io(path, e)),
        }
    }

    /// Validated sheet column mapping.
    ///
    /// # Errors
    /// [`DataError::MissingMappingKeys`] if `ticker` or `shares` is unmapped.
    pub fn column_mapping(&self) -> Result<ColumnMapping, DataError> {
        ColumnMapping::from_table(&self.mapping)
    }
}
