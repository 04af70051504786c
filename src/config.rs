//! Analysis Configuration Module
//! Input file locations and diagnostic parameters, optionally read from JSON.

use crate::stats::DEFAULT_SEASONAL_LENGTH;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE_NAME: &str = "sunspot_explorer.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Separator must be a single ASCII character, got {0:?}")]
    InvalidSeparator(String),
    #[error("{0} must be greater than zero")]
    ZeroParameter(&'static str),
    #[error("stl_seasonal_length must be odd and at least 3, got {0}")]
    InvalidSeasonalLength(usize),
}

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub monthly_file: String,
    pub monthly_smoothed_file: String,
    pub hemispheric_file: String,
    pub hemispheric_smoothed_file: String,
    pub separator: String,
    /// Rows the 13-month smoothing leaves undefined at each end.
    pub smoothing_trim: usize,
    /// Monthly records before this date are dropped as unreliable.
    pub start_date: NaiveDate,
    pub acf_lags: usize,
    pub decomposition_period: usize,
    /// LOESS window of the STL seasonal smoother, in cycles.
    pub stl_seasonal_length: usize,
    pub export_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            monthly_file: "SN_m_tot_V2.0.csv".to_string(),
            monthly_smoothed_file: "SN_ms_tot_V2.0.csv".to_string(),
            hemispheric_file: "SN_m_hem_V2.0.csv".to_string(),
            hemispheric_smoothed_file: "SN_ms_hem_V2.0.csv".to_string(),
            separator: ";".to_string(),
            smoothing_trim: 6,
            start_date: NaiveDate::from_ymd_opt(1800, 1, 1).unwrap_or_default(),
            acf_lags: 50,
            decomposition_period: 12,
            stl_seasonal_length: DEFAULT_SEASONAL_LENGTH,
            export_dir: PathBuf::from("charts"),
        }
    }
}

impl AnalysisConfig {
    /// Read the config from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.separator_byte()?;
        if self.acf_lags == 0 {
            return Err(ConfigError::ZeroParameter("acf_lags"));
        }
        if self.decomposition_period == 0 {
            return Err(ConfigError::ZeroParameter("decomposition_period"));
        }
        if self.stl_seasonal_length < 3 || self.stl_seasonal_length % 2 == 0 {
            return Err(ConfigError::InvalidSeasonalLength(self.stl_seasonal_length));
        }
        Ok(())
    }

    /// Field separator as the single byte polars expects.
    pub fn separator_byte(&self) -> Result<u8, ConfigError> {
        match self.separator.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(ConfigError::InvalidSeparator(self.separator.clone())),
        }
    }

    pub fn monthly_path(&self) -> PathBuf {
        self.data_dir.join(&self.monthly_file)
    }

    pub fn monthly_smoothed_path(&self) -> PathBuf {
        self.data_dir.join(&self.monthly_smoothed_file)
    }

    pub fn hemispheric_path(&self) -> PathBuf {
        self.data_dir.join(&self.hemispheric_file)
    }

    pub fn hemispheric_smoothed_path(&self) -> PathBuf {
        self.data_dir.join(&self.hemispheric_smoothed_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_source_layout() {
        let config = AnalysisConfig::default();
        assert_eq!(config.monthly_path(), PathBuf::from("data/SN_m_tot_V2.0.csv"));
        assert_eq!(config.separator_byte().unwrap(), b';');
        assert_eq!(config.smoothing_trim, 6);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(1800, 1, 1).unwrap());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(r#"{ "acf_lags": 24, "start_date": "1850-01-01" }"#)
            .unwrap();
        assert_eq!(config.acf_lags, 24);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(1850, 1, 1).unwrap());
        assert_eq!(config.decomposition_period, 12);
        assert_eq!(config.stl_seasonal_length, 7);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "separator": ";;" }"#),
            Err(ConfigError::InvalidSeparator(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "decomposition_period": 0 }"#),
            Err(ConfigError::ZeroParameter("decomposition_period"))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "stl_seasonal_length": 8 }"#),
            Err(ConfigError::InvalidSeasonalLength(8))
        ));
        assert!(matches!(
            AnalysisConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            AnalysisConfig::load_or_default(Path::new("definitely/not/here.json")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }
}
