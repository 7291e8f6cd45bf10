//! Pipeline configuration, loaded from TOML.
//!
//! ```toml
//! [api]
//! base_url = "https://api.bls.gov/publicAPI/v1/timeseries/data/"
//! max_requests = 25
//! pacing_ms = 1000
//! timeout_secs = 30
//!
//! [range]
//! years_back = 3
//!
//! [output]
//! data_dir = "data"
//! parquet = false
//!
//! [sectors]
//! Construction = "CES2000000001"
//! ```
//!
//! Every section is optional. An empty `[sectors]` table means the eleven
//! CES supersectors.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::bls::DEFAULT_BASE_URL;
use crate::data::budget::DEFAULT_MAX_REQUESTS;
use crate::data::{SectorCatalog, YearRange};
use crate::io::OutputOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("unknown sector '{0}'")]
    UnknownSector(String),
}

impl ConfigError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub max_requests: u32,
    pub pacing_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_requests: DEFAULT_MAX_REQUESTS,
            pacing_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Year range. Explicit years win over `years_back`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub years_back: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            years_back: 3,
            start_year: None,
            end_year: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
    pub parquet: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            parquet: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub api: ApiConfig,
    pub range: RangeConfig,
    pub output: OutputConfig,
    pub sectors: BTreeMap<String, String>,
}

impl PipelineConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.range.years_back < 0 {
            return Err(ConfigError::Invalid(format!(
                "years_back must be >= 0, got {}",
                self.range.years_back
            )));
        }
        if let (Some(start), Some(end)) = (self.range.start_year, self.range.end_year) {
            if start > end {
                return Err(ConfigError::Invalid(format!(
                    "start_year {start} is after end_year {end}"
                )));
            }
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".into()));
        }
        Ok(())
    }

    /// Resolve the year range against the current year.
    ///
    /// With only `end_year` set, the range is `end_year - years_back ..= end_year`;
    /// with only `start_year`, it runs to `current_year`.
    pub fn year_range(&self, current_year: i32) -> Result<YearRange, ConfigError> {
        let r = &self.range;
        let end = r.end_year.unwrap_or(current_year);
        let start = r.start_year.unwrap_or(end - r.years_back);
        YearRange::new(start, end).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn catalog(&self) -> SectorCatalog {
        if self.sectors.is_empty() {
            SectorCatalog::default_ces()
        } else {
            SectorCatalog::new(self.sectors.clone())
        }
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions::new(&self.output.data_dir).with_parquet(self.output.parquet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let c = PipelineConfig::from_toml("").unwrap();
        assert_eq!(c, PipelineConfig::default());
        assert_eq!(c.api.max_requests, 25);
        assert_eq!(c.api.pacing(), Duration::from_secs(1));
        assert_eq!(c.catalog().len(), 11);
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = PipelineConfig::default();
        c.range.start_year = Some(2015);
        c.range.end_year = Some(2020);
        c.output.parquet = true;
        c.sectors.insert("Construction".into(), "CES2000000001".into());

        let parsed = PipelineConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(c, parsed);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let c = PipelineConfig::from_toml(
            r#"
            [api]
            max_requests = 5

            [output]
            data_dir = "/tmp/emp"
            "#,
        )
        .unwrap();
        assert_eq!(c.api.max_requests, 5);
        assert_eq!(c.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.output.data_dir, PathBuf::from("/tmp/emp"));
        assert!(!c.output.parquet);
    }

    #[test]
    fn default_range_is_last_three_years() {
        let c = PipelineConfig::default();
        assert_eq!(c.year_range(2025).unwrap(), YearRange { start: 2022, end: 2025 });
    }

    #[test]
    fn explicit_years_override_years_back() {
        let c = PipelineConfig::from_toml("[range]\nstart_year = 2010\nend_year = 2012\n").unwrap();
        assert_eq!(c.year_range(2025).unwrap(), YearRange { start: 2010, end: 2012 });

        let c = PipelineConfig::from_toml("[range]\nend_year = 2020\nyears_back = 2\n").unwrap();
        assert_eq!(c.year_range(2025).unwrap(), YearRange { start: 2018, end: 2020 });
    }

    #[test]
    fn inverted_years_rejected() {
        let err = PipelineConfig::from_toml("[range]\nstart_year = 2020\nend_year = 2010\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn start_after_current_year_rejected() {
        let c = PipelineConfig::from_toml("[range]\nstart_year = 2030\n").unwrap();
        assert!(c.year_range(2025).is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = PipelineConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(c, PipelineConfig::default());
    }

    #[test]
    fn unparseable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[api\nmax_requests = ").unwrap();
        assert!(matches!(PipelineConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
