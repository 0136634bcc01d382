//! Analysis configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file (or no
//! file) yields weekly analysis over the built-in catalog.
//!
//! ```toml
//! granularity = "weekly"
//! target_policy = "sum_of_areas"
//! holidays = ["2025-03-31", "2025-04-01"]
//! mtd_month = "2025-09"
//!
//! [catalog.areas]
//! "PAPUA" = "East Indo"
//! ```

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::aggregate::TargetPolicy;
use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::period::{Granularity, Period};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub granularity: Granularity,
    /// Dates whose periods are excluded from control limits.
    pub holidays: Vec<NaiveDate>,
    pub target_policy: TargetPolicy,
    /// Month for the MTD snapshot (`YYYY-MM`); the latest month in the
    /// data when unset.
    pub mtd_month: Option<String>,
    pub catalog: Catalog,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Weekly,
            holidays: Vec::new(),
            target_policy: TargetPolicy::DirectRow,
            mtd_month: None,
            catalog: Catalog::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.areas().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "catalog.areas".to_string(),
                message: "at least one area is required".to_string(),
            });
        }
        if let Some(month) = &self.mtd_month {
            if Period::parse_key(month, Granularity::Monthly).is_none() {
                return Err(ConfigError::ValidationFailed {
                    field: "mtd_month".to_string(),
                    message: format!("expected YYYY-MM, got {month:?}"),
                });
            }
        }
        Ok(())
    }

    /// The configured MTD month, if any.
    pub fn mtd_period(&self) -> Option<Period> {
        self.mtd_month
            .as_deref()
            .and_then(|m| Period::parse_key(m, Granularity::Monthly))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AnalysisConfig::from_toml("").expect("valid");
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.catalog.areas().len(), 10);
    }

    #[test]
    fn test_full_config() {
        let config = AnalysisConfig::from_toml(
            r#"
            granularity = "monthly"
            target_policy = "sum_of_areas"
            holidays = ["2025-03-31", "2025-04-01"]
            mtd_month = "2025-09"
            "#,
        )
        .expect("valid");
        assert_eq!(config.granularity, Granularity::Monthly);
        assert_eq!(config.target_policy, TargetPolicy::SumOfAreas);
        assert_eq!(config.holidays.len(), 2);
        assert_eq!(config.mtd_period().map(|p| p.label()), Some("2025-09".to_string()));
    }

    #[test]
    fn test_parse_error() {
        let err = AnalysisConfig::from_toml("granularity = \"daily\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_validation_errors() {
        let err = AnalysisConfig::from_toml("mtd_month = \"September\"").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "mtd_month"));

        let err = AnalysisConfig::from_toml("[catalog]\nareas = {}").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "catalog.areas"));
    }

    #[test]
    fn test_missing_file() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/order-spc.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
