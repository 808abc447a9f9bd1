//! Application configuration. Policies that differed between dashboard builds are explicit here.

use crate::error::{PipelineError, Result};
use crate::model::ModelKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Candidate model bundle locations, first existing wins
    pub bundle_paths: Vec<PathBuf>,
    /// Classifier used when the caller does not pick one
    pub default_model: ModelKind,
    /// Derived-feature and banding policies
    pub policy: PolicyConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub income_policy: IncomePolicy,
    pub risk_bands: RiskBandConfig,
    /// Upper bound for the probability written to batch output
    pub batch_probability_cap: f64,
}

/// How the loan-to-income ratio treats zero income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomePolicy {
    /// Income <= 0 yields 0.0; otherwise the ratio rounded to 4 places
    #[default]
    Guarded,
    /// Plain division; zero income is an error
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBandConfig {
    /// Probability below this is low risk
    pub low_below: f64,
    /// Probability below this (and not low) is medium risk
    pub medium_below: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl RiskBandConfig {
    pub const STANDARD: RiskBandConfig = RiskBandConfig {
        low_below: 0.30,
        medium_below: 0.60,
    };

    /// Upper medium bound used by the batch dashboard build.
    pub const WIDE_MEDIUM: RiskBandConfig = RiskBandConfig {
        low_below: 0.30,
        medium_below: 0.70,
    };

    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 < self.low_below
            && self.low_below < self.medium_below
            && self.medium_below <= 1.0;
        if !ordered {
            return Err(PipelineError::invalid_input(format!(
                "risk bands must satisfy 0 < low_below < medium_below <= 1 (got {} / {})",
                self.low_below, self.medium_below
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bundle_paths: vec![
                PathBuf::from("dt_model.json"),
                PathBuf::from("model/dt_model.json"),
            ],
            default_model: ModelKind::DecisionTree,
            policy: PolicyConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            income_policy: IncomePolicy::Guarded,
            risk_bands: RiskBandConfig::default(),
            batch_probability_cap: 0.9999,
        }
    }
}

impl Default for RiskBandConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load from JSON file if present; a missing file means defaults. A file that exists
    /// but does not parse is an error, since the policies in it change scores.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(PipelineError::from(e).context(path.display())),
        };
        let config: AppConfig = serde_json::from_str(&data).map_err(|e| {
            PipelineError::invalid_input(format!("config {}: {}", path.display(), e))
        })?;
        config.policy.risk_bands.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let c = AppConfig::load(std::path::Path::new("does-not-exist.json")).unwrap();
        assert_eq!(c.policy.income_policy, IncomePolicy::Guarded);
        assert_eq!(c.policy.risk_bands, RiskBandConfig::STANDARD);
        assert_eq!(c.default_model, ModelKind::DecisionTree);
        assert_eq!(c.bundle_paths.len(), 2);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: AppConfig =
            serde_json::from_str(r#"{"policy":{"income_policy":"strict"}}"#).unwrap();
        assert_eq!(c.policy.income_policy, IncomePolicy::Strict);
        assert_eq!(c.policy.batch_probability_cap, 0.9999);
        assert_eq!(c.log.level, "info");
    }

    #[test]
    fn band_validation() {
        assert!(RiskBandConfig::STANDARD.validate().is_ok());
        assert!(RiskBandConfig::WIDE_MEDIUM.validate().is_ok());
        let bad = RiskBandConfig {
            low_below: 0.6,
            medium_below: 0.3,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn typo_in_policy_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creditiq.json");
        std::fs::write(&path, r#"{"policy":{"income_policy":"stirct"}}"#).unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
        assert!(err.message().contains("stirct"));
    }

    #[test]
    fn misordered_bands_in_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creditiq.json");
        std::fs::write(&path, r#"{"policy":{"risk_bands":{"low_below":0.7,"medium_below":0.3}}}"#).unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
