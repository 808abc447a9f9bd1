//! Applies a model's tuned decision threshold to a default probability and buckets it into a risk band.

use crate::config::RiskBandConfig;
use crate::error::{ErrorKind, PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Lower bounds are inclusive: `low_below` itself is medium.
    pub fn from_probability(p: f64, config: &RiskBandConfig) -> Self {
        if p < config.low_below {
            RiskBand::Low
        } else if p < config.medium_below {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "LOW RISK",
            RiskBand::Medium => "MEDIUM RISK",
            RiskBand::High => "HIGH RISK",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome for one applicant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub default_probability: f64,
    /// 1 = predicted default
    pub predicted_class: u8,
    pub risk_band: RiskBand,
    /// `max(p, 1 - p)`
    pub confidence: f64,
}

impl PredictionResult {
    pub fn is_default(&self) -> bool {
        self.predicted_class == 1
    }

    pub fn verdict(&self) -> &'static str {
        if self.is_default() {
            "Likely Default"
        } else {
            "Likely Good Loan"
        }
    }
}

fn check_unit(what: &str, kind: ErrorKind, v: f64) -> Result<()> {
    if v.is_finite() && (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(PipelineError::new(kind, format!("{what} must be within [0, 1] (got {v})")))
    }
}

pub struct RiskEngine {
    bands: RiskBandConfig,
}

impl RiskEngine {
    pub fn new(bands: RiskBandConfig) -> Self {
        Self { bands }
    }

    /// Class, band and confidence for `default_probability`. The threshold is closed:
    /// a probability equal to it is classed as default.
    pub fn classify(&self, default_probability: f64, threshold: f64) -> Result<PredictionResult> {
        check_unit("default probability", ErrorKind::InvalidProbability, default_probability)?;
        check_unit("decision threshold", ErrorKind::InvalidInput, threshold)?;

        let predicted_class = u8::from(default_probability >= threshold);
        Ok(PredictionResult {
            default_probability,
            predicted_class,
            risk_band: RiskBand::from_probability(default_probability, &self.bands),
            confidence: default_probability.max(1.0 - default_probability),
        })
    }
}
