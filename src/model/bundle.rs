//! Model bundle: every fitted object the pipeline needs, read from one JSON artifact.
//! Loaded once per process via [`ModelBundle::shared`] and immutable afterwards.

use super::{Classifier, DatasetInfo, DecisionTree, LogisticRegression, ModelKind, ModelMetrics, Scaler};
use crate::error::{ErrorKind, PipelineError, Result};
use crate::features::LabelEncoder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Threshold used when the artifact does not carry one.
pub const DEFAULT_THRESHOLD: f64 = 0.35;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

static SHARED: OnceLock<Result<ModelBundle>> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Decision tree, the primary predictor
    pub model: DecisionTree,
    #[serde(default)]
    pub lr_model: Option<LogisticRegression>,
    pub scaler: Scaler,
    #[serde(default)]
    pub encoders: BTreeMap<String, LabelEncoder>,
    /// Canonical input order of the scaler and both classifiers
    pub feature_columns: Vec<String>,
    #[serde(default = "default_threshold")]
    pub dt_threshold: f64,
    #[serde(default = "default_threshold")]
    pub lr_threshold: f64,
    #[serde(default)]
    pub dataset_info: DatasetInfo,
    #[serde(default)]
    pub dt_metrics: ModelMetrics,
    #[serde(default)]
    pub lr_metrics: ModelMetrics,
    /// SHA-256 of the artifact bytes, set when loaded from disk
    #[serde(skip)]
    pub fingerprint: Option<String>,
}

impl ModelBundle {
    /// Parse and validate an artifact held in memory.
    pub fn from_json(data: &str) -> Result<Self> {
        let bundle: ModelBundle = serde_json::from_str(data)?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            let kind = if e.kind() == std::io::ErrorKind::NotFound {
                ErrorKind::ArtifactMissing
            } else {
                ErrorKind::Io
            };
            PipelineError::new(kind, format!("{}: {}", path.display(), e))
        })?;

        let mut h = Sha256::new();
        h.update(&bytes);
        let fingerprint = format!("{:x}", h.finalize());

        let text = std::str::from_utf8(&bytes).map_err(|e| {
            PipelineError::artifact_invalid(format!("{}: not UTF-8: {}", path.display(), e))
        })?;
        let mut bundle = Self::from_json(text).map_err(|e| e.context(path.display()))?;
        bundle.fingerprint = Some(fingerprint);

        info!(
            path = %path.display(),
            sha256 = bundle.fingerprint.as_deref().unwrap_or_default(),
            features = bundle.feature_columns.len(),
            tree_nodes = bundle.model.node_count(),
            logistic = bundle.lr_model.is_some(),
            dt_threshold = bundle.dt_threshold,
            lr_threshold = bundle.lr_threshold,
            "model bundle loaded"
        );
        Ok(bundle)
    }

    /// First candidate path that exists on disk.
    pub fn locate(candidates: &[PathBuf]) -> Result<&Path> {
        candidates
            .iter()
            .find(|p| p.exists())
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                let looked: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
                PipelineError::new(
                    ErrorKind::ArtifactMissing,
                    format!("model bundle not found (looked in: {})", looked.join(", ")),
                )
            })
    }

    pub fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        Self::load(Self::locate(candidates)?)
    }

    /// Process-wide bundle. The first call loads it; every later call, from any thread,
    /// gets the same outcome without touching the disk again, including a load failure.
    pub fn shared(candidates: &[PathBuf]) -> Result<&'static ModelBundle> {
        SHARED
            .get_or_init(|| Self::load_first(candidates))
            .as_ref()
            .map_err(|e| e.clone())
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.feature_columns.len();
        if n == 0 {
            return Err(PipelineError::artifact_invalid("feature_columns is empty"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.feature_columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(PipelineError::artifact_invalid(format!(
                "feature column {dup:?} listed twice"
            )));
        }
        for (name, t) in [("dt_threshold", self.dt_threshold), ("lr_threshold", self.lr_threshold)] {
            if !(0.0..=1.0).contains(&t) {
                return Err(PipelineError::artifact_invalid(format!(
                    "{name} must be within [0, 1] (got {t})"
                )));
            }
        }

        self.scaler.validate()?;
        self.model.validate()?;
        if let Some(lr) = &self.lr_model {
            lr.validate()?;
        }

        let mut widths: Vec<(&str, usize)> = vec![
            (self.scaler.name(), self.scaler.n_features()),
            (self.model.name(), self.model.n_features()),
        ];
        if let Some(lr) = &self.lr_model {
            widths.push((lr.name(), lr.n_features()));
        }
        if let Some((name, w)) = widths.into_iter().find(|(_, w)| *w != n) {
            return Err(PipelineError::shape_mismatch(format!(
                "{name} expects {w} features but feature_columns lists {n}"
            )));
        }
        Ok(())
    }

    pub fn classifier(&self, kind: ModelKind) -> Result<&dyn Classifier> {
        match kind {
            ModelKind::DecisionTree => Ok(&self.model),
            ModelKind::LogisticRegression => self
                .lr_model
                .as_ref()
                .map(|m| m as &dyn Classifier)
                .ok_or_else(|| {
                    PipelineError::new(
                        ErrorKind::ModelUnavailable,
                        "bundle has no logistic regression model",
                    )
                }),
        }
    }

    /// Decision threshold tuned for `kind` during training.
    pub fn threshold(&self, kind: ModelKind) -> f64 {
        match kind {
            ModelKind::DecisionTree => self.dt_threshold,
            ModelKind::LogisticRegression => self.lr_threshold,
        }
    }

    pub fn metrics(&self, kind: ModelKind) -> &ModelMetrics {
        match kind {
            ModelKind::DecisionTree => &self.dt_metrics,
            ModelKind::LogisticRegression => &self.lr_metrics,
        }
    }

    pub fn available_models(&self) -> Vec<ModelKind> {
        let mut out = vec![ModelKind::DecisionTree];
        if self.lr_model.is_some() {
            out.push(ModelKind::LogisticRegression);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "model": {
            "n_features": 2,
            "children_left": [-1], "children_right": [-1],
            "feature": [-2], "threshold": [-2.0], "value": [[3, 1]]
        },
        "scaler": {"kind": "standard", "mean": [0, 0], "scale": [1, 1]},
        "feature_columns": ["person_age", "loan_int_rate"]
    }"#;

    #[test]
    fn defaults_when_optional_keys_absent() {
        let b = ModelBundle::from_json(MINIMAL).unwrap();
        assert_eq!(b.dt_threshold, 0.35);
        assert_eq!(b.lr_threshold, 0.35);
        assert!(b.lr_model.is_none());
        assert!(b.lr_metrics.is_empty());
        assert_eq!(b.available_models(), vec![ModelKind::DecisionTree]);
        assert!(b.fingerprint.is_none());
    }

    #[test]
    fn missing_logistic_model_is_unavailable() {
        let b = ModelBundle::from_json(MINIMAL).unwrap();
        let err = b.classifier(ModelKind::LogisticRegression).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
    }

    #[test]
    fn scaler_width_must_match_columns() {
        let mut b = ModelBundle::from_json(MINIMAL).unwrap();
        b.feature_columns.push("loan_grade".into());
        let err = b.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert!(err.message().contains("StandardScaler"));
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let mut b = ModelBundle::from_json(MINIMAL).unwrap();
        b.lr_threshold = 1.5;
        assert_eq!(b.validate().unwrap_err().kind(), ErrorKind::ArtifactInvalid);
    }

    #[test]
    fn duplicate_columns_rejected() {
        let mut b = ModelBundle::from_json(MINIMAL).unwrap();
        b.feature_columns[1] = "person_age".into();
        assert!(b.validate().unwrap_err().message().contains("twice"));
    }

    #[test]
    fn malformed_json_is_artifact_invalid() {
        let err = ModelBundle::from_json("{\"model\": 3}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArtifactInvalid);
    }

    #[test]
    fn locate_reports_all_candidates() {
        let paths = vec![PathBuf::from("nope/a.json"), PathBuf::from("nope/b.json")];
        let err = ModelBundle::locate(&paths).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArtifactMissing);
        assert!(err.message().contains("nope/a.json, nope/b.json"));
    }

    #[test]
    fn load_records_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dt_model.json");
        std::fs::write(&path, MINIMAL).unwrap();
        let b = ModelBundle::load_first(&[dir.path().join("missing.json"), path]).unwrap();
        assert_eq!(b.fingerprint.as_deref().map(str::len), Some(64));
    }
}
