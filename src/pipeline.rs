//! Inference pipeline: encode → scale → predict → threshold → band.

use crate::config::PolicyConfig;
use crate::error::{PipelineError, Result};
use crate::features::{ApplicantRecord, DerivedFeatures, FeatureExtractor, FeatureVector};
use crate::model::{ModelBundle, ModelKind};
use crate::risk::{PredictionResult, RiskEngine};
use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayView2, Axis};
use serde::Serialize;
use tracing::debug;

/// Everything known about one scored applicant.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub model: ModelKind,
    pub threshold: f64,
    pub derived: DerivedFeatures,
    pub result: PredictionResult,
    pub scored_at: DateTime<Utc>,
}

impl Assessment {
    /// Whole-percent probability, truncated as the gauge shows it.
    pub fn probability_percent(&self) -> u32 {
        (self.result.default_probability * 100.0) as u32
    }

    pub fn verdict(&self) -> &'static str {
        self.result.verdict()
    }

    pub fn band_label(&self) -> &'static str {
        self.result.risk_band.label()
    }
}

pub struct InferencePipeline<'b> {
    bundle: &'b ModelBundle,
    extractor: FeatureExtractor<'b>,
    engine: RiskEngine,
}

impl<'b> InferencePipeline<'b> {
    /// Checks the bundle and the band policy up front; a bundle assembled by hand gets
    /// the same checks as one loaded from disk.
    pub fn new(bundle: &'b ModelBundle, policy: &PolicyConfig) -> Result<Self> {
        bundle.validate()?;
        policy.risk_bands.validate()?;
        Ok(Self {
            bundle,
            extractor: FeatureExtractor::new(&bundle.feature_columns, &bundle.encoders, policy.income_policy),
            engine: RiskEngine::new(policy.risk_bands),
        })
    }

    pub fn bundle(&self) -> &'b ModelBundle {
        self.bundle
    }

    /// Encoded vector in bundle feature order, plus the derived fields that went into it.
    pub fn encode(&self, record: &ApplicantRecord) -> Result<(FeatureVector, DerivedFeatures)> {
        self.extractor.extract(record)
    }

    /// Default probability for every row of an encoded matrix (rows × feature_columns).
    /// Scaling is applied to the whole matrix at once.
    pub fn default_probabilities(&self, encoded: ArrayView2<'_, f64>, kind: ModelKind) -> Result<Vec<f64>> {
        let classifier = self.bundle.classifier(kind)?;
        let scaled = self.bundle.scaler.transform(encoded)?;
        scaled
            .axis_iter(Axis(0))
            .map(|row| classifier.predict_proba(row).map(|p| p[1]))
            .collect()
    }

    pub fn assess(&self, record: &ApplicantRecord, kind: ModelKind) -> Result<Assessment> {
        let mut out = self.assess_many(std::slice::from_ref(record), kind)?;
        out.pop()
            .ok_or_else(|| PipelineError::shape_mismatch("no prediction produced"))
    }

    /// Score records independently; the first failure aborts the whole call.
    pub fn assess_many(&self, records: &[ApplicantRecord], kind: ModelKind) -> Result<Vec<Assessment>> {
        let width = self.bundle.feature_columns.len();
        let mut flat = Vec::with_capacity(records.len() * width);
        let mut derived = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let (vector, d) = self.encode(record).map_err(|e| at_row(e, i, records.len()))?;
            flat.extend_from_slice(vector.as_slice());
            derived.push(d);
        }
        let encoded = Array2::from_shape_vec((records.len(), width), flat)
            .map_err(|e| PipelineError::shape_mismatch(e.to_string()))?;

        let probabilities = self.default_probabilities(encoded.view(), kind)?;
        let threshold = self.bundle.threshold(kind);
        let scored_at = Utc::now();

        probabilities
            .into_iter()
            .zip(derived)
            .enumerate()
            .map(|(i, (p, d))| {
                let result = self
                    .engine
                    .classify(p, threshold)
                    .map_err(|e| at_row(e, i, records.len()))?;
                debug!(
                    model = %kind,
                    grade = %d.loan_grade,
                    loan_percent_income = d.loan_percent_income,
                    default_probability = result.default_probability,
                    predicted_class = result.predicted_class,
                    band = %result.risk_band,
                    "applicant scored"
                );
                Ok(Assessment {
                    model: kind,
                    threshold,
                    derived: d,
                    result,
                    scored_at,
                })
            })
            .collect()
    }
}

fn at_row(e: PipelineError, index: usize, total: usize) -> PipelineError {
    if total > 1 {
        e.context(format!("row {}", index + 1))
    } else {
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IncomePolicy;
    use crate::error::ErrorKind;
    use crate::features::{columns, sample_record, LabelEncoder};
    use crate::model::{DecisionTree, Scaler};
    use crate::risk::RiskBand;
    use approx::assert_abs_diff_eq;
    use std::collections::BTreeMap;

    /// Bundle whose tree always answers `pct` percent default.
    fn bundle_with_probability(pct: f64) -> ModelBundle {
        let feature_columns: Vec<String> = [
            columns::PERSON_AGE,
            columns::PERSON_INCOME,
            columns::PERSON_HOME_OWNERSHIP,
            columns::LOAN_GRADE,
            columns::LOAN_PERCENT_INCOME,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let mut model = DecisionTree::constant(feature_columns.len(), pct / 100.0);
        model.value = vec![[100.0 - pct, pct]];
        ModelBundle {
            model,
            lr_model: None,
            scaler: Scaler::Standard {
                mean: vec![0.0; feature_columns.len()],
                scale: vec![1.0; feature_columns.len()],
            },
            encoders: BTreeMap::from([(
                columns::PERSON_HOME_OWNERSHIP.to_string(),
                LabelEncoder::new(["MORTGAGE", "OTHER", "OWN", "RENT"]),
            )]),
            feature_columns,
            dt_threshold: 0.35,
            lr_threshold: 0.35,
            dataset_info: Default::default(),
            dt_metrics: Default::default(),
            lr_metrics: Default::default(),
            fingerprint: None,
        }
    }

    #[test]
    fn reference_applicant_end_to_end() {
        let bundle = bundle_with_probability(42.0);
        let pipeline = InferencePipeline::new(&bundle, &PolicyConfig::default()).unwrap();
        let a = pipeline.assess(&sample_record(), ModelKind::DecisionTree).unwrap();

        assert_eq!(a.derived.loan_percent_income, 0.2);
        assert_abs_diff_eq!(a.derived.risk_proxy_score, 37.0, epsilon = 1e-9);
        assert_eq!(a.derived.loan_grade.code(), 2);
        assert_abs_diff_eq!(a.result.default_probability, 0.42, epsilon = 1e-12);
        assert_eq!(a.result.predicted_class, 1);
        assert_eq!(a.result.risk_band, RiskBand::Medium);
        assert_abs_diff_eq!(a.result.confidence, 0.58, epsilon = 1e-12);
        assert_eq!(a.threshold, 0.35);
        assert_eq!(a.probability_percent(), 42);
    }

    #[test]
    fn encoded_vector_matches_bundle_order() {
        let bundle = bundle_with_probability(10.0);
        let pipeline = InferencePipeline::new(&bundle, &PolicyConfig::default()).unwrap();
        let (v, _) = pipeline.encode(&sample_record()).unwrap();
        assert_eq!(v.values, vec![30.0, 50_000.0, 3.0, 2.0, 0.2]);
    }

    #[test]
    fn stored_threshold_not_midpoint() {
        let mut bundle = bundle_with_probability(45.0);
        bundle.dt_threshold = 0.5;
        let pipeline = InferencePipeline::new(&bundle, &PolicyConfig::default()).unwrap();
        let a = pipeline.assess(&sample_record(), ModelKind::DecisionTree).unwrap();
        assert_eq!(a.result.predicted_class, 0);
        bundle.dt_threshold = 0.4;
        let pipeline = InferencePipeline::new(&bundle, &PolicyConfig::default()).unwrap();
        let a = pipeline.assess(&sample_record(), ModelKind::DecisionTree).unwrap();
        assert_eq!(a.result.predicted_class, 1);
    }

    #[test]
    fn logistic_requested_but_absent() {
        let bundle = bundle_with_probability(42.0);
        let pipeline = InferencePipeline::new(&bundle, &PolicyConfig::default()).unwrap();
        let err = pipeline
            .assess(&sample_record(), ModelKind::LogisticRegression)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
    }

    #[test]
    fn strict_policy_aborts_whole_batch_naming_row() {
        let bundle = bundle_with_probability(42.0);
        let policy = PolicyConfig {
            income_policy: IncomePolicy::Strict,
            ..Default::default()
        };
        let pipeline = InferencePipeline::new(&bundle, &policy).unwrap();
        let mut broke = sample_record();
        broke.annual_income = 0.0;
        let err = pipeline
            .assess_many(&[sample_record(), broke], ModelKind::DecisionTree)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateDivision);
        assert!(err.message().starts_with("row 2"));
    }

    #[test]
    fn scaler_shape_mismatch_surfaces() {
        let mut bundle = bundle_with_probability(42.0);
        bundle.scaler = Scaler::Standard {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        let err = InferencePipeline::new(&bundle, &PolicyConfig::default()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn uneven_scaler_parameters_rejected_not_panicking() {
        let mut bundle = bundle_with_probability(42.0);
        bundle.scaler = Scaler::Standard {
            mean: vec![0.0; 5],
            scale: vec![1.0],
        };
        let err = InferencePipeline::new(&bundle, &PolicyConfig::default()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ArtifactInvalid);
    }

    #[test]
    fn hand_built_tree_checked_before_scoring() {
        let mut bundle = bundle_with_probability(42.0);
        bundle.model.children_left = vec![1];
        let err = InferencePipeline::new(&bundle, &PolicyConfig::default()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ArtifactInvalid);
    }

    #[test]
    fn invalid_bands_rejected_up_front() {
        let bundle = bundle_with_probability(42.0);
        let mut policy = PolicyConfig::default();
        policy.risk_bands.low_below = 0.9;
        assert!(InferencePipeline::new(&bundle, &policy).is_err());
    }

    #[test]
    fn empty_batch_is_empty() {
        let bundle = bundle_with_probability(42.0);
        let pipeline = InferencePipeline::new(&bundle, &PolicyConfig::default()).unwrap();
        assert!(pipeline.assess_many(&[], ModelKind::DecisionTree).unwrap().is_empty());
    }
}
