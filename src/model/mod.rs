//! Fitted model artifacts: classifiers, scaler, metrics, and the bundle that carries them.

mod bundle;
mod logistic;
mod metrics;
mod scaler;
mod tree;

pub use bundle::ModelBundle;
pub use logistic::LogisticRegression;
pub use metrics::{ClassMetrics, DatasetInfo, Driver, ModelMetrics};
pub use scaler::Scaler;
pub use tree::DecisionTree;

use crate::error::{PipelineError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fitted binary classifier over scaled feature rows.
pub trait Classifier: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of input features the model was fit with
    fn n_features(&self) -> usize;

    /// `[P(class 0), P(class 1)]` for one scaled row.
    fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<[f64; 2]>;
}

fn check_width(model: &dyn Classifier, got: usize) -> Result<()> {
    if got != model.n_features() {
        return Err(PipelineError::shape_mismatch(format!(
            "X has {} features, but {} is expecting {} features as input",
            got,
            model.name(),
            model.n_features()
        )));
    }
    Ok(())
}

/// Which classifier in the bundle to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    DecisionTree,
    LogisticRegression,
}

impl ModelKind {
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::LogisticRegression => "Logistic Regression",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dt" | "tree" | "decision_tree" | "decision-tree" => Ok(ModelKind::DecisionTree),
            "lr" | "logistic" | "logistic_regression" | "logistic-regression" => {
                Ok(ModelKind::LogisticRegression)
            }
            other => Err(PipelineError::invalid_input(format!(
                "unknown model {other:?} (expected dt or lr)"
            ))),
        }
    }
}
