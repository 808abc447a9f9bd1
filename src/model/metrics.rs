//! Descriptive statistics shipped with the bundle. Display-only; never used for inference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetInfo {
    pub total_samples: u64,
    pub train_samples: u64,
    pub test_samples: u64,
    pub n_features: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(alias = "f1-score")]
    pub f1_score: f64,
    pub support: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetrics {
    pub test_accuracy: f64,
    pub roc_auc: f64,
    /// `[[tn, fp], [fn, tp]]`
    pub confusion_matrix: Option<[[u64; 2]; 2]>,
    pub class_metrics: BTreeMap<String, ClassMetrics>,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    /// Decision tree only
    pub feature_importance: BTreeMap<String, f64>,
    /// Logistic regression only
    pub feature_coefficients: BTreeMap<String, f64>,
}

/// One row of a "what drives this model" listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    pub feature: String,
    pub weight: f64,
    /// Share of the largest weight magnitude in the listing, 0..=1
    pub relative: f64,
    /// Direction for signed coefficients; `None` for importances
    pub raises_risk: Option<bool>,
}

impl ModelMetrics {
    pub fn is_empty(&self) -> bool {
        *self == ModelMetrics::default()
    }

    /// Metrics of the positive ("default") class, keyed by a label containing `1`.
    pub fn default_class(&self) -> Option<&ClassMetrics> {
        self.class_metrics
            .iter()
            .find(|(k, _)| k.contains('1'))
            .map(|(_, v)| v)
    }

    pub fn good_class(&self) -> Option<&ClassMetrics> {
        self.class_metrics
            .iter()
            .find(|(k, _)| k.contains('0'))
            .map(|(_, v)| v)
    }

    /// Rows of the classification report in display order. Averages are listed only when
    /// the bundle carries them.
    pub fn classification_report(&self) -> Vec<(&'static str, &ClassMetrics)> {
        let absent = ClassMetrics::default();
        let mut rows = Vec::with_capacity(4);
        if let Some(c) = self.good_class() {
            rows.push(("Good Loan (0)", c));
        }
        if let Some(c) = self.default_class() {
            rows.push(("Default (1)", c));
        }
        for (label, c) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            if *c != absent {
                rows.push((label, c));
            }
        }
        rows
    }

    /// Top `n` drivers: importances descending, or coefficients by magnitude when the
    /// model carries no importances.
    pub fn top_drivers(&self, n: usize) -> Vec<Driver> {
        let signed = self.feature_importance.is_empty();
        let source = if signed {
            &self.feature_coefficients
        } else {
            &self.feature_importance
        };
        let mut ranked: Vec<(&String, f64)> = source.iter().map(|(k, v)| (k, *v)).collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked.truncate(n);

        let max = ranked.first().map(|(_, v)| v.abs()).unwrap_or(0.0);
        ranked
            .into_iter()
            .map(|(name, w)| Driver {
                feature: name.clone(),
                weight: w,
                relative: if max > 0.0 { w.abs() / max } else { 0.0 },
                raises_risk: signed.then_some(w > 0.0),
            })
            .collect()
    }
}
