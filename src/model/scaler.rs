//! Fitted numeric scaler. Transforms a rows × features matrix column-wise.

use crate::error::{PipelineError, Result};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `(x - data_min) / data_range * (hi - lo) + lo`
    MinMax {
        data_min: Vec<f64>,
        data_range: Vec<f64>,
        #[serde(default = "unit_range")]
        feature_range: (f64, f64),
    },
}

fn unit_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Zero spread means a constant column; leave it unscaled.
fn nonzero(v: f64) -> f64 {
    if v == 0.0 {
        1.0
    } else {
        v
    }
}

impl Scaler {
    pub fn name(&self) -> &'static str {
        match self {
            Scaler::Standard { .. } => "StandardScaler",
            Scaler::MinMax { .. } => "MinMaxScaler",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { data_min, .. } => data_min.len(),
        }
    }

    /// Internal consistency of the fitted parameters.
    pub fn validate(&self) -> Result<()> {
        let (a, b) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax {
                data_min,
                data_range,
                ..
            } => (data_min, data_range),
        };
        if a.len() != b.len() {
            return Err(PipelineError::artifact_invalid(format!(
                "{}: parameter lengths differ ({} vs {})",
                self.name(),
                a.len(),
                b.len()
            )));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::artifact_invalid(format!(
                "{}: non-finite parameter",
                self.name()
            )));
        }
        Ok(())
    }

    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.validate()?;
        if x.ncols() != self.n_features() {
            return Err(PipelineError::shape_mismatch(format!(
                "X has {} features, but {} is expecting {} features as input",
                x.ncols(),
                self.name(),
                self.n_features()
            )));
        }
        let mut out = x.to_owned();
        for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            match self {
                Scaler::Standard { mean, scale } => {
                    let (m, s) = (mean[j], nonzero(scale[j]));
                    col.mapv_inplace(|v| (v - m) / s);
                }
                Scaler::MinMax {
                    data_min,
                    data_range,
                    feature_range: (lo, hi),
                } => {
                    let (m, r) = (data_min[j], nonzero(data_range[j]));
                    let (lo, hi) = (*lo, *hi);
                    col.mapv_inplace(|v| (v - m) / r * (hi - lo) + lo);
                }
            }
        }
        Ok(out)
    }
}
