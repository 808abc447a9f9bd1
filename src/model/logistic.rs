//! Binary logistic regression: `P(default) = sigmoid(coef · x + intercept)`.

use super::{check_width, Classifier};
use crate::error::{PipelineError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<()> {
        if self.coef.is_empty() {
            return Err(PipelineError::artifact_invalid("logistic regression has no coefficients"));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err(PipelineError::artifact_invalid(
                "logistic regression has a non-finite parameter",
            ));
        }
        Ok(())
    }

    pub fn decision_function(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.coef
            .iter()
            .zip(x.iter())
            .fold(self.intercept, |acc, (w, v)| acc + w * v)
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "LogisticRegression"
    }

    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<[f64; 2]> {
        check_width(self, x.len())?;
        let p = sigmoid(self.decision_function(x));
        Ok([1.0 - p, p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn zero_logit_is_half() {
        let m = LogisticRegression {
            coef: vec![1.0, -1.0],
            intercept: 0.0,
        };
        let p = m.predict_proba(array![2.0, 2.0].view()).unwrap();
        assert_abs_diff_eq!(p[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let m = LogisticRegression {
            coef: vec![0.8, 1.2, -0.3],
            intercept: -0.5,
        };
        let p = m.predict_proba(array![1.0, 0.5, 2.0].view()).unwrap();
        assert_abs_diff_eq!(m.decision_function(array![1.0, 0.5, 2.0].view()), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 1.0 / (1.0 + (-0.3f64).exp()), epsilon = 1e-12);
        assert_abs_diff_eq!(p[0] + p[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn extreme_logits_stay_in_range() {
        let m = LogisticRegression {
            coef: vec![1.0],
            intercept: 0.0,
        };
        let hi = m.predict_proba(array![1e6].view()).unwrap();
        let lo = m.predict_proba(array![-1e6].view()).unwrap();
        assert_eq!(hi[1], 1.0);
        assert_eq!(lo[1], 0.0);
    }

    #[test]
    fn non_finite_rejected() {
        let m = LogisticRegression {
            coef: vec![f64::NAN],
            intercept: 0.0,
        };
        assert!(m.validate().is_err());
    }
}
