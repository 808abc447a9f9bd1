//! Decision tree stored as parallel node arrays. Node 0 is the root; a node is a leaf
//! when its left child is -1. Internal nodes send `x[feature] <= threshold` left.

use super::{check_width, Classifier};
use crate::error::{PipelineError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

const LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights `[good, default]`; normalized at the leaf
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    /// Single-leaf tree that always returns the given default probability.
    pub fn constant(n_features: usize, p_default: f64) -> Self {
        Self {
            n_features,
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![[1.0 - p_default, p_default]],
        }
    }

    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    /// Structural checks. Children must point forward so traversal always terminates.
    pub fn validate(&self) -> Result<()> {
        let n = self.node_count();
        if n == 0 {
            return Err(PipelineError::artifact_invalid("decision tree has no nodes"));
        }
        let lens = [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ];
        if lens.iter().any(|&l| l != n) {
            return Err(PipelineError::artifact_invalid(format!(
                "decision tree node arrays differ in length ({n} vs {lens:?})"
            )));
        }
        for i in 0..n {
            if self.is_leaf(i) {
                let [a, b] = self.value[i];
                if !(a.is_finite() && b.is_finite() && a >= 0.0 && b >= 0.0 && a + b > 0.0) {
                    return Err(PipelineError::artifact_invalid(format!(
                        "decision tree leaf {i} has invalid class weights {:?}",
                        self.value[i]
                    )));
                }
                continue;
            }
            for child in [self.children_left[i], self.children_right[i]] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(PipelineError::artifact_invalid(format!(
                        "decision tree node {i} has out-of-order child {child}"
                    )));
                }
            }
            let f = self.feature[i];
            if f < 0 || f as usize >= self.n_features {
                return Err(PipelineError::artifact_invalid(format!(
                    "decision tree node {i} splits on feature {f}, model has {}",
                    self.n_features
                )));
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. Every step moves to a higher node index, so a tree
    /// that passed [`validate`](Self::validate) finishes within `node_count` steps; anything
    /// else is reported rather than indexed blindly.
    fn leaf_for(&self, x: ArrayView1<'_, f64>) -> Result<usize> {
        let corrupt = |node: usize| {
            PipelineError::artifact_invalid(format!("decision tree is malformed at node {node}"))
        };
        let mut node = 0usize;
        for _ in 0..=self.node_count() {
            let left = *self.children_left.get(node).ok_or_else(|| corrupt(node))?;
            if left == LEAF {
                return Ok(node);
            }
            let f = usize::try_from(self.feature.get(node).copied().unwrap_or(-1))
                .map_err(|_| corrupt(node))?;
            let v = *x.get(f).ok_or_else(|| corrupt(node))?;
            let t = *self.threshold.get(node).ok_or_else(|| corrupt(node))?;
            let next = if v <= t {
                left
            } else {
                *self.children_right.get(node).ok_or_else(|| corrupt(node))?
            };
            node = usize::try_from(next).map_err(|_| corrupt(node))?;
        }
        Err(corrupt(node))
    }
}

impl Classifier for DecisionTree {
    fn name(&self) -> &'static str {
        "DecisionTreeClassifier"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<[f64; 2]> {
        check_width(self, x.len())?;
        let leaf = self.leaf_for(x)?;
        let [good, bad] = *self.value.get(leaf).ok_or_else(|| {
            PipelineError::artifact_invalid(format!("decision tree leaf {leaf} has no class weights"))
        })?;
        let total = good + bad;
        if !(total > 0.0) {
            return Err(PipelineError::artifact_invalid(format!(
                "decision tree leaf {leaf} has invalid class weights {:?}",
                [good, bad]
            )));
        }
        Ok([good / total, bad / total])
    }
}
