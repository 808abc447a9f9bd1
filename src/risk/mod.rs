//! Thresholding and risk banding of a predicted default probability.

mod engine;

pub use engine::{PredictionResult, RiskBand, RiskEngine};
