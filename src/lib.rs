//! CreditIQ — credit-risk inference over a pre-trained model bundle.
//!
//! Modular structure:
//! - [`features`] — Applicant record, derived features, categorical encoding
//! - [`model`] — Bundle loading, scaler, decision tree and logistic regression
//! - [`risk`] — Decision threshold and risk banding
//! - [`pipeline`] — Encode → scale → predict → threshold → band
//! - [`batch`] — CSV batch scoring
//! - [`logging`] — Structured logging

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod risk;
pub mod pipeline;
pub mod batch;
pub mod logging;

pub use config::AppConfig;
pub use error::{ErrorKind, PipelineError};
pub use features::{ApplicantRecord, FeatureVector, FeatureExtractor};
pub use model::{ModelBundle, ModelKind};
pub use risk::{PredictionResult, RiskBand, RiskEngine};
pub use pipeline::{Assessment, InferencePipeline};
pub use batch::{BatchScorer, BatchSummary};
pub use logging::StructuredLogger;
