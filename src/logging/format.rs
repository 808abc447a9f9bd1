//! Log setup (tracing to stderr) and one-JSON-object-per-line prediction output (stdout).

use crate::pipeline::Assessment;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Flat record of one prediction, suitable for ndjson output and audit.
#[derive(Debug, Serialize)]
pub struct PredictionLog<'a> {
    pub ts: String,
    pub model: &'a str,
    pub default_probability: f64,
    pub predicted_class: u8,
    pub verdict: &'a str,
    pub risk_band: &'a str,
    pub confidence: f64,
    pub threshold: f64,
    pub loan_percent_income: f64,
    pub loan_grade: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_sha256: Option<&'a str>,
}

impl<'a> PredictionLog<'a> {
    pub fn new(a: &'a Assessment, bundle_sha256: Option<&'a str>) -> Self {
        Self {
            ts: a.scored_at.to_rfc3339(),
            model: a.model.label(),
            default_probability: a.result.default_probability,
            predicted_class: a.result.predicted_class,
            verdict: a.verdict(),
            risk_band: a.band_label(),
            confidence: a.result.confidence,
            threshold: a.threshold,
            loan_percent_income: a.derived.loan_percent_income,
            loan_grade: a.derived.loan_grade.to_string(),
            bundle_sha256,
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber on stderr, level from RUST_LOG or `default_level`.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(fmt).init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    /// Write one JSON object as a single line, bypassing tracing.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}
