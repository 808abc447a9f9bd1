//! Batch scoring of a CSV table. Each row goes through the same per-applicant transform;
//! nothing is written unless every row scores.

use crate::error::{PipelineError, Result};
use crate::features::{columns, ApplicantRecord};
use crate::model::ModelKind;
use crate::pipeline::{Assessment, InferencePipeline};
use crate::risk::RiskBand;
use csv::StringRecord;
use serde::Serialize;
use std::io::{Read, Write};
use tracing::info;

pub const PROBABILITY_COLUMN: &str = "Default_Probability";
pub const RISK_COLUMN: &str = "Risk_Category";

pub const DEFAULT_PROBABILITY_CAP: f64 = 0.9999;

/// Input columns, each with the names accepted for it.
const FIELDS: [(&str, &[&str]); 9] = [
    ("age", &[columns::PERSON_AGE]),
    ("income", &[columns::PERSON_INCOME, columns::PERSON_INCOME_PLAIN]),
    ("home_ownership", &[columns::PERSON_HOME_OWNERSHIP]),
    ("emp_length", &[columns::PERSON_EMP_LENGTH]),
    ("intent", &[columns::LOAN_INTENT]),
    ("amount", &[columns::LOAN_AMNT, columns::LOAN_AMNT_PLAIN]),
    ("rate", &[columns::LOAN_INT_RATE]),
    ("prior_default", &[columns::CB_DEFAULT_ON_FILE]),
    ("credit_history", &[columns::CB_CRED_HIST_LENGTH]),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub predicted_defaults: usize,
    pub mean_probability: f64,
}

impl BatchSummary {
    fn from_assessments(assessments: &[Assessment]) -> Self {
        let mut s = BatchSummary {
            rows: assessments.len(),
            ..Default::default()
        };
        let mut total = 0.0;
        for a in assessments {
            match a.result.risk_band {
                RiskBand::Low => s.low += 1,
                RiskBand::Medium => s.medium += 1,
                RiskBand::High => s.high += 1,
            }
            if a.result.is_default() {
                s.predicted_defaults += 1;
            }
            total += a.result.default_probability;
        }
        if s.rows > 0 {
            s.mean_probability = total / s.rows as f64;
        }
        s
    }
}

/// Header positions of the input fields, in `FIELDS` order.
struct ColumnIndex([usize; 9]);

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let mut idx = [0usize; 9];
        for (slot, (_, names)) in idx.iter_mut().zip(FIELDS.iter()) {
            *slot = names
                .iter()
                .find_map(|n| headers.iter().position(|h| h.trim() == *n))
                .ok_or_else(|| {
                    PipelineError::invalid_input(format!("missing column {:?}", names[0]))
                })?;
        }
        Ok(Self(idx))
    }

    fn text<'r>(&self, record: &'r StringRecord, field: usize) -> &'r str {
        record.get(self.0[field]).unwrap_or("").trim()
    }

    fn number(&self, record: &StringRecord, field: usize) -> Result<f64> {
        let raw = self.text(record, field);
        raw.parse::<f64>().map_err(|_| {
            PipelineError::invalid_input(format!(
                "column {:?}: {raw:?} is not a number",
                FIELDS[field].1[0]
            ))
        })
    }

    fn applicant(&self, record: &StringRecord) -> Result<ApplicantRecord> {
        Ok(ApplicantRecord {
            age: self.number(record, 0)?,
            annual_income: self.number(record, 1)?,
            home_ownership: self.text(record, 2).to_string(),
            employment_years: self.number(record, 3)?,
            loan_intent: self.text(record, 4).to_string(),
            loan_amount: self.number(record, 5)?,
            interest_rate: self.number(record, 6)?,
            prior_default: self.text(record, 7).to_string(),
            credit_history_years: self.number(record, 8)?,
        })
    }
}

pub struct BatchScorer<'p, 'b> {
    pipeline: &'p InferencePipeline<'b>,
    model: ModelKind,
    probability_cap: f64,
}

impl<'p, 'b> BatchScorer<'p, 'b> {
    pub fn new(pipeline: &'p InferencePipeline<'b>, model: ModelKind) -> Self {
        Self {
            pipeline,
            model,
            probability_cap: DEFAULT_PROBABILITY_CAP,
        }
    }

    pub fn with_probability_cap(mut self, cap: f64) -> Self {
        self.probability_cap = cap;
        self
    }

    /// Parse the table into applicant records. Rows are numbered from 1, header excluded.
    pub fn read<R: Read>(&self, input: R) -> Result<(StringRecord, Vec<StringRecord>, Vec<ApplicantRecord>)> {
        let mut rdr = csv::Reader::from_reader(input);
        let headers = rdr.headers()?.clone();
        let index = ColumnIndex::resolve(&headers)?;

        let mut rows = Vec::new();
        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row.map_err(|e| PipelineError::from(e).context(format!("row {}", i + 1)))?;
            records.push(index.applicant(&row).map_err(|e| e.context(format!("row {}", i + 1)))?);
            rows.push(row);
        }
        Ok((headers, rows, records))
    }

    /// Score every row and write the table back with probability and risk columns appended.
    pub fn score_csv<R: Read, W: Write>(&self, input: R, output: W) -> Result<BatchSummary> {
        let (headers, rows, records) = self.read(input)?;
        let assessments = self.pipeline.assess_many(&records, self.model)?;

        let mut wtr = csv::Writer::from_writer(output);
        let mut out_headers = headers.clone();
        out_headers.push_field(PROBABILITY_COLUMN);
        out_headers.push_field(RISK_COLUMN);
        wtr.write_record(&out_headers)?;

        for (row, a) in rows.iter().zip(&assessments) {
            let mut out = row.clone();
            let shown = a.result.default_probability.min(self.probability_cap);
            out.push_field(&format!("{shown:.4}"));
            out.push_field(a.band_label());
            wtr.write_record(&out)?;
        }
        wtr.flush()?;

        let summary = BatchSummary::from_assessments(&assessments);
        info!(
            model = %self.model,
            rows = summary.rows,
            low = summary.low,
            medium = summary.medium,
            high = summary.high,
            predicted_defaults = summary.predicted_defaults,
            mean_probability = summary.mean_probability,
            "batch scored"
        );
        Ok(summary)
    }
}
