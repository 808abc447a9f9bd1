//! Feature extraction: record → derived fields → named raw values → encoded vector in bundle order.

use super::columns::*;
use super::{ApplicantRecord, DerivedFeatures, FeatureVector, LabelEncoder};
use crate::config::IncomePolicy;
use crate::error::{PipelineError, Result};
use std::collections::BTreeMap;

/// A raw field before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue<'a> {
    Number(f64),
    Text(&'a str),
}

pub struct FeatureExtractor<'b> {
    columns: &'b [String],
    encoders: &'b BTreeMap<String, LabelEncoder>,
    income_policy: IncomePolicy,
}

impl<'b> FeatureExtractor<'b> {
    pub fn new(
        columns: &'b [String],
        encoders: &'b BTreeMap<String, LabelEncoder>,
        income_policy: IncomePolicy,
    ) -> Self {
        Self {
            columns,
            encoders,
            income_policy,
        }
    }

    /// Build the encoded, model-ordered vector for one record.
    pub fn extract(&self, record: &ApplicantRecord) -> Result<(FeatureVector, DerivedFeatures)> {
        let derived = DerivedFeatures::compute(
            record.loan_amount,
            record.annual_income,
            record.interest_rate,
            record.credit_history_years,
            self.income_policy,
        )?;
        let raw = raw_fields(record, &derived);

        let mut values = Vec::with_capacity(self.columns.len());
        for col in self.columns {
            let value = raw.get(col.as_str()).ok_or_else(|| {
                PipelineError::shape_mismatch(format!(
                    "feature column {col:?} is not produced from an applicant record"
                ))
            })?;
            values.push(self.encode(col, value)?);
        }
        Ok((FeatureVector { values }, derived))
    }

    fn encode(&self, column: &str, value: &RawValue<'_>) -> Result<f64> {
        match (self.encoders.get(column), value) {
            (Some(enc), RawValue::Text(s)) => Ok(enc.encode(s) as f64),
            (Some(enc), RawValue::Number(n)) => Ok(enc.encode(&n.to_string()) as f64),
            (None, RawValue::Number(n)) => Ok(*n),
            (None, RawValue::Text(s)) => Err(PipelineError::shape_mismatch(format!(
                "feature column {column:?} is categorical ({s:?}) but the bundle has no encoder for it"
            ))),
        }
    }
}

/// Every named field the training data could have used, aliases included.
pub(crate) fn raw_fields<'r>(
    record: &'r ApplicantRecord,
    derived: &DerivedFeatures,
) -> BTreeMap<&'static str, RawValue<'r>> {
    use RawValue::{Number, Text};
    BTreeMap::from([
        (PERSON_AGE, Number(record.age)),
        (PERSON_INCOME, Number(record.annual_income)),
        (PERSON_HOME_OWNERSHIP, Text(record.home_ownership.as_str())),
        (PERSON_EMP_LENGTH, Number(record.employment_years)),
        (LOAN_INTENT, Text(record.loan_intent.as_str())),
        (LOAN_GRADE, Number(f64::from(derived.loan_grade.code()))),
        (LOAN_AMNT, Number(record.loan_amount)),
        (LOAN_INT_RATE, Number(record.interest_rate)),
        (LOAN_PERCENT_INCOME, Number(derived.loan_percent_income)),
        (CB_DEFAULT_ON_FILE, Text(record.prior_default.as_str())),
        (CB_CRED_HIST_LENGTH, Number(record.credit_history_years)),
        (PERSON_INCOME_PLAIN, Number(record.annual_income)),
        (LOAN_AMNT_PLAIN, Number(record.loan_amount)),
    ])
}
