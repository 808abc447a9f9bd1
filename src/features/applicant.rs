//! Raw applicant record as collected by the form or a batch row.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

pub const HOME_OWNERSHIP: [&str; 4] = ["RENT", "OWN", "MORTGAGE", "OTHER"];

pub const LOAN_INTENT: [&str; 6] = [
    "PERSONAL",
    "EDUCATION",
    "MEDICAL",
    "VENTURE",
    "HOMEIMPROVEMENT",
    "DEBTCONSOLIDATION",
];

pub const PRIOR_DEFAULT: [&str; 2] = ["N", "Y"];

/// Inclusive numeric bounds accepted by the interactive form.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn contains(&self, v: f64) -> bool {
        v.is_finite() && v >= self.min && v <= self.max
    }
}

const AGE: Bounds = Bounds::new(18.0, 100.0);
const EMP_LENGTH: Bounds = Bounds::new(0.0, 60.0);
const INCOME: Bounds = Bounds::new(0.0, f64::MAX);
const LOAN_AMOUNT: Bounds = Bounds::new(500.0, f64::MAX);
const INTEREST_RATE: Bounds = Bounds::new(5.0, 25.0);
const CREDIT_HISTORY: Bounds = Bounds::new(2.0, 30.0);

/// One loan application. Categorical fields are kept as text so values outside the
/// trained vocabulary reach the encoders unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: f64,
    pub annual_income: f64,
    pub home_ownership: String,
    pub employment_years: f64,
    pub loan_intent: String,
    pub loan_amount: f64,
    /// Percent, e.g. 11.0 for 11%
    pub interest_rate: f64,
    pub prior_default: String,
    pub credit_history_years: f64,
}

impl ApplicantRecord {
    /// Check every field against the form bounds and vocabularies.
    pub fn validate(&self) -> Result<()> {
        check_range("age", self.age, AGE)?;
        check_range("annual income", self.annual_income, INCOME)?;
        check_range("employment length", self.employment_years, EMP_LENGTH)?;
        check_range("loan amount", self.loan_amount, LOAN_AMOUNT)?;
        check_range("interest rate", self.interest_rate, INTEREST_RATE)?;
        check_range("credit history length", self.credit_history_years, CREDIT_HISTORY)?;
        check_vocab("home ownership", &self.home_ownership, &HOME_OWNERSHIP)?;
        check_vocab("loan intent", &self.loan_intent, &LOAN_INTENT)?;
        check_vocab("prior default", &self.prior_default, &PRIOR_DEFAULT)?;
        Ok(())
    }
}

fn check_range(field: &str, value: f64, bounds: Bounds) -> Result<()> {
    if bounds.contains(value) {
        return Ok(());
    }
    let msg = if bounds.max == f64::MAX {
        format!("{field} must be at least {} (got {value})", bounds.min)
    } else {
        format!(
            "{field} must be between {} and {} (got {value})",
            bounds.min, bounds.max
        )
    };
    Err(PipelineError::invalid_input(msg))
}

fn check_vocab(field: &str, value: &str, vocab: &[&str]) -> Result<()> {
    if vocab.contains(&value) {
        Ok(())
    } else {
        Err(PipelineError::invalid_input(format!(
            "{field} must be one of {} (got {value:?})",
            vocab.join(", ")
        )))
    }
}

#[cfg(test)]
pub(crate) fn sample_record() -> ApplicantRecord {
    ApplicantRecord {
        age: 30.0,
        annual_income: 50_000.0,
        home_ownership: "RENT".into(),
        employment_years: 5.0,
        loan_intent: "PERSONAL".into(),
        loan_amount: 10_000.0,
        interest_rate: 11.0,
        prior_default: "N".into(),
        credit_history_years: 5.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn sample_is_valid() {
        assert!(sample_record().validate().is_ok());
    }

    #[test]
    fn out_of_range_age() {
        let mut r = sample_record();
        r.age = 17.0;
        let err = r.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.message().contains("age"));
    }

    #[test]
    fn nan_rejected() {
        let mut r = sample_record();
        r.interest_rate = f64::NAN;
        assert!(r.validate().is_err());
    }

    #[test]
    fn unknown_intent_rejected_by_form() {
        let mut r = sample_record();
        r.loan_intent = "WEDDING".into();
        let err = r.validate().unwrap_err();
        assert!(err.message().contains("loan intent"));
    }

    #[test]
    fn zero_income_is_allowed() {
        let mut r = sample_record();
        r.annual_income = 0.0;
        assert!(r.validate().is_ok());
    }
}
