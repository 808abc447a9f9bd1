//! Applicant features: raw record, derived fields, categorical encoding, model-ordered vector.

mod applicant;
mod derived;
mod encoder;
mod pipeline;

pub use applicant::{ApplicantRecord, HOME_OWNERSHIP, LOAN_INTENT, PRIOR_DEFAULT};
pub use derived::{loan_percent_income, risk_proxy_score, DerivedFeatures, LoanGrade};
pub use encoder::{LabelEncoder, FALLBACK_CODE};
pub use pipeline::{FeatureExtractor, RawValue};

#[cfg(test)]
pub(crate) use applicant::sample_record;

/// Raw field names as the training data spelled them.
pub mod columns {
    pub const PERSON_AGE: &str = "person_age";
    pub const PERSON_INCOME: &str = "person_income($)";
    pub const PERSON_HOME_OWNERSHIP: &str = "person_home_ownership";
    pub const PERSON_EMP_LENGTH: &str = "person_emp_length";
    pub const LOAN_INTENT: &str = "loan_intent";
    pub const LOAN_GRADE: &str = "loan_grade";
    pub const LOAN_AMNT: &str = "loan_amnt($)";
    pub const LOAN_INT_RATE: &str = "loan_int_rate";
    pub const LOAN_PERCENT_INCOME: &str = "loan_percent_income";
    pub const CB_DEFAULT_ON_FILE: &str = "cb_person_default_on_file";
    pub const CB_CRED_HIST_LENGTH: &str = "cb_person_cred_hist_length";
    pub const PERSON_INCOME_PLAIN: &str = "person_income";
    pub const LOAN_AMNT_PLAIN: &str = "loan_amnt";
}

/// Model-ordered numeric input: one value per bundle feature column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
