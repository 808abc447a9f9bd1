//! Features computed from the record rather than supplied: loan-to-income ratio and loan grade.

use crate::config::IncomePolicy;
use crate::error::{ErrorKind, PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Proxy score upper bounds (inclusive) for grades A..F; anything higher is G.
const GRADE_BREAKS: [f64; 6] = [25.0, 35.0, 45.0, 55.0, 65.0, 75.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanGrade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl LoanGrade {
    const ALL: [LoanGrade; 7] = [
        LoanGrade::A,
        LoanGrade::B,
        LoanGrade::C,
        LoanGrade::D,
        LoanGrade::E,
        LoanGrade::F,
        LoanGrade::G,
    ];

    /// Bucket a risk-proxy score. Breakpoints are inclusive on the upper side.
    pub fn from_score(score: f64) -> Self {
        GRADE_BREAKS
            .iter()
            .position(|&upper| score <= upper)
            .map(|i| Self::ALL[i])
            .unwrap_or(LoanGrade::G)
    }

    /// Ordinal model input, A=0 .. G=6
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn letter(&self) -> char {
        (b'A' + self.code()) as char
    }
}

impl fmt::Display for LoanGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

pub fn loan_percent_income(loan_amount: f64, annual_income: f64, policy: IncomePolicy) -> Result<f64> {
    match policy {
        IncomePolicy::Guarded => {
            if annual_income <= 0.0 {
                Ok(0.0)
            } else {
                Ok(round4(loan_amount / annual_income))
            }
        }
        IncomePolicy::Strict => {
            if annual_income == 0.0 {
                return Err(PipelineError::new(
                    ErrorKind::DegenerateDivision,
                    "loan_percent_income: annual income is zero",
                ));
            }
            Ok(loan_amount / annual_income)
        }
    }
}

/// `2 * rate + 100 * loan_percent_income - credit_history_years`
pub fn risk_proxy_score(interest_rate: f64, loan_percent_income: f64, credit_history_years: f64) -> f64 {
    interest_rate * 2.0 + loan_percent_income * 100.0 - credit_history_years
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub loan_percent_income: f64,
    pub risk_proxy_score: f64,
    pub loan_grade: LoanGrade,
}

impl DerivedFeatures {
    pub fn compute(
        loan_amount: f64,
        annual_income: f64,
        interest_rate: f64,
        credit_history_years: f64,
        policy: IncomePolicy,
    ) -> Result<Self> {
        let lpi = loan_percent_income(loan_amount, annual_income, policy)?;
        let score = risk_proxy_score(interest_rate, lpi, credit_history_years);
        Ok(Self {
            loan_percent_income: lpi,
            risk_proxy_score: score,
            loan_grade: LoanGrade::from_score(score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_rounds_to_four_places() {
        assert_eq!(loan_percent_income(10_000.0, 50_000.0, IncomePolicy::Guarded).unwrap(), 0.2);
        assert_eq!(loan_percent_income(1_000.0, 30_000.0, IncomePolicy::Guarded).unwrap(), 0.0333);
    }

    #[test]
    fn zero_income_guarded() {
        assert_eq!(loan_percent_income(10_000.0, 0.0, IncomePolicy::Guarded).unwrap(), 0.0);
        assert_eq!(loan_percent_income(10_000.0, -5.0, IncomePolicy::Guarded).unwrap(), 0.0);
    }

    #[test]
    fn zero_income_strict_fails() {
        let err = loan_percent_income(10_000.0, 0.0, IncomePolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateDivision);
    }

    #[test]
    fn strict_does_not_round() {
        let v = loan_percent_income(1_000.0, 30_000.0, IncomePolicy::Strict).unwrap();
        assert_eq!(v, 1_000.0 / 30_000.0);
    }

    #[test]
    fn grade_buckets() {
        assert_eq!(LoanGrade::from_score(20.0), LoanGrade::A);
        assert_eq!(LoanGrade::from_score(25.0), LoanGrade::A);
        assert_eq!(LoanGrade::from_score(25.0001), LoanGrade::B);
        assert_eq!(LoanGrade::from_score(37.0), LoanGrade::C);
        assert_eq!(LoanGrade::from_score(75.0), LoanGrade::F);
        assert_eq!(LoanGrade::from_score(80.0), LoanGrade::G);
        assert_eq!(LoanGrade::from_score(-40.0), LoanGrade::A);
    }

    #[test]
    fn grade_codes() {
        assert_eq!(LoanGrade::A.code(), 0);
        assert_eq!(LoanGrade::G.code(), 6);
        assert_eq!(LoanGrade::C.letter(), 'C');
        assert_eq!(LoanGrade::E.to_string(), "E");
    }

    #[test]
    fn derived_for_reference_applicant() {
        let d = DerivedFeatures::compute(10_000.0, 50_000.0, 11.0, 5.0, IncomePolicy::Guarded).unwrap();
        assert_eq!(d.loan_percent_income, 0.2);
        assert!((d.risk_proxy_score - 37.0).abs() < 1e-9);
        assert_eq!(d.loan_grade, LoanGrade::C);
    }
}
