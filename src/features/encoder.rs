//! Fitted label encoder: a category's code is its index in the trained class list.

use serde::{Deserialize, Serialize};

/// Code used for any value outside the trained vocabulary.
pub const FALLBACK_CODE: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Trained code for `value`, if it was seen during fitting.
    pub fn code_of(&self, value: &str) -> Option<i64> {
        self.classes
            .iter()
            .position(|c| c == value)
            .map(|i| i as i64)
    }

    /// Encode, mapping unknown values to [`FALLBACK_CODE`]. Note this collides with the
    /// class whose trained code is 0.
    pub fn encode(&self, value: &str) -> i64 {
        match self.code_of(value) {
            Some(code) => code,
            None => {
                tracing::warn!(value, "unknown category; encoding as 0");
                FALLBACK_CODE
            }
        }
    }
}
