//! Recommendation rendering errors.
//!
//! A render error never aborts a scan: the offending finding is withheld
//! from the report and listed as a caveat instead.

use super::error_code::{self, AuditErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Recommendation for {subject} does not start with an action verb")]
    MissingActionVerb { subject: String },

    #[error("Recommendation for {subject} states no risk of inaction")]
    MissingRisk { subject: String },

    #[error("Recommendation for {subject} is not a single sentence")]
    NotOneSentence { subject: String },
}

impl AuditErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        error_code::RENDER_ERROR
    }
}
