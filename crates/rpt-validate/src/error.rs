use rpt_model::ModelError;
use thiserror::Error;

/// The check could not run. Findings are reported as failure records, never
/// as errors.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("{check} needs at least one key column")]
    NoKeys { check: &'static str },

    #[error("xref_integrity compares {left} left-hand keys with {right} right-hand keys")]
    KeyCountMismatch { left: usize, right: usize },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ValidateError>;
