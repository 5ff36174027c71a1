//! Hard failures of the core.
//!
//! Most data problems (no identifier match, ambiguous crosswalk rows, missing
//! optional columns, malformed industry codes) are *not* errors: they thin the
//! output and are reported through counters and `tracing` events instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("`{input}` is not a CAS registry number (expected NNNNNNN-NN-N)")]
    InvalidCasrn { input: String },

    #[error("no chemical identifier in `{file_name}` (pattern `{pattern}`)")]
    IdentifierNotInFilename { file_name: String, pattern: String },

    #[error("invalid filename pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
