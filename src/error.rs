//! Error types for the almanac engine.

use thiserror::Error;

/// Errors that can occur in almanac operations.
///
/// Expansion itself never returns an error: inside [`crate::expand`] a corrupt
/// series degrades to zero instances. The only raising path is explicit rule
/// validation, used when a caller is authoring a rule and must be told it is
/// wrong.
#[derive(Error, Debug)]
pub enum AlmanacError {
    #[error("Invalid recurrence rule: {message}")]
    InvalidRrule { message: String },
}

impl AlmanacError {
    /// HTTP status the collaborating request layer should map this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            AlmanacError::InvalidRrule { .. } => 422,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AlmanacError::InvalidRrule { .. } => "INVALID_RRULE",
        }
    }
}

/// Result type alias for almanac operations.
pub type AlmanacResult<T> = Result<T, AlmanacError>;
