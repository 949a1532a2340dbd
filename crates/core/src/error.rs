//! Initialization errors
//!
//! Every error here is fatal for the run: field initialization happens once,
//! before time stepping, and a failure leaves nothing worth recovering. The
//! library returns the error to the setup code instead of aborting the process.

use std::path::PathBuf;
use thiserror::Error;

/// Initialization result type
pub type Result<T> = std::result::Result<T, InitError>;

/// Errors raised while building or applying the field initializer
#[derive(Debug, Error)]
pub enum InitError {
    /// Missing, mistyped or inconsistent configuration
    #[error("invalid configuration [{}]: {reason}", .keys.join(", "))]
    ConfigValidation { keys: Vec<String>, reason: String },

    /// Velocity timetable file is missing or unreadable
    #[error("cannot find input file: {}", .path.display())]
    TimetableUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Velocity timetable was readable but its record could not be parsed
    #[error("malformed velocity timetable {}: {reason}", .path.display())]
    TimetableMalformed { path: PathBuf, reason: String },

    /// Grid geometry that cannot describe a cell-centered mesh
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),

    /// Field views do not match the requested region or each other
    #[error("field layout mismatch: {0}")]
    FieldLayout(String),
}

impl InitError {
    /// Configuration error attributed to a single key
    pub fn config(key: &str, reason: impl Into<String>) -> Self {
        InitError::ConfigValidation {
            keys: vec![key.to_string()],
            reason: reason.into(),
        }
    }
}
