//! Error types for schema parsing and validation.

use thiserror::Error;

/// Error type for schema parsing operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON decoding error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A class inherits from a base that is not declared anywhere.
    #[error("class '{class}' inherits from unknown base class '{base}'")]
    UnknownBaseClass {
        /// Class name.
        class: String,
        /// Missing base class name.
        base: String,
    },
}

impl ParseError {
    /// Creates an unknown base class error.
    pub fn unknown_base(class: impl Into<String>, base: impl Into<String>) -> Self {
        Self::UnknownBaseClass {
            class: class.into(),
            base: base.into(),
        }
    }
}
