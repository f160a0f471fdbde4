//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
///
/// Only the variants here abort a run; every recoverable condition is a
/// skip-with-log inside the generators instead.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Schema parsing error.
    #[error("schema parse error: {0}")]
    Parse(#[from] embergen_schema::ParseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A referenced type token did not resolve.
    #[error("unknown type '{type_name}' referenced by '{context}'")]
    UnknownType {
        /// The unresolved type token.
        type_name: String,
        /// Owning type and member, for diagnostics.
        context: String,
    },

    /// The requested build configuration is absent from the size tables.
    #[error("build configuration '{name}' not present in the schema's size tables")]
    UnknownBuildConfiguration {
        /// Requested configuration name.
        name: String,
    },

    /// Code generation error.
    #[error("generation error: {message}")]
    Generation {
        /// Error message.
        message: String,
    },
}

impl CodegenError {
    /// Creates an unknown type error.
    pub fn unknown_type(type_name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
            context: context.into(),
        }
    }

    /// Creates a generation error with the given message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }
}
