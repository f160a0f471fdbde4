//! # Embergen Schema
//!
//! Data model for the Ember engine's `extension_api.json` description.
//!
//! This crate provides:
//! - Serde structures matching the schema's wire format exactly
//! - Parse entry points for strings and files
//! - A structural validation pass over cross-references

pub mod error;
pub mod model;
pub mod validation;

pub use error::ParseError;
pub use model::ApiDescription;

/// Parses an API description from JSON text.
///
/// # Errors
/// Returns `ParseError` if the JSON is malformed or a required key is absent.
pub fn parse_api(json: &str) -> Result<ApiDescription, ParseError> {
    Ok(serde_json::from_str(json)?)
}

/// Parses an API description from a file.
///
/// # Errors
/// Returns `ParseError` if reading or decoding fails.
pub fn parse_api_file(path: &std::path::Path) -> Result<ApiDescription, ParseError> {
    let json = std::fs::read_to_string(path)?;
    parse_api(&json)
}
