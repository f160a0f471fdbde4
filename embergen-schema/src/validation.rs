//! Structural validation for a parsed API description.
//!
//! The generator trusts the schema's semantics; validation only checks the
//! cross-references that would otherwise surface as confusing failures deep
//! inside code generation.

use std::collections::HashSet;

use crate::error::ParseError;
use crate::model::ApiDescription;

/// Validates cross-references in a parsed API description.
///
/// # Errors
/// Returns `ParseError` if a class inherits from an undeclared base.
pub fn validate(api: &ApiDescription) -> Result<(), ParseError> {
    let class_names: HashSet<&str> = api.classes.iter().map(|c| c.name.as_str()).collect();

    for class in &api.classes {
        if let Some(base) = &class.inherits {
            if !class_names.contains(base.as_str()) {
                return Err(ParseError::unknown_base(&class.name, base));
            }
        }
    }

    Ok(())
}
