//! Rust bindings generation from the Ember extension API schema.
//!
//! The pipeline is two-phase: the schema is parsed and folded into an
//! immutable [`context::GenerationContext`], then each category of output
//! (core definitions, builtin value types, object classes, utility
//! functions, native structures) is emitted independently against that
//! shared state. Fatal conditions surface as [`CodegenError`]; everything
//! recoverable is a logged skip.
//!
//! # Example
//!
//! ```no_run
//! use embergen_codegen::{generate_from_file, GeneratorSettings};
//!
//! let files = generate_from_file(
//!     std::path::Path::new("extension_api.json"),
//!     &GeneratorSettings::default(),
//! )?;
//! for file in files {
//!     println!("{} ({} bytes)", file.name, file.contents.len());
//! }
//! # Ok::<(), embergen_codegen::CodegenError>(())
//! ```

pub mod builtins;
pub mod classes;
pub mod classify;
pub mod context;
pub mod defaults;
pub mod enums;
pub mod error;
pub mod generator;
pub mod marshal;
pub mod methods;
pub mod naming;
pub mod native_structs;
pub mod printer;
pub mod utility;
pub mod virtuals;

pub use context::GenerationContext;
pub use error::CodegenError;
pub use generator::{GeneratedFile, GeneratedUnit, Generator, GeneratorSettings};

use std::path::Path;

use embergen_schema::model::ApiDescription;

/// Generates bindings from an already-parsed schema.
///
/// # Errors
/// Fatal schema or type-resolution errors abort the run.
pub fn generate(
    api: ApiDescription,
    settings: &GeneratorSettings,
) -> Result<Vec<GeneratedFile>, CodegenError> {
    Generator::new(api, settings)?.run()
}

/// Parses a schema file and generates bindings from it.
///
/// # Errors
/// Fatal on IO, parse, or type-resolution errors.
pub fn generate_from_file(
    path: &Path,
    settings: &GeneratorSettings,
) -> Result<Vec<GeneratedFile>, CodegenError> {
    let api = embergen_schema::parse_api_file(path)?;
    generate(api, settings)
}
