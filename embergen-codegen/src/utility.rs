//! Global utility-function emission.
//!
//! Utility functions are free functions on the engine side; they are
//! grouped under one namespace struct so call sites read as
//! `Utility::absf(x)`. Resolution and marshaling share the method path;
//! the instance pointer is always null.

use crate::context::GenerationContext;
use crate::error::CodegenError;
use crate::methods::{generate_method, MethodKind};
use crate::printer::Printer;

/// Emits the utility namespace with every resolvable function.
///
/// # Errors
/// Fatal on unresolvable type tokens outside the per-method skip rules.
pub fn generate_utilities(ctx: &GenerationContext, p: &mut Printer) -> Result<(), CodegenError> {
    let mut resolvers = Printer::new();
    let mut body = Printer::new();
    for method in &ctx.api.utility_functions {
        generate_method(ctx, MethodKind::Utility, method, &mut resolvers, &mut body)?;
    }
    p.line(resolvers.as_str());
    p.line("/// Engine utility functions.");
    p.line("pub struct Utility;");
    p.blank();
    p.block("impl Utility", |p| {
        p.line(body.as_str());
    });
    p.blank();
    Ok(())
}
