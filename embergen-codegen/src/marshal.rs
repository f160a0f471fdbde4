//! Argument marshaling plans for emitted native calls.
//!
//! Every native call site needs the addresses of all its arguments alive at
//! once. The emitted shape is flat: one named local binding per argument
//! that needs a copy or conversion, then a single `[*const c_void; N]`
//! array built from the bindings, then the call. Vararg calls use a `Vec`
//! with the boxed tail appended.

use crate::context::{GenerationContext, TypeRepr};
use crate::naming::escape_ident;
use crate::printer::Printer;

/// How one argument reaches the native side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgStrategy {
    /// Value struct or primitive: address of the parameter itself.
    Direct,
    /// Enum, flag set or narrow integer: copied into a local 64-bit
    /// scalar first.
    CopiedScalar,
    /// Class-represented builtin: address of its content storage.
    ContentPointer,
    /// Typed collection: address of the backing array's content.
    CollectionContent,
    /// Object class: the handle, copied into a local pointer.
    HandlePointer,
    /// Vararg tail element, boxed through Variant.
    VariantBoxed,
}

/// One planned argument: the local binding (if any) plus the address
/// expression that lands in the pointer array.
#[derive(Debug, Clone)]
pub struct PlannedArg {
    pub name: String,
    pub strategy: ArgStrategy,
    binding: Option<String>,
    address: String,
}

impl PlannedArg {
    /// The address expression for the pointer array.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Plans how one declared argument is marshaled.
#[must_use]
pub fn plan_argument(
    ctx: &GenerationContext,
    arg_name: &str,
    token: &str,
    meta: Option<&str>,
    optional: bool,
) -> PlannedArg {
    let name = escape_ident(arg_name);
    let local = format!("arg_{arg_name}");

    if token.starts_with("typedarray::") {
        return PlannedArg {
            address: format!("{}.array_content_ptr()", name_expr(&name)),
            binding: None,
            strategy: ArgStrategy::CollectionContent,
            name,
        };
    }
    if token.starts_with("enum::") {
        return PlannedArg {
            address: format!("&{local} as *const _ as *const c_void"),
            binding: Some(format!("let {local}: i64 = {}.raw();", name_expr(&name))),
            strategy: ArgStrategy::CopiedScalar,
            name,
        };
    }
    if token.starts_with("bitfield::") {
        return PlannedArg {
            address: format!("&{local} as *const _ as *const c_void"),
            binding: Some(format!("let {local}: u64 = {}.0;", name_expr(&name))),
            strategy: ArgStrategy::CopiedScalar,
            name,
        };
    }
    // The native side reads integer arguments at full width; a narrow
    // meta-tagged parameter widens into a local before its address is
    // taken.
    if token == "int" && meta.is_some_and(is_narrow_int_meta) {
        return PlannedArg {
            address: format!("&{local} as *const _ as *const c_void"),
            binding: Some(format!(
                "let {local}: i64 = i64::from({});",
                name_expr(&name)
            )),
            strategy: ArgStrategy::CopiedScalar,
            name,
        };
    }

    match token {
        "int" | "float" | "bool" | "void*" => PlannedArg {
            address: format!("&{} as *const _ as *const c_void", name_expr(&name)),
            binding: None,
            strategy: ArgStrategy::Direct,
            name,
        },
        "String" | "StringName" | "NodePath" | "Array" | "Dictionary" | "Callable" | "Signal"
        | "Variant" | "RID" => PlannedArg {
            address: format!("{}.content_ptr()", name_expr(&name)),
            binding: None,
            strategy: ArgStrategy::ContentPointer,
            name,
        },
        other if ctx.is_object_class(other) => {
            let binding = if optional {
                format!(
                    "let {local}: *mut c_void = {}.map_or(std::ptr::null_mut(), |o| o.handle());",
                    name_expr(&name)
                )
            } else {
                format!("let {local}: *mut c_void = {}.handle();", name_expr(&name))
            };
            PlannedArg {
                address: format!("&{local} as *const _ as *const c_void"),
                binding: Some(binding),
                strategy: ArgStrategy::HandlePointer,
                name,
            }
        }
        other if ctx.classify(other) == TypeRepr::Value => PlannedArg {
            address: format!("&{} as *const _ as *const c_void", name_expr(&name)),
            binding: None,
            strategy: ArgStrategy::Direct,
            name,
        },
        _ => PlannedArg {
            address: format!("{}.content_ptr()", name_expr(&name)),
            binding: None,
            strategy: ArgStrategy::ContentPointer,
            name,
        },
    }
}

fn is_narrow_int_meta(meta: &str) -> bool {
    matches!(
        meta,
        "int8" | "int16" | "int32" | "uint8" | "uint16" | "uint32" | "char16" | "char32"
    )
}

fn name_expr(name: &str) -> String {
    name.to_string()
}

/// Plans one mandatory argument of a vararg call. Vararg call forms pass
/// every argument boxed through Variant, mandatory ones included.
#[must_use]
pub fn plan_boxed_argument(arg_name: &str) -> PlannedArg {
    let name = escape_ident(arg_name);
    let local = format!("arg_{arg_name}");
    PlannedArg {
        address: format!("{local}.content_ptr()"),
        binding: Some(format!("let {local} = Variant::from({name});")),
        strategy: ArgStrategy::VariantBoxed,
        name,
    }
}

/// Emits the local bindings for a planned argument list.
pub fn emit_bindings(p: &mut Printer, planned: &[PlannedArg]) {
    for arg in planned {
        if let Some(binding) = &arg.binding {
            p.line(binding);
        }
    }
}

/// Emits the flat pointer array for a fixed-arity call.
pub fn emit_pointer_array(p: &mut Printer, planned: &[PlannedArg]) {
    if planned.is_empty() {
        p.line("let call_args: [*const c_void; 0] = [];");
        return;
    }
    p.line(&format!(
        "let call_args: [*const c_void; {}] = [",
        planned.len()
    ));
    for arg in planned {
        p.line(&format!("    {},", arg.address));
    }
    p.line("];");
}

/// Emits the pointer vector for a vararg call: mandatory arguments first,
/// then the boxed tail; the native count is `mandatory + tail.len()`.
pub fn emit_vararg_vector(p: &mut Printer, planned: &[PlannedArg], tail_name: &str) {
    p.line(&format!(
        "let mut call_args: Vec<*const c_void> = Vec::with_capacity({} + {tail_name}.len());",
        planned.len()
    ));
    for arg in planned {
        p.line(&format!("call_args.push({});", arg.address));
    }
    p.block(&format!("for v in {tail_name}"), |p| {
        p.line("call_args.push(v.content_ptr());");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::fixture_context;

    #[test]
    fn test_strategies_by_token() {
        let ctx = fixture_context();
        let plan = |token| plan_argument(&ctx, "a", token, None, false).strategy;
        assert_eq!(plan("Vector2"), ArgStrategy::Direct);
        assert_eq!(plan("int"), ArgStrategy::Direct);
        assert_eq!(plan("enum::Side"), ArgStrategy::CopiedScalar);
        assert_eq!(plan("bitfield::MethodFlags"), ArgStrategy::CopiedScalar);
        assert_eq!(plan("String"), ArgStrategy::ContentPointer);
        assert_eq!(plan("StringName"), ArgStrategy::ContentPointer);
        assert_eq!(plan("typedarray::Vector2"), ArgStrategy::CollectionContent);
        assert_eq!(plan("Node"), ArgStrategy::HandlePointer);
    }

    #[test]
    fn test_bindings_precede_single_flat_array() {
        let ctx = fixture_context();
        let planned = vec![
            plan_argument(&ctx, "mode", "enum::Side", None, false),
            plan_argument(&ctx, "target", "Node", None, false),
            plan_argument(&ctx, "position", "Vector2", None, false),
        ];
        let mut p = Printer::new();
        emit_bindings(&mut p, &planned);
        emit_pointer_array(&mut p, &planned);
        let out = p.finish();

        // Every binding appears before the array, and the array holds one
        // address per argument.
        let array_at = out.find("let call_args: [*const c_void; 3]").expect("array");
        let mode_at = out.find("let arg_mode: i64 = mode.raw();").expect("mode local");
        let target_at = out
            .find("let arg_target: *mut c_void = target.handle();")
            .expect("target local");
        assert!(mode_at < array_at);
        assert!(target_at < array_at);
        assert!(out.contains("&arg_mode as *const _ as *const c_void,"));
        assert!(out.contains("&arg_target as *const _ as *const c_void,"));
        assert!(out.contains("&position as *const _ as *const c_void,"));
    }

    #[test]
    fn test_narrow_int_widened_before_address_taken() {
        let ctx = fixture_context();
        let planned = plan_argument(&ctx, "flags", "int", Some("uint32"), false);
        assert_eq!(planned.strategy, ArgStrategy::CopiedScalar);
        let mut p = Printer::new();
        emit_bindings(&mut p, std::slice::from_ref(&planned));
        emit_pointer_array(&mut p, std::slice::from_ref(&planned));
        let out = p.finish();
        assert!(out.contains("let arg_flags: i64 = i64::from(flags);"));
        assert!(out.contains("&arg_flags as *const _ as *const c_void,"));
        assert!(!out.contains("&flags as *const _ as *const c_void"));
        // Full-width metas need no copy.
        assert_eq!(
            plan_argument(&ctx, "id", "int", Some("uint64"), false).strategy,
            ArgStrategy::Direct
        );
        assert_eq!(
            plan_argument(&ctx, "id", "int", Some("int64"), false).strategy,
            ArgStrategy::Direct
        );
    }

    #[test]
    fn test_optional_object_nil_checked() {
        let ctx = fixture_context();
        let planned = plan_argument(&ctx, "parent", "Node", None, true);
        let mut p = Printer::new();
        emit_bindings(&mut p, std::slice::from_ref(&planned));
        assert!(p
            .as_str()
            .contains("parent.map_or(std::ptr::null_mut(), |o| o.handle());"));
    }

    #[test]
    fn test_vararg_vector_appends_boxed_tail() {
        let ctx = fixture_context();
        let planned = vec![
            plan_argument(&ctx, "method", "StringName", None, false),
            plan_argument(&ctx, "flags", "int", None, false),
        ];
        let mut p = Printer::new();
        emit_vararg_vector(&mut p, &planned, "varargs");
        let out = p.finish();
        assert!(out.contains("Vec::with_capacity(2 + varargs.len());"));
        assert!(out.contains("call_args.push(method.content_ptr());"));
        assert!(out.contains("call_args.push(v.content_ptr());"));
    }

    #[test]
    fn test_empty_argument_list_still_binds_array() {
        let mut p = Printer::new();
        emit_pointer_array(&mut p, &[]);
        assert!(p.as_str().contains("let call_args: [*const c_void; 0] = [];"));
    }
}
