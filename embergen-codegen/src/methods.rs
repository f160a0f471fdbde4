//! Method-binding emission, shared between object classes, builtin types
//! and utility functions.
//!
//! Every hashed callable gets a lazily-resolved, process-lifetime cached
//! binding accessor plus a typed wrapper around the native call. Hash-less
//! class methods are pure-virtual declaration points: no resolver is
//! emitted, and the base body returns the type-appropriate default so an
//! un-overridden subclass still behaves.

use embergen_schema::model::{ArgumentDef, MethodDef};
use tracing::warn;

use crate::classify::{is_pointer_token, map_type, CtxKind};
use crate::context::{GenerationContext, TypeRepr};
use crate::defaults::translate_default;
use crate::error::CodegenError;
use crate::marshal::{
    emit_bindings, emit_pointer_array, emit_vararg_vector, plan_argument, plan_boxed_argument,
    PlannedArg,
};
use crate::naming::{escape_ident, type_name_to_screaming};
use crate::printer::Printer;

/// Which kind of owner a method hangs off; drives resolver lookup and the
/// receiver shape.
#[derive(Debug, Clone, Copy)]
pub enum MethodKind<'a> {
    /// Method on an object class.
    Class { class: &'a str },
    /// Method on a builtin value type.
    Builtin { builtin: &'a str },
    /// Global utility function.
    Utility,
}

impl MethodKind<'_> {
    fn owner(&self) -> &str {
        match self {
            Self::Class { class } => class,
            Self::Builtin { builtin } => builtin,
            Self::Utility => "@utility",
        }
    }
}

/// Methods whose results are routinely discarded at call sites; these skip
/// the `#[must_use]` the other value-returning wrappers get.
const DISCARDABLE_RESULTS: &[(&str, &str)] = &[
    ("Object", "emit_signal"),
    ("Node", "rpc"),
    ("Node", "rpc_id"),
    ("RefCounted", "reference"),
    ("RefCounted", "unreference"),
    ("Array", "resize"),
    ("PackedByteArray", "resize"),
];

/// How the native call's result comes back to Rust.
#[derive(Debug, Clone)]
enum RetPlan {
    Unit,
    /// Plain scalar written into a local.
    Scalar { rust_ty: String, zero: String },
    /// i64 decoded into an emitted enum.
    Enum { rust_ty: String },
    /// u64 wrapped into a flag set.
    Flags { rust_ty: String },
    /// Value struct written in place.
    Struct { rust_ty: String },
    /// Class-represented builtin constructed from raw content post-call.
    Boxed { rust_ty: String },
    /// Object handle, nil-checked into an Option.
    Object { rust_ty: String },
}

impl RetPlan {
    fn rust_type_text(&self) -> Option<String> {
        match self {
            Self::Unit => None,
            Self::Scalar { rust_ty, .. }
            | Self::Enum { rust_ty }
            | Self::Flags { rust_ty }
            | Self::Struct { rust_ty }
            | Self::Boxed { rust_ty } => Some(rust_ty.clone()),
            Self::Object { rust_ty } => Some(format!("Option<{rust_ty}>")),
        }
    }
}

fn plan_return(
    ctx: &GenerationContext,
    method: &MethodDef,
    where_: &str,
) -> Result<RetPlan, CodegenError> {
    let Some((token, meta)) = method.return_info() else {
        return Ok(RetPlan::Unit);
    };
    if token.starts_with("enum::") {
        let rust_ty = map_type(ctx, token, meta, CtxKind::Return, where_)?;
        return Ok(RetPlan::Enum { rust_ty });
    }
    if token.starts_with("bitfield::") {
        let rust_ty = map_type(ctx, token, meta, CtxKind::Return, where_)?;
        return Ok(RetPlan::Flags { rust_ty });
    }
    if token.starts_with("typedarray::") {
        let rust_ty = map_type(ctx, token, meta, CtxKind::Return, where_)?;
        return Ok(RetPlan::Boxed { rust_ty });
    }
    let rust_ty = map_type(ctx, token, meta, CtxKind::Return, where_)?;
    Ok(match token {
        "void" | "Nil" | "" => RetPlan::Unit,
        "int" => RetPlan::Scalar {
            zero: "0".to_string(),
            rust_ty,
        },
        "float" => RetPlan::Scalar {
            zero: "0.0".to_string(),
            rust_ty,
        },
        "bool" => RetPlan::Scalar {
            zero: "false".to_string(),
            rust_ty,
        },
        "void*" => RetPlan::Scalar {
            zero: "std::ptr::null_mut()".to_string(),
            rust_ty,
        },
        other if ctx.is_object_class(other) => RetPlan::Object { rust_ty },
        other if ctx.classify(other) == TypeRepr::Value => RetPlan::Struct { rust_ty },
        _ => RetPlan::Boxed { rust_ty },
    })
}

/// Rust parameter text for one declared argument. Objects with a `null`
/// default become optional references.
fn rust_param(
    ctx: &GenerationContext,
    arg: &ArgumentDef,
    where_: &str,
) -> Result<String, CodegenError> {
    let ident = escape_ident(&arg.name);
    let base = map_type(ctx, &arg.ty, arg.meta.as_deref(), CtxKind::Argument, where_)?;
    let text = if ctx.is_object_class(&arg.ty) {
        if arg.default_value.as_deref() == Some("null") {
            format!("Option<&{base}>")
        } else {
            format!("&{base}")
        }
    } else if arg.ty.starts_with("typedarray::") {
        format!("&{base}")
    } else {
        match arg.ty.as_str() {
            "String" | "StringName" | "NodePath" | "Array" | "Dictionary" | "Callable"
            | "Signal" | "Variant" => format!("&{base}"),
            _ => base,
        }
    };
    Ok(format!("{ident}: {text}"))
}

/// Default-value expression for an un-overridden virtual body.
fn default_return_expr(plan: &RetPlan) -> Option<String> {
    match plan {
        RetPlan::Unit => None,
        RetPlan::Scalar { zero, .. } => Some(zero.clone()),
        RetPlan::Enum { rust_ty } => Some(format!(
            "{rust_ty}::from_raw(0).unwrap_or_else(|| panic!(\"enum has no zero case\"))"
        )),
        RetPlan::Flags { rust_ty } => Some(format!("{rust_ty}::default()")),
        RetPlan::Struct { rust_ty } | RetPlan::Boxed { rust_ty } => {
            Some(format!("{rust_ty}::default()"))
        }
        RetPlan::Object { .. } => Some("None".to_string()),
    }
}

/// Resolver accessor name for a method binding.
#[must_use]
pub fn resolver_name(owner: &str, method: &str) -> String {
    format!("{}_{}_bind", owner.to_ascii_lowercase(), method)
}

/// True when the method touches an unexpressible raw-pointer shape.
fn has_unsupported_pointer(method: &MethodDef) -> bool {
    let ret_bad = method
        .return_info()
        .is_some_and(|(t, _)| is_pointer_token(t) && t != "void*");
    let arg_bad = method
        .args()
        .iter()
        .any(|a| is_pointer_token(&a.ty) && a.ty != "void*");
    ret_bad || arg_bad
}

/// Emits one method: the resolver accessor into `resolvers`, the typed
/// wrapper into `body` (inside the owner's `impl` block).
///
/// Returns `Ok(false)` when the method was skipped.
///
/// # Errors
/// Fatal on unresolvable type tokens outside the pointer-skip rule.
pub fn generate_method(
    ctx: &GenerationContext,
    kind: MethodKind<'_>,
    method: &MethodDef,
    resolvers: &mut Printer,
    body: &mut Printer,
) -> Result<bool, CodegenError> {
    generate_method_vis(ctx, kind, method, "pub", resolvers, body)
}

/// Like [`generate_method`] but with an explicit visibility, used for
/// accessor methods that a property wrapper supersedes.
pub fn generate_method_vis(
    ctx: &GenerationContext,
    kind: MethodKind<'_>,
    method: &MethodDef,
    vis: &str,
    resolvers: &mut Printer,
    body: &mut Printer,
) -> Result<bool, CodegenError> {
    let owner = kind.owner();
    let where_ = format!("{owner}.{}", method.name);

    if has_unsupported_pointer(method) {
        warn!(owner, method = %method.name, "unsupported pointer shape, skipping method");
        return Ok(false);
    }

    let ret = plan_return(ctx, method, &where_)?;

    // Hash-less class methods are declaration points for overrides, not
    // callable bindings.
    if matches!(kind, MethodKind::Class { .. }) && method.hash.is_none() {
        generate_virtual_declaration(ctx, method, &ret, &where_, body)?;
        return Ok(true);
    }
    let Some(hash) = method.hash else {
        warn!(owner, method = %method.name, "non-class method without hash, skipping");
        return Ok(false);
    };

    emit_resolver(kind, method, hash, resolvers);
    emit_wrapper(ctx, kind, method, &ret, &where_, vis, body)?;
    Ok(true)
}

fn emit_resolver(kind: MethodKind<'_>, method: &MethodDef, hash: i64, p: &mut Printer) {
    let lookup = match kind {
        MethodKind::Class { class } => format!(
            "sys().class_method_bind(\"{class}\", \"{}\", {hash})",
            method.name
        ),
        MethodKind::Builtin { builtin } => format!(
            "sys().builtin_method_bind(VariantKind::{}, \"{}\", {hash})",
            type_name_to_screaming(builtin),
            method.name
        ),
        MethodKind::Utility => {
            format!("sys().utility_function(\"{}\", {hash})", method.name)
        }
    };
    let owner = match kind {
        MethodKind::Class { class } => class,
        MethodKind::Builtin { builtin } => builtin,
        MethodKind::Utility => "utility",
    };
    p.block(
        &format!("fn {}() -> *mut c_void", resolver_name(owner, &method.name)),
        |p| {
            p.line("static CELL: OnceLock<usize> = OnceLock::new();");
            p.line(&format!("*CELL.get_or_init(|| {lookup} as usize) as *mut c_void"));
        },
    );
    p.blank();
}

fn signature(
    ctx: &GenerationContext,
    kind: MethodKind<'_>,
    method: &MethodDef,
    ret: &RetPlan,
    where_: &str,
    vis: &str,
) -> Result<String, CodegenError> {
    let mut params: Vec<String> = Vec::new();
    match kind {
        MethodKind::Utility => {}
        MethodKind::Class { .. } if method.is_static => {}
        MethodKind::Builtin { .. } if method.is_static => {}
        MethodKind::Class { .. } => params.push("&self".to_string()),
        MethodKind::Builtin { .. } => {
            params.push(if method.is_const {
                "&self".to_string()
            } else {
                "&mut self".to_string()
            });
        }
    }
    for arg in method.args() {
        params.push(rust_param(ctx, arg, where_)?);
    }
    if method.is_vararg {
        params.push("varargs: &[Variant]".to_string());
    }
    let ret_text = match ret.rust_type_text() {
        Some(t) => format!(" -> {t}"),
        None => String::new(),
    };
    Ok(format!(
        "{vis} fn {}({}){ret_text}",
        escape_ident(&method.name),
        params.join(", ")
    ))
}

fn generate_virtual_declaration(
    ctx: &GenerationContext,
    method: &MethodDef,
    ret: &RetPlan,
    where_: &str,
    body: &mut Printer,
) -> Result<(), CodegenError> {
    body.line("/// Overridable. The base implementation does nothing and");
    body.line("/// returns the default value; it is never dispatched natively.");
    let sig = {
        let mut params: Vec<String> = vec![if method.is_const {
            "&self".to_string()
        } else {
            "&mut self".to_string()
        }];
        for arg in method.args() {
            params.push(rust_param(ctx, arg, where_)?);
        }
        let ret_text = match ret.rust_type_text() {
            Some(t) => format!(" -> {t}"),
            None => String::new(),
        };
        format!(
            "pub fn {}({}){ret_text}",
            escape_ident(&method.name),
            params.join(", ")
        )
    };
    body.block(&sig, |p| {
        for arg in method.args() {
            p.line(&format!("let _ = {};", escape_ident(&arg.name)));
        }
        if let Some(expr) = default_return_expr(ret) {
            p.line(&expr);
        }
    });
    body.blank();
    Ok(())
}

fn emit_wrapper(
    ctx: &GenerationContext,
    kind: MethodKind<'_>,
    method: &MethodDef,
    ret: &RetPlan,
    where_: &str,
    vis: &str,
    body: &mut Printer,
) -> Result<(), CodegenError> {
    // Document the engine-side defaults; Rust has no default arguments.
    for arg in method.args() {
        if let Some(raw) = &arg.default_value {
            if let Some(expr) = translate_default(ctx, &arg.ty, raw, where_) {
                body.line(&format!("/// `{}` defaults to `{expr}`.", arg.name));
            }
        }
    }
    if !matches!(ret, RetPlan::Unit) && !is_discardable(kind.owner(), &method.name) {
        body.line("#[must_use]");
    }
    let sig = signature(ctx, kind, method, ret, where_, vis)?;
    let owner = match kind {
        MethodKind::Class { class } => class,
        MethodKind::Builtin { builtin } => builtin,
        MethodKind::Utility => "utility",
    };
    let bind = resolver_name(owner, &method.name);

    let planned: Vec<PlannedArg> = if method.is_vararg {
        method
            .args()
            .iter()
            .map(|a| plan_boxed_argument(&a.name))
            .collect()
    } else {
        method
            .args()
            .iter()
            .map(|a| {
                plan_argument(
                    ctx,
                    &a.name,
                    &a.ty,
                    a.meta.as_deref(),
                    a.default_value.as_deref() == Some("null"),
                )
            })
            .collect()
    };

    let receiver = receiver_expr(ctx, kind, method);
    body.block(&sig, |p| {
        emit_bindings(p, &planned);
        if method.is_vararg {
            emit_vararg_vector(p, &planned, "varargs");
        } else {
            emit_pointer_array(p, &planned);
        }
        emit_call(kind, method, ret, &bind, &receiver, p);
    });
    body.blank();
    Ok(())
}

/// Static and utility calls pass a null instance; builtin receivers pass
/// the address of self (content storage for class-represented builtins).
fn receiver_expr(ctx: &GenerationContext, kind: MethodKind<'_>, method: &MethodDef) -> String {
    if method.is_static || matches!(kind, MethodKind::Utility) {
        return "std::ptr::null_mut()".to_string();
    }
    match kind {
        MethodKind::Class { .. } => "self.handle()".to_string(),
        MethodKind::Builtin { builtin } => {
            if ctx.is_struct(builtin) {
                "std::ptr::from_ref(self) as *mut c_void".to_string()
            } else {
                "self.content_ptr() as *mut c_void".to_string()
            }
        }
        MethodKind::Utility => unreachable!(),
    }
}

fn emit_call(
    kind: MethodKind<'_>,
    method: &MethodDef,
    ret: &RetPlan,
    bind: &str,
    receiver: &str,
    p: &mut Printer,
) {
    if method.is_vararg {
        // Vararg calls go through the variant call form; the count is
        // mandatory + tail.
        p.line("let mut ret = Variant::nil();");
        let call = match kind {
            MethodKind::Class { .. } => format!(
                "sys().object_method_bind_call({bind}(), {receiver}, call_args.as_ptr(), call_args.len() as i64, ret.content_mut_ptr());"
            ),
            MethodKind::Builtin { .. } => format!(
                "sys().call_builtin_method_variant({bind}(), {receiver}, call_args.as_ptr(), call_args.len() as i64, ret.content_mut_ptr());"
            ),
            MethodKind::Utility => format!(
                "sys().call_utility_function({bind}(), ret.content_mut_ptr(), call_args.as_ptr(), call_args.len() as i64);"
            ),
        };
        p.block("unsafe", |p| {
            p.line(&call);
        });
        match ret {
            RetPlan::Unit => {}
            _ => p.line("FromVariant::from_variant(&ret)"),
        }
        return;
    }

    let (setup, ret_ptr, finish): (Option<String>, String, Option<String>) = match ret {
        RetPlan::Unit => (None, "std::ptr::null_mut()".to_string(), None),
        RetPlan::Scalar { rust_ty, zero } => (
            Some(format!("let mut ret: {rust_ty} = {zero};")),
            "&mut ret as *mut _ as *mut c_void".to_string(),
            Some("ret".to_string()),
        ),
        RetPlan::Enum { rust_ty } => (
            Some("let mut ret_raw: i64 = 0;".to_string()),
            "&mut ret_raw as *mut _ as *mut c_void".to_string(),
            Some(format!(
                "{rust_ty}::from_raw(ret_raw).expect(\"engine returned unknown enum value\")"
            )),
        ),
        RetPlan::Flags { rust_ty } => (
            Some("let mut ret_raw: u64 = 0;".to_string()),
            "&mut ret_raw as *mut _ as *mut c_void".to_string(),
            Some(format!("{rust_ty}(ret_raw)")),
        ),
        RetPlan::Struct { rust_ty } => (
            Some(format!("let mut ret = {rust_ty}::default();")),
            "&mut ret as *mut _ as *mut c_void".to_string(),
            Some("ret".to_string()),
        ),
        RetPlan::Boxed { rust_ty } => (
            Some(format!("let mut ret = {rust_ty}::default();")),
            "ret.content_mut_ptr()".to_string(),
            Some("ret".to_string()),
        ),
        RetPlan::Object { rust_ty } => (
            Some("let mut ret_handle: *mut c_void = std::ptr::null_mut();".to_string()),
            "&mut ret_handle as *mut _ as *mut c_void".to_string(),
            Some(format!(
                "(!ret_handle.is_null()).then(|| {rust_ty}::from_handle(ret_handle))"
            )),
        ),
    };

    if let Some(setup) = setup {
        p.line(&setup);
    }
    let call = match kind {
        MethodKind::Class { .. } => format!(
            "sys().object_method_bind_ptrcall({bind}(), {receiver}, call_args.as_ptr(), {ret_ptr});"
        ),
        MethodKind::Builtin { .. } => format!(
            "sys().call_builtin_method({bind}(), {receiver}, call_args.as_ptr(), {ret_ptr}, {});",
            method.args().len()
        ),
        MethodKind::Utility => format!(
            "sys().call_utility_function({bind}(), {ret_ptr}, call_args.as_ptr(), {});",
            method.args().len()
        ),
    };
    p.block("unsafe", |p| {
        p.line(&call);
    });
    if let Some(finish) = finish {
        p.line(&finish);
    }
}

fn is_discardable(owner: &str, method: &str) -> bool {
    DISCARDABLE_RESULTS
        .iter()
        .any(|(o, m)| *o == owner && *m == method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::fixture_context;

    fn find_class_method<'a>(
        ctx: &'a GenerationContext,
        class: &str,
        method: &str,
    ) -> &'a MethodDef {
        ctx.class_map[class]
            .method_list()
            .iter()
            .find(|m| m.name == method)
            .expect("method present in fixture")
    }

    #[test]
    fn test_hashed_method_emits_resolver_and_wrapper() {
        let ctx = fixture_context();
        let method = find_class_method(&ctx, "Node", "set_name");
        let mut resolvers = Printer::new();
        let mut body = Printer::new();
        let kept = generate_method(
            &ctx,
            MethodKind::Class { class: "Node" },
            method,
            &mut resolvers,
            &mut body,
        )
        .expect("generates");
        assert!(kept);
        let r = resolvers.finish();
        assert!(r.contains("fn node_set_name_bind() -> *mut c_void"));
        assert!(r.contains("static CELL: OnceLock<usize> = OnceLock::new();"));
        assert!(r.contains("sys().class_method_bind(\"Node\", \"set_name\", 83702148)"));
        let b = body.finish();
        assert!(b.contains("pub fn set_name(&self, name: &GString)"));
        assert!(b.contains("object_method_bind_ptrcall(node_set_name_bind(), self.handle()"));
    }

    #[test]
    fn test_hashless_method_is_declaration_point_only() {
        let ctx = fixture_context();
        let method = find_class_method(&ctx, "Node", "_process");
        let mut resolvers = Printer::new();
        let mut body = Printer::new();
        generate_method(
            &ctx,
            MethodKind::Class { class: "Node" },
            method,
            &mut resolvers,
            &mut body,
        )
        .expect("generates");
        // No resolver, no native call; just an overridable default body.
        assert!(resolvers.finish().is_empty());
        let b = body.finish();
        assert!(b.contains("pub fn _process(&mut self, delta: f64)"));
        assert!(!b.contains("bind()"));
        assert!(b.contains("let _ = delta;"));
    }

    #[test]
    fn test_vararg_call_counts_mandatory_plus_tail() {
        let ctx = fixture_context();
        let method = find_class_method(&ctx, "Node", "rpc");
        let mut resolvers = Printer::new();
        let mut body = Printer::new();
        generate_method(
            &ctx,
            MethodKind::Class { class: "Node" },
            method,
            &mut resolvers,
            &mut body,
        )
        .expect("generates");
        let b = body.finish();
        assert!(b.contains("varargs: &[Variant]"));
        assert!(b.contains("Vec::with_capacity(1 + varargs.len());"));
        assert!(b.contains("call_args.len() as i64"));
        assert!(b.contains("object_method_bind_call"));
    }

    #[test]
    fn test_object_return_is_nil_checked_option() {
        let ctx = fixture_context();
        let method = MethodDef {
            name: "get_parent".to_string(),
            return_type: None,
            return_value: Some(embergen_schema::model::ReturnValue {
                ty: "Node".to_string(),
                meta: None,
            }),
            category: None,
            is_const: true,
            is_vararg: false,
            is_static: false,
            is_virtual: false,
            hash: Some(1234),
            arguments: None,
        };
        let mut resolvers = Printer::new();
        let mut body = Printer::new();
        generate_method(
            &ctx,
            MethodKind::Class { class: "Node" },
            &method,
            &mut resolvers,
            &mut body,
        )
        .expect("generates");
        let b = body.finish();
        assert!(b.contains("-> Option<Node>"));
        assert!(b.contains("(!ret_handle.is_null()).then(|| Node::from_handle(ret_handle))"));
    }

    #[test]
    fn test_narrow_int_argument_widened_for_call() {
        let ctx = fixture_context();
        let method = MethodDef {
            name: "set_flags".to_string(),
            return_type: None,
            return_value: None,
            category: None,
            is_const: false,
            is_vararg: false,
            is_static: false,
            is_virtual: false,
            hash: Some(4321),
            arguments: Some(vec![ArgumentDef {
                name: "flags".to_string(),
                ty: "int".to_string(),
                default_value: None,
                meta: Some("uint32".to_string()),
            }]),
        };
        let mut resolvers = Printer::new();
        let mut body = Printer::new();
        generate_method(
            &ctx,
            MethodKind::Class { class: "Object" },
            &method,
            &mut resolvers,
            &mut body,
        )
        .expect("generates");
        let b = body.finish();
        assert!(b.contains("pub fn set_flags(&self, flags: u32)"));
        // The native call reads eight bytes per integer argument; the
        // narrow parameter widens into a local before the array takes
        // its address.
        assert!(b.contains("let arg_flags: i64 = i64::from(flags);"));
        assert!(b.contains("&arg_flags as *const _ as *const c_void,"));
        assert!(!b.contains("&flags as *const _ as *const c_void"));
    }

    #[test]
    fn test_pointer_argument_skips_method() {
        let ctx = fixture_context();
        let method = MethodDef {
            name: "read_raw".to_string(),
            return_type: None,
            return_value: None,
            category: None,
            is_const: false,
            is_vararg: false,
            is_static: false,
            is_virtual: false,
            hash: Some(99),
            arguments: Some(vec![ArgumentDef {
                name: "buf".to_string(),
                ty: "const uint8_t*".to_string(),
                default_value: None,
                meta: None,
            }]),
        };
        let mut resolvers = Printer::new();
        let mut body = Printer::new();
        let kept = generate_method(
            &ctx,
            MethodKind::Class { class: "Node" },
            &method,
            &mut resolvers,
            &mut body,
        )
        .expect("does not abort the run");
        assert!(!kept);
        assert!(body.finish().is_empty());
    }

    #[test]
    fn test_utility_function_passes_null_instance() {
        let ctx = fixture_context();
        let method = ctx
            .api
            .utility_functions
            .iter()
            .find(|m| m.name == "absf")
            .cloned()
            .expect("fixture has absf");
        let mut resolvers = Printer::new();
        let mut body = Printer::new();
        generate_method(&ctx, MethodKind::Utility, &method, &mut resolvers, &mut body)
            .expect("generates");
        let r = resolvers.finish();
        assert!(r.contains("sys().utility_function(\"absf\", 2007)"));
        let b = body.finish();
        assert!(b.contains("pub fn absf(x: f64) -> f64"));
        assert!(b.contains("call_utility_function(utility_absf_bind(), &mut ret as *mut _ as *mut c_void, call_args.as_ptr(), 1);"));
    }

    #[test]
    fn test_builtin_method_binds_by_variant_kind() {
        let ctx = fixture_context();
        let method = ctx.builtin_map["Vector2"]
            .methods
            .as_ref()
            .expect("methods")
            .first()
            .cloned()
            .expect("angle");
        let mut resolvers = Printer::new();
        let mut body = Printer::new();
        generate_method(
            &ctx,
            MethodKind::Builtin { builtin: "Vector2" },
            &method,
            &mut resolvers,
            &mut body,
        )
        .expect("generates");
        let r = resolvers.finish();
        assert!(r.contains("sys().builtin_method_bind(VariantKind::VECTOR2, \"angle\", 1740277)"));
        let b = body.finish();
        assert!(b.contains("pub fn angle(&self) -> f64"));
    }
}
