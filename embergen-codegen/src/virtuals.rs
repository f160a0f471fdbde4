//! Virtual-method trampolines and per-class dispatch tables.
//!
//! The engine calls overridden methods back through raw `extern "C"`
//! entry points. For every overridable method a trampoline is emitted that
//! decodes the raw argument vector, invokes the Rust override, and encodes
//! the result; a per-class dispatcher maps engine method names onto those
//! trampolines and falls back to the parent class table.

use embergen_schema::model::MethodDef;

use crate::classify::{map_type, CtxKind};
use crate::context::{GenerationContext, TypeRepr};
use crate::enums::{case_name, common_prefix};
use crate::error::CodegenError;
use crate::naming::escape_ident;
use crate::printer::Printer;

/// Trampoline symbol for one overridable method.
#[must_use]
pub fn proxy_name(class: &str, method: &str) -> String {
    format!("{}{}_proxy", class.to_ascii_lowercase(), method)
}

/// Dispatcher symbol for one class.
#[must_use]
pub fn dispatcher_name(class: &str) -> String {
    format!("{}_virtual_dispatcher", class.to_ascii_lowercase())
}

/// Emits the trampoline for one overridable method.
///
/// # Errors
/// Fatal on unresolvable argument or return tokens.
pub fn generate_virtual_proxy(
    ctx: &GenerationContext,
    class: &str,
    method: &MethodDef,
    p: &mut Printer,
) -> Result<(), CodegenError> {
    let where_ = format!("{class}.{}", method.name);
    // Resolve every token up front so a bad one aborts before any text
    // lands in the buffer.
    for arg in method.args() {
        map_type(ctx, &arg.ty, arg.meta.as_deref(), CtxKind::Argument, &where_)?;
    }
    if let Some((token, meta)) = method.return_info() {
        map_type(ctx, token, meta, CtxKind::Return, &where_)?;
    }
    let name = proxy_name(class, &method.name);
    p.block(
        &format!(
            "unsafe extern \"C\" fn {name}(instance: *mut c_void, args: *const *const c_void, ret: *mut c_void)"
        ),
        |p| {
            // A null instance or argument vector is an engine-side fault;
            // returning leaves `ret` untouched, which the engine treats as
            // the default value.
            p.block("if instance.is_null() || args.is_null()", |p| {
                p.line("return;");
            });
            p.line(&format!(
                "let target = unsafe {{ &mut *(instance as *mut {class}) }};"
            ));
            emit_proxy_body(ctx, method, &where_, p);
        },
    );
    p.blank();
    Ok(())
}

fn emit_proxy_body(ctx: &GenerationContext, method: &MethodDef, where_: &str, p: &mut Printer) {
    let mut call_params: Vec<String> = Vec::new();
    for (i, arg) in method.args().iter().enumerate() {
        let ident = escape_ident(&arg.name);
        let token = arg.ty.as_str();
        let rust_ty = match map_type(ctx, token, arg.meta.as_deref(), CtxKind::Argument, where_) {
            Ok(t) => t,
            // Proxy argument tokens passed classification earlier; an
            // unknown here means the owner was already skipped.
            Err(_) => return,
        };
        if token.starts_with("enum::") {
            // A panic must not cross the C boundary; an unknown raw value
            // falls back to the first declared case, or bails when the
            // enum is not in this run's registry.
            match enum_first_case(ctx, token, &rust_ty) {
                Some(fallback) => p.line(&format!(
                    "let {ident} = {rust_ty}::from_raw(unsafe {{ *(*args.add({i}) as *const i64) }}).unwrap_or({fallback});"
                )),
                None => p.line(&format!(
                    "let Some({ident}) = {rust_ty}::from_raw(unsafe {{ *(*args.add({i}) as *const i64) }}) else {{ return; }};"
                )),
            }
            call_params.push(ident);
        } else if token.starts_with("bitfield::") {
            p.line(&format!(
                "let {ident} = {rust_ty}(unsafe {{ *(*args.add({i}) as *const u64) }});"
            ));
            call_params.push(ident);
        } else if ctx.is_object_class(token) {
            p.line(&format!(
                "let {ident}_handle = unsafe {{ *(*args.add({i}) as *const *mut c_void) }};"
            ));
            if arg.default_value.as_deref() == Some("null") {
                p.line(&format!(
                    "let {ident} = (!{ident}_handle.is_null()).then(|| {rust_ty}::from_handle({ident}_handle));"
                ));
                call_params.push(format!("{ident}.as_ref()"));
            } else {
                p.line(&format!(
                    "let {ident} = {rust_ty}::from_handle({ident}_handle);"
                ));
                call_params.push(format!("&{ident}"));
            }
        } else if is_by_ref_builtin(ctx, token) {
            p.line(&format!(
                "let {ident} = unsafe {{ {rust_ty}::from_content_ptr(*args.add({i})) }};"
            ));
            call_params.push(format!("&{ident}"));
        } else {
            p.line(&format!(
                "let {ident} = unsafe {{ *(*args.add({i}) as *const {rust_ty}) }};"
            ));
            call_params.push(ident);
        }
    }

    let call = format!(
        "target.{}({})",
        escape_ident(&method.name),
        call_params.join(", ")
    );
    match method.return_info() {
        None => {
            p.line(&format!("{call};"));
            p.line("let _ = ret;");
        }
        Some((token, meta)) => {
            let rust_ty = match map_type(ctx, token, meta, CtxKind::Return, where_) {
                Ok(t) => t,
                Err(_) => return,
            };
            p.line(&format!("let result = {call};"));
            if token.starts_with("enum::") {
                p.line("unsafe { *(ret as *mut i64) = result.raw(); }");
            } else if token.starts_with("bitfield::") {
                p.line("unsafe { *(ret as *mut u64) = result.0; }");
            } else if ctx.is_object_class(token) {
                p.line("unsafe { *(ret as *mut *mut c_void) = result.map_or(std::ptr::null_mut(), |o| o.handle()); }");
            } else if is_by_ref_builtin(ctx, token) {
                p.line("unsafe { result.move_content_into(ret); }");
            } else {
                p.line(&format!("unsafe {{ *(ret as *mut {rust_ty}) = result; }}"));
            }
        }
    }
}

/// First declared case of a registered enum, as emitted expression text.
fn enum_first_case(ctx: &GenerationContext, token: &str, rust_ty: &str) -> Option<String> {
    let qualified = token.strip_prefix("enum::")?;
    let def = ctx.enum_registry.get(qualified)?;
    let prefix = common_prefix(&def.values);
    let first = def.values.first()?;
    Some(format!("{rust_ty}::{}", case_name(first, &prefix)))
}

fn is_by_ref_builtin(ctx: &GenerationContext, token: &str) -> bool {
    if token.starts_with("typedarray::") {
        return true;
    }
    matches!(
        token,
        "String" | "StringName" | "NodePath" | "Array" | "Dictionary" | "Callable" | "Signal"
            | "Variant" | "RID"
    ) || (!ctx.is_object_class(token)
        && ctx.classify(token) == TypeRepr::Reference
        && ctx.builtin_map.contains_key(token))
}

/// Emits the class's name-to-trampoline table, falling back to the parent
/// class dispatcher.
pub fn generate_dispatcher(
    class: &str,
    parent: Option<&str>,
    virtual_methods: &[&str],
    p: &mut Printer,
) {
    p.block(
        &format!(
            "pub fn {}(name: &str) -> Option<VirtualFn>",
            dispatcher_name(class)
        ),
        |p| {
            p.block("match name", |p| {
                for method in virtual_methods {
                    p.line(&format!(
                        "\"{method}\" => Some({} as VirtualFn),",
                        proxy_name(class, method)
                    ));
                }
                match parent {
                    Some(parent) => p.line(&format!("_ => {}(name),", dispatcher_name(parent))),
                    None => p.line("_ => None,"),
                }
            });
        },
    );
    p.blank();
}
