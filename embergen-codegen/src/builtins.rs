//! Builtin value-type emission.
//!
//! Builtins split into two representations. Types with schema members are
//! emitted as plain `#[repr(C)]` structs whose layout matches the engine's.
//! The rest are opaque: their engine-side bytes live in a content field
//! sized from the selected build configuration, and every operation goes
//! through resolved native calls. `int`, `float` and `bool` are bridged
//! directly to Rust primitives and never generated.

use embergen_schema::model::{BuiltinClass, ConstructorDef};
use tracing::{debug, warn};

use crate::classify::{map_type, rust_builtin_name, CtxKind};
use crate::context::GenerationContext;
use crate::defaults::translate_default;
use crate::enums::generate_enum;
use crate::error::CodegenError;
use crate::marshal::{emit_bindings, emit_pointer_array, plan_argument};
use crate::methods::{generate_method, MethodKind};
use crate::naming::{escape_ident, type_name_to_screaming};
use crate::printer::Printer;

/// Builtins bridged to host primitives instead of generated.
const BRIDGED: &[&str] = &["int", "float", "bool", "Nil"];

/// Operator tokens that map onto Rust trait impls; everything else is
/// skipped with a debug note.
const OPERATOR_TRAITS: &[(&str, &str, &str, &str)] = &[
    ("+", "std::ops::Add", "add", "ADD"),
    ("-", "std::ops::Sub", "sub", "SUBTRACT"),
    ("*", "std::ops::Mul", "mul", "MULTIPLY"),
    ("/", "std::ops::Div", "div", "DIVIDE"),
    ("%", "std::ops::Rem", "rem", "MODULE"),
];

/// Emits one builtin type.
///
/// # Errors
/// Fatal on unresolvable type tokens.
pub fn generate_builtin(
    ctx: &GenerationContext,
    builtin: &BuiltinClass,
    p: &mut Printer,
) -> Result<(), CodegenError> {
    if BRIDGED.contains(&builtin.name.as_str()) {
        return Ok(());
    }
    let name = builtin.name.as_str();
    let is_struct = ctx.is_struct(name);

    if is_struct {
        emit_struct_definition(ctx, builtin, p)?;
    } else {
        emit_opaque_definition(ctx, builtin, p)?;
    }

    for en in builtin.enums.as_deref().unwrap_or(&[]) {
        generate_enum(p, en, Some(name));
    }

    let mut resolvers = Printer::new();
    let mut body = Printer::new();

    for constant in builtin.constants.as_deref().unwrap_or(&[]) {
        emit_constant(ctx, name, constant, &mut body);
    }
    for ctor in &builtin.constructors {
        emit_constructor(ctx, builtin, ctor, &mut resolvers, &mut body)?;
    }
    for method in builtin.methods.as_deref().unwrap_or(&[]) {
        generate_method(
            ctx,
            MethodKind::Builtin { builtin: name },
            method,
            &mut resolvers,
            &mut body,
        )?;
    }
    if builtin.is_keyed {
        emit_keyed_accessors(name, &mut body);
    }

    p.line(resolvers.as_str());
    p.block(&format!("impl {}", rust_builtin_name(name)), |p| {
        p.line(body.as_str());
    });
    p.blank();

    emit_operators(ctx, builtin, p)?;

    if builtin.has_destructor && !is_struct {
        emit_destructor(name, p);
    }
    Ok(())
}

fn emit_struct_definition(
    ctx: &GenerationContext,
    builtin: &BuiltinClass,
    p: &mut Printer,
) -> Result<(), CodegenError> {
    let name = builtin.name.as_str();
    let rust_name = rust_builtin_name(name);
    let offsets = ctx.member_offsets.get(name);
    p.line("#[repr(C)]");
    p.line("#[derive(Debug, Clone, Copy, PartialEq, Default)]");
    let mut fields: Vec<String> = Vec::new();
    for member in builtin.members.as_deref().unwrap_or(&[]) {
        // The offset table's meta carries the configured width; the member
        // list alone does not distinguish f32 from f64 layouts.
        let meta = offsets.and_then(|entries| {
            entries
                .iter()
                .find(|e| e.member == member.name)
                .map(|e| e.meta.as_str())
        });
        let ty = map_type(
            ctx,
            &member.ty,
            meta,
            CtxKind::BuiltinMember,
            &format!("{name}.{}", member.name),
        )?;
        fields.push(format!("pub {}: {ty},", escape_ident(&member.name)));
    }
    p.block(&format!("pub struct {rust_name}"), |p| {
        for field in &fields {
            p.line(field);
        }
    });
    p.blank();
    Ok(())
}

fn emit_opaque_definition(
    ctx: &GenerationContext,
    builtin: &BuiltinClass,
    p: &mut Printer,
) -> Result<(), CodegenError> {
    let name = builtin.name.as_str();
    let rust_name = rust_builtin_name(name);
    let storage = ctx.storage_for(name)?;
    p.line("#[repr(C)]");
    p.line("#[derive(Debug, Default)]");
    p.block(&format!("pub struct {rust_name}"), |p| {
        p.line(&format!("pub(crate) content: {},", storage.rust_type()));
    });
    p.blank();
    p.block(&format!("impl {rust_name}"), |p| {
        p.block("pub(crate) fn content_ptr(&self) -> *const c_void", |p| {
            p.line("std::ptr::from_ref(&self.content) as *const c_void");
        });
        p.blank();
        p.block("pub(crate) fn content_mut_ptr(&mut self) -> *mut c_void", |p| {
            p.line("std::ptr::from_mut(&mut self.content) as *mut c_void");
        });
        p.blank();
        p.block(
            "pub(crate) unsafe fn from_content_ptr(raw: *const c_void) -> Self",
            |p| {
                p.line(&format!(
                    "Self {{ content: unsafe {{ *(raw as *const {}) }} }}",
                    storage.rust_type()
                ));
            },
        );
        p.blank();
        p.block("pub(crate) unsafe fn move_content_into(self, ret: *mut c_void)", |p| {
            p.line(&format!(
                "unsafe {{ *(ret as *mut {}) = self.content; }}",
                storage.rust_type()
            ));
            p.line("std::mem::forget(self);");
        });
    });
    p.blank();
    Ok(())
}

fn emit_constant(
    ctx: &GenerationContext,
    owner: &str,
    constant: &embergen_schema::model::BuiltinConstant,
    body: &mut Printer,
) {
    let where_ = format!("{owner}.{}", constant.name);
    let Some(expr) = translate_default(ctx, &constant.ty, &constant.value, &where_) else {
        return;
    };
    let ty = match map_type(ctx, &constant.ty, None, CtxKind::Return, &where_) {
        Ok(t) => t,
        Err(_) => {
            warn!(owner, constant = %constant.name, "constant type unresolved, skipping");
            return;
        }
    };
    // Struct literals are const-able; everything else needs a call.
    if expr.starts_with(&format!("{ty} {{")) {
        body.line(&format!("pub const {}: {ty} = {expr};", constant.name));
    } else {
        body.line("#[must_use]");
        body.block(&format!("pub fn {}() -> {ty}", constant.name), |p| {
            p.line(&expr);
        });
    }
    body.blank();
}

/// Constructor argument lists that exactly mirror the member list can skip
/// the native call and build the struct directly.
fn mirrors_members(builtin: &BuiltinClass, ctor: &ConstructorDef) -> bool {
    let Some(members) = builtin.members.as_deref() else {
        return false;
    };
    let args = ctor.args();
    args.len() == members.len()
        && args
            .iter()
            .zip(members)
            .all(|(a, m)| a.name == m.name && a.ty == m.ty)
}

fn emit_constructor(
    ctx: &GenerationContext,
    builtin: &BuiltinClass,
    ctor: &ConstructorDef,
    resolvers: &mut Printer,
    body: &mut Printer,
) -> Result<(), CodegenError> {
    let name = builtin.name.as_str();
    let where_ = format!("{name}.constructor_{}", ctor.index);
    let fn_name = if ctor.args().is_empty() {
        "new".to_string()
    } else {
        format!(
            "from_{}",
            ctor.args()
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join("_")
        )
    };

    let mirrors = mirrors_members(builtin, ctor);
    let offsets = ctx.member_offsets.get(name);
    let mut params: Vec<String> = Vec::new();
    for arg in ctor.args() {
        // The field-for-field shortcut takes parameters at the member
        // layout width so the struct literal types line up.
        let (kind, meta) = if mirrors {
            let meta = offsets.and_then(|entries| {
                entries
                    .iter()
                    .find(|e| e.member == arg.name)
                    .map(|e| e.meta.as_str())
            });
            (CtxKind::BuiltinMember, meta)
        } else {
            (CtxKind::Argument, arg.meta.as_deref())
        };
        let ty = map_type(ctx, &arg.ty, meta, kind, &where_)?;
        let text = match arg.ty.as_str() {
            "String" | "StringName" | "NodePath" | "Array" | "Dictionary" | "Variant" => {
                format!("&{ty}")
            }
            t if ctx.is_object_class(t) => format!("&{ty}"),
            _ => ty,
        };
        params.push(format!("{}: {text}", escape_ident(&arg.name)));
    }

    body.line("#[must_use]");
    let sig = format!("pub fn {fn_name}({}) -> Self", params.join(", "));

    if mirrors {
        // Field-for-field constructor; no native call needed.
        let fields: Vec<String> = ctor
            .args()
            .iter()
            .map(|a| escape_ident(&a.name))
            .collect();
        body.block(&sig, |p| {
            p.line(&format!("Self {{ {} }}", fields.join(", ")));
        });
        body.blank();
        return Ok(());
    }

    let resolver = format!("{}_ctor_{}", name.to_ascii_lowercase(), ctor.index);
    resolvers.block(&format!("fn {resolver}() -> *mut c_void"), |p| {
        p.line("static CELL: OnceLock<usize> = OnceLock::new();");
        p.line(&format!(
            "*CELL.get_or_init(|| sys().builtin_constructor(VariantKind::{}, {}) as usize) as *mut c_void",
            type_name_to_screaming(name),
            ctor.index
        ));
    });
    resolvers.blank();

    let planned: Vec<_> = ctor
        .args()
        .iter()
        .map(|a| plan_argument(ctx, &a.name, &a.ty, a.meta.as_deref(), false))
        .collect();
    let is_struct = ctx.is_struct(name);
    body.block(&sig, |p| {
        emit_bindings(p, &planned);
        emit_pointer_array(p, &planned);
        p.line("let mut ret = Self::default();");
        let target = if is_struct {
            "&mut ret as *mut _ as *mut c_void"
        } else {
            "ret.content_mut_ptr()"
        };
        p.block("unsafe", |p| {
            p.line(&format!(
                "sys().call_builtin_constructor({resolver}(), {target}, call_args.as_ptr());"
            ));
        });
        p.line("ret");
    });
    body.blank();
    Ok(())
}

fn emit_keyed_accessors(name: &str, body: &mut Printer) {
    let kind = type_name_to_screaming(name);
    body.line("#[must_use]");
    body.block("pub fn get_keyed(&self, key: &Variant) -> Variant", |p| {
        p.line("let mut ret = Variant::nil();");
        p.block("unsafe", |p| {
            p.line(&format!(
                "sys().keyed_getter(VariantKind::{kind})(self.content_ptr(), key.content_ptr(), ret.content_mut_ptr());"
            ));
        });
        p.line("ret");
    });
    body.blank();
    body.block("pub fn set_keyed(&mut self, key: &Variant, value: &Variant)", |p| {
        p.block("unsafe", |p| {
            p.line(&format!(
                "sys().keyed_setter(VariantKind::{kind})(self.content_mut_ptr(), key.content_ptr(), value.content_ptr());"
            ));
        });
    });
    body.blank();
    body.line("#[must_use]");
    body.block("pub fn has_key(&self, key: &Variant) -> bool", |p| {
        p.line("let mut ret: u32 = 0;");
        p.block("unsafe", |p| {
            p.line(&format!(
                "ret = sys().keyed_checker(VariantKind::{kind})(self.content_ptr(), key.content_ptr());"
            ));
        });
        p.line("ret != 0");
    });
    body.blank();
}

fn variant_kind_of(ctx: &GenerationContext, token: &str) -> Option<String> {
    match token {
        "int" => Some("INT".to_string()),
        "float" => Some("FLOAT".to_string()),
        "bool" => Some("BOOL".to_string()),
        other if ctx.builtin_map.contains_key(other) => Some(type_name_to_screaming(other)),
        _ => None,
    }
}

fn emit_operators(
    ctx: &GenerationContext,
    builtin: &BuiltinClass,
    p: &mut Printer,
) -> Result<(), CodegenError> {
    let name = builtin.name.as_str();
    let rust_name = rust_builtin_name(name);
    let left_kind = type_name_to_screaming(name);
    for op in &builtin.operators {
        // Variant right-hand sides produce dynamically-typed results and
        // are not emitted.
        if op.right_type.as_deref() == Some("Variant") {
            debug!(owner = name, op = %op.name, "Variant operand, skipping operator");
            continue;
        }
        let Some((_, trait_path, method, op_kind)) = OPERATOR_TRAITS
            .iter()
            .find(|(token, _, _, _)| *token == op.name)
            .copied()
        else {
            debug!(owner = name, op = %op.name, "no trait mapping, skipping operator");
            continue;
        };
        let Some(rhs_token) = op.right_type.as_deref() else {
            continue;
        };
        let Some(right_kind) = variant_kind_of(ctx, rhs_token) else {
            debug!(owner = name, op = %op.name, rhs = rhs_token, "unmapped operand, skipping");
            continue;
        };
        let rhs_ty = map_type(
            ctx,
            rhs_token,
            None,
            CtxKind::Argument,
            &format!("{name}.operator{}", op.name),
        )?;
        let ret_ty = map_type(
            ctx,
            &op.return_type,
            None,
            CtxKind::Return,
            &format!("{name}.operator{}", op.name),
        )?;
        p.block(
            &format!("impl {trait_path}<{rhs_ty}> for {rust_name}"),
            |p| {
                p.line(&format!("type Output = {ret_ty};"));
                p.block(&format!("fn {method}(self, rhs: {rhs_ty}) -> {ret_ty}"), |p| {
                    p.line("static CELL: OnceLock<usize> = OnceLock::new();");
                    p.line(&format!(
                        "let op = *CELL.get_or_init(|| sys().operator_evaluator(OpKind::{op_kind}, VariantKind::{left_kind}, VariantKind::{right_kind}) as usize) as *mut c_void;"
                    ));
                    p.line(&format!("let mut ret = {ret_ty}::default();"));
                    p.block("unsafe", |p| {
                        p.line("sys().call_operator(op, std::ptr::from_ref(&self) as *const c_void, std::ptr::from_ref(&rhs) as *const c_void, &mut ret as *mut _ as *mut c_void);");
                    });
                    p.line("ret");
                });
            },
        );
        p.blank();
    }
    Ok(())
}

fn emit_destructor(name: &str, p: &mut Printer) {
    let kind = type_name_to_screaming(name);
    p.block(&format!("impl Drop for {}", rust_builtin_name(name)), |p| {
        p.block("fn drop(&mut self)", |p| {
            p.block("unsafe", |p| {
                p.line(&format!(
                    "sys().builtin_destructor(VariantKind::{kind})(self.content_mut_ptr());"
                ));
            });
        });
    });
    p.blank();
}
