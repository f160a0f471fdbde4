//! Object-class emission.
//!
//! Classes form a single-inheritance chain; each emitted type embeds its
//! parent transparently and derefs to it, so the root class owns the raw
//! handle and every ancestor method stays reachable. The engine-side class
//! name is interned once per class and cached for the process lifetime.

use std::collections::HashSet;

use embergen_schema::model::ObjectClass;
use tracing::{debug, warn};

use crate::classify::{map_type, CtxKind};
use crate::context::GenerationContext;
use crate::enums::generate_enum;
use crate::error::CodegenError;
use crate::methods::{generate_method_vis, MethodKind};
use crate::naming::escape_ident;
use crate::printer::Printer;
use crate::virtuals::{generate_dispatcher, generate_virtual_proxy};

/// Emits one object class.
///
/// # Errors
/// Fatal on unresolvable type tokens outside the per-method skip rules.
pub fn generate_class(
    ctx: &GenerationContext,
    class: &ObjectClass,
    p: &mut Printer,
) -> Result<(), CodegenError> {
    let name = class.name.as_str();
    let lower = name.to_ascii_lowercase();

    emit_definition(class, p);
    emit_class_name_cache(name, &lower, p);

    for en in class.enums.as_deref().unwrap_or(&[]) {
        generate_enum(p, en, Some(name));
    }

    // Accessors a property wrapper supersedes drop to crate visibility;
    // the wrapper becomes the public surface. An accessor whose name the
    // wrapper would reuse keeps its visibility, since no wrapper is
    // emitted for it.
    let method_names: HashSet<&str> =
        class.method_list().iter().map(|m| m.name.as_str()).collect();
    let mut superseded: HashSet<&str> = HashSet::new();
    for prop in class.properties.as_deref().unwrap_or(&[]) {
        if !method_names.contains(prop.getter.as_str())
            || method_names.contains(prop.name.as_str())
        {
            continue;
        }
        if prop.getter != prop.name {
            superseded.insert(prop.getter.as_str());
        }
        if let Some(setter) = prop.setter.as_deref() {
            if method_names.contains(setter) && format!("set_{}", prop.name) != setter {
                superseded.insert(setter);
            }
        }
    }

    let mut resolvers = Printer::new();
    let mut body = Printer::new();

    emit_handle_plumbing(class, &mut body);
    if ctx.singletons.contains(name) {
        emit_singleton_plumbing(name, &lower, &mut resolvers, &mut body);
    } else if class.is_instantiable {
        emit_constructor(&lower, &mut body);
    }
    for constant in class.constants.as_deref().unwrap_or(&[]) {
        body.line(&format!(
            "pub const {}: i64 = {};",
            constant.name, constant.value
        ));
    }
    for signal in class.signals.as_deref().unwrap_or(&[]) {
        body.line(&format!(
            "pub const SIGNAL_{}: &'static str = \"{}\";",
            signal.name.to_ascii_uppercase(),
            signal.name
        ));
    }
    if !class.signals.as_deref().unwrap_or(&[]).is_empty()
        || !class.constants.as_deref().unwrap_or(&[]).is_empty()
    {
        body.blank();
    }

    for method in class.method_list() {
        let vis = if superseded.contains(method.name.as_str()) {
            "pub(crate)"
        } else {
            "pub"
        };
        generate_method_vis(
            ctx,
            MethodKind::Class { class: name },
            method,
            vis,
            &mut resolvers,
            &mut body,
        )?;
    }

    emit_properties(ctx, class, &mut body)?;

    p.line(resolvers.as_str());
    p.block(&format!("impl {name}"), |p| {
        p.line(body.as_str());
    });
    p.blank();

    emit_virtuals(ctx, class, p)?;
    Ok(())
}

fn emit_definition(class: &ObjectClass, p: &mut Printer) {
    let name = class.name.as_str();
    match &class.inherits {
        None => {
            p.line("#[repr(transparent)]");
            p.line("#[derive(Debug)]");
            p.block(&format!("pub struct {name}"), |p| {
                p.line("handle: *mut c_void,");
            });
        }
        Some(parent) => {
            p.line("#[repr(transparent)]");
            p.line("#[derive(Debug)]");
            p.block(&format!("pub struct {name}"), |p| {
                p.line(&format!("parent: {parent},"));
            });
            p.blank();
            p.block(&format!("impl std::ops::Deref for {name}"), |p| {
                p.line(&format!("type Target = {parent};"));
                p.block("fn deref(&self) -> &Self::Target", |p| {
                    p.line("&self.parent");
                });
            });
        }
    }
    p.blank();
}

fn emit_class_name_cache(name: &str, lower: &str, p: &mut Printer) {
    p.block(&format!("fn {lower}_class_name() -> &'static StringName"), |p| {
        p.line("static CELL: OnceLock<StringName> = OnceLock::new();");
        p.line(&format!("CELL.get_or_init(|| StringName::from(\"{name}\"))"));
    });
    p.blank();
}

fn emit_handle_plumbing(class: &ObjectClass, body: &mut Printer) {
    match &class.inherits {
        None => {
            body.block(
                "pub(crate) fn from_handle(handle: *mut c_void) -> Self",
                |p| {
                    p.line("Self { handle }");
                },
            );
            body.blank();
            body.line("#[must_use]");
            body.block("pub fn handle(&self) -> *mut c_void", |p| {
                p.line("self.handle");
            });
            body.blank();
        }
        Some(parent) => {
            body.block(
                "pub(crate) fn from_handle(handle: *mut c_void) -> Self",
                |p| {
                    p.line(&format!("Self {{ parent: {parent}::from_handle(handle) }}"));
                },
            );
            body.blank();
        }
    }
}

/// Singleton classes expose the engine-owned instance through a cached
/// shared handle; they are never constructed from Rust.
fn emit_singleton_plumbing(name: &str, lower: &str, resolvers: &mut Printer, body: &mut Printer) {
    resolvers.block(&format!("fn {lower}_singleton() -> *mut c_void"), |p| {
        p.line("static CELL: OnceLock<usize> = OnceLock::new();");
        p.line(&format!(
            "*CELL.get_or_init(|| sys().global_singleton({lower}_class_name()) as usize) as *mut c_void"
        ));
    });
    resolvers.blank();

    body.line(&format!("/// The engine-owned `{name}` instance."));
    body.line("#[must_use]");
    body.block("pub fn shared() -> Self", |p| {
        p.line(&format!("Self::from_handle({lower}_singleton())"));
    });
    body.blank();
}

fn emit_constructor(lower: &str, body: &mut Printer) {
    body.line("#[must_use]");
    body.block("pub fn new() -> Self", |p| {
        p.line(&format!(
            "let handle = unsafe {{ sys().construct_object({lower}_class_name()) }};"
        ));
        p.line("Self::from_handle(handle)");
    });
    body.blank();
}

fn emit_properties(
    ctx: &GenerationContext,
    class: &ObjectClass,
    body: &mut Printer,
) -> Result<(), CodegenError> {
    let name = class.name.as_str();
    let method_names: HashSet<&str> = class.method_list().iter().map(|m| m.name.as_str()).collect();

    for prop in class.properties.as_deref().unwrap_or(&[]) {
        if !method_names.contains(prop.getter.as_str()) {
            warn!(class = name, property = %prop.name, getter = %prop.getter, "property getter missing, skipping");
            continue;
        }
        if method_names.contains(prop.name.as_str()) {
            debug!(class = name, property = %prop.name, "property name shadows a method, skipping wrapper");
            continue;
        }
        let where_ = format!("{name}.{}", prop.name);
        // The wrapper's return type follows the getter method, which can
        // differ from the declared property type.
        let getter_ret = class
            .method_list()
            .iter()
            .find(|m| m.name == prop.getter)
            .and_then(|m| m.return_info().map(|(t, meta)| (t.to_string(), meta.map(String::from))));
        let ty = match &getter_ret {
            Some((token, meta)) => {
                let base = map_type(ctx, token, meta.as_deref(), CtxKind::Return, &where_)?;
                if ctx.is_object_class(token) {
                    format!("Option<{base}>")
                } else {
                    base
                }
            }
            None => map_type(ctx, &prop.ty, None, CtxKind::Return, &where_)?,
        };
        let prop_ident = escape_ident(&prop.name);
        let index_arg = prop.index.map(|i| i.to_string());

        body.line("#[must_use]");
        body.block(&format!("pub fn {prop_ident}(&self) -> {ty}"), |p| {
            match &index_arg {
                Some(index) => p.line(&format!("self.{}({index})", prop.getter)),
                None => p.line(&format!("self.{}()", prop.getter)),
            }
        });
        body.blank();

        if let Some(setter) = &prop.setter {
            if format!("set_{}", prop.name) == *setter {
                // The setter already carries the wrapper's name; it stays
                // public and no wrapper is emitted.
                continue;
            }
            // The wrapper's parameter mirrors the setter method's own
            // argument, which can differ from the declared property type.
            let setter_arg = class
                .method_list()
                .iter()
                .find(|m| m.name == *setter)
                .and_then(|m| m.args().last());
            let Some(setter_arg) = setter_arg else {
                debug!(class = name, property = %prop.name, setter = %setter, "property setter missing, read-only wrapper");
                continue;
            };
            let value_ty = map_type(
                ctx,
                &setter_arg.ty,
                setter_arg.meta.as_deref(),
                CtxKind::Argument,
                &where_,
            )?;
            let param_ty = match setter_arg.ty.as_str() {
                t if ctx.is_object_class(t) => format!("&{value_ty}"),
                "String" | "StringName" | "NodePath" | "Array" | "Dictionary" | "Variant" => {
                    format!("&{value_ty}")
                }
                t if t.starts_with("typedarray::") => format!("&{value_ty}"),
                _ => value_ty,
            };
            body.block(
                &format!("pub fn set_{prop_ident}(&self, value: {param_ty})"),
                |p| match &index_arg {
                    Some(index) => p.line(&format!("self.{setter}({index}, value);")),
                    None => p.line(&format!("self.{setter}(value);")),
                },
            );
            body.blank();
        }
    }
    Ok(())
}

fn emit_virtuals(
    ctx: &GenerationContext,
    class: &ObjectClass,
    p: &mut Printer,
) -> Result<(), CodegenError> {
    let mut names: Vec<&str> = Vec::new();
    for method in class.method_list() {
        if method.is_virtual {
            generate_virtual_proxy(ctx, &class.name, method, p)?;
            names.push(method.name.as_str());
        }
    }
    generate_dispatcher(&class.name, class.inherits.as_deref(), &names, p);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::fixture_context;

    fn generate(name: &str) -> String {
        let ctx = fixture_context();
        let class = ctx.class_map[name].clone();
        let mut p = Printer::new();
        generate_class(&ctx, &class, &mut p).expect("generates");
        p.finish()
    }

    #[test]
    fn test_root_class_owns_the_handle() {
        let out = generate("Object");
        assert!(out.contains("pub struct Object"));
        assert!(out.contains("handle: *mut c_void,"));
        assert!(out.contains("pub fn handle(&self) -> *mut c_void"));
        assert!(!out.contains("impl std::ops::Deref for Object"));
    }

    #[test]
    fn test_child_class_derefs_to_parent() {
        let out = generate("Node2D");
        assert!(out.contains("parent: Node,"));
        assert!(out.contains("impl std::ops::Deref for Node2D"));
        assert!(out.contains("type Target = Node;"));
        assert!(out.contains("Self { parent: Node::from_handle(handle) }"));
    }

    #[test]
    fn test_class_name_cached_once() {
        let out = generate("Node");
        assert!(out.contains("fn node_class_name() -> &'static StringName"));
        assert!(out.contains("static CELL: OnceLock<StringName> = OnceLock::new();"));
        assert!(out.contains("CELL.get_or_init(|| StringName::from(\"Node\"))"));
    }

    #[test]
    fn test_property_wrapper_supersedes_getter() {
        let out = generate("Node");
        // The getter drops to crate visibility; the property wrapper is
        // the public surface. The setter already carries the wrapper name
        // and stays public untouched.
        assert!(out.contains("pub(crate) fn get_name(&self) -> StringName"));
        assert!(out.contains("pub fn name(&self) -> StringName"));
        assert!(out.contains("self.get_name()"));
        assert!(out.contains("pub fn set_name(&self, name: &GString)"));
    }

    #[test]
    fn test_singleton_class_gets_shared_accessor() {
        let out = generate("EmberServer");
        assert!(out.contains("fn emberserver_singleton() -> *mut c_void"));
        assert!(out.contains("sys().global_singleton(emberserver_class_name())"));
        assert!(out.contains("pub fn shared() -> Self"));
        assert!(out.contains("Self::from_handle(emberserver_singleton())"));
        // Singletons are engine-owned; no constructor is emitted.
        assert!(!out.contains("pub fn new() -> Self"));
    }

    #[test]
    fn test_signal_names_are_constants() {
        let out = generate("Node");
        assert!(out.contains("pub const SIGNAL_RENAMED: &'static str = \"renamed\";"));
    }

    #[test]
    fn test_virtual_dispatcher_chains_to_parent() {
        let out = generate("Node");
        assert!(out.contains("\"_process\" => Some(node_process_proxy as VirtualFn),"));
        assert!(out.contains("_ => object_virtual_dispatcher(name),"));
    }
}
