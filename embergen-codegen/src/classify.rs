//! Schema type tokens to Rust host types.
//!
//! One function, `map_type`, turns every type token the schema can produce
//! into the Rust type text the generators emit. The mapping is context
//! sensitive: untagged integers and reals widen differently in argument
//! position than inside a fixed-layout member.

use crate::context::GenerationContext;
use crate::error::CodegenError;

/// Where a type token appears; drives the width rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtxKind {
    /// Method/constructor argument.
    Argument,
    /// Method return value.
    Return,
    /// Member of a struct-represented builtin.
    BuiltinMember,
    /// Field of a native fixed-layout structure.
    NativeField,
}

impl CtxKind {
    /// Member contexts use narrow integer defaults.
    #[must_use]
    pub const fn is_member(self) -> bool {
        matches!(self, Self::BuiltinMember | Self::NativeField)
    }
}

/// Flattens a dotted qualified name (`Node.ProcessMode` → `NodeProcessMode`).
#[must_use]
pub fn flatten_qualified(name: &str) -> String {
    name.replace('.', "")
}

/// Rust type name for an emitted flag-set (`bitfield::` tokens).
#[must_use]
pub fn flag_set_name(name: &str) -> String {
    let flat = flatten_qualified(name);
    if flat.ends_with("Flags") {
        flat
    } else {
        format!("{flat}Flags")
    }
}

/// Rust type name for an emitted enum (`enum::` tokens).
///
/// A few engine enums collide with host names and are re-spelled.
#[must_use]
pub fn enum_type_name(name: &str) -> String {
    match name {
        "Error" => "EmberError".to_string(),
        "Variant.Type" => "VariantKind".to_string(),
        "Variant.Operator" => "VariantOperator".to_string(),
        other => flatten_qualified(other),
    }
}

/// Emitted Rust type name for a builtin; a couple of engine names collide
/// with host prelude types and are re-spelled.
#[must_use]
pub fn rust_builtin_name(name: &str) -> &str {
    match name {
        "String" => "GString",
        "Array" => "VarArray",
        other => other,
    }
}

/// True when the token is a raw-pointer shape (`Thing*`, `const Thing**`).
#[must_use]
pub fn is_pointer_token(token: &str) -> bool {
    token.contains('*')
}

/// Maps a schema type token (plus optional meta tag) to emitted Rust type
/// text.
///
/// # Errors
/// `CodegenError::UnknownType` when the token resolves to nothing the run
/// knows about; `where_` names the owning type and member for the message.
pub fn map_type(
    ctx: &GenerationContext,
    token: &str,
    meta: Option<&str>,
    kind: CtxKind,
    where_: &str,
) -> Result<String, CodegenError> {
    if let Some(inner) = token.strip_prefix("enum::") {
        return Ok(enum_type_name(inner));
    }
    if let Some(inner) = token.strip_prefix("bitfield::") {
        return Ok(flag_set_name(inner));
    }
    if let Some(inner) = token.strip_prefix("typedarray::") {
        let element = map_type(ctx, inner, None, CtxKind::Argument, where_)?;
        return Ok(format!("TypedArray<{element}>"));
    }

    match token {
        "int" => Ok(int_type(meta, kind).to_string()),
        "float" | "real" => Ok(float_type(meta, kind).to_string()),
        "bool" => Ok("bool".to_string()),
        "String" => Ok("GString".to_string()),
        "Array" => Ok("VarArray".to_string()),
        "Variant" => Ok("Variant".to_string()),
        "Nil" => Ok(match kind {
            CtxKind::Return => "()".to_string(),
            _ => "Variant".to_string(),
        }),
        "void" | "" => Ok("()".to_string()),
        "void*" => Ok("*mut c_void".to_string()),
        other if is_pointer_token(other) => {
            // Only the opaque `void*` shape is expressible; everything else
            // makes the surrounding method skippable, which the caller
            // decides. Resolving it here is still an error.
            Err(CodegenError::unknown_type(other, where_))
        }
        other => {
            if ctx.builtin_map.contains_key(other)
                || ctx.is_object_class(other)
                || ctx.is_struct(other)
            {
                Ok(other.to_string())
            } else {
                Err(CodegenError::unknown_type(other, where_))
            }
        }
    }
}

fn int_type(meta: Option<&str>, kind: CtxKind) -> &'static str {
    match meta {
        Some("int8") => "i8",
        Some("int16") => "i16",
        Some("int32") => "i32",
        Some("int64") => "i64",
        Some("uint8") => "u8",
        Some("uint16") => "u16",
        Some("uint32") => "u32",
        Some("uint64") => "u64",
        Some("char16") => "u16",
        Some("char32") => "u32",
        _ => {
            if kind.is_member() {
                "i32"
            } else {
                "i64"
            }
        }
    }
}

/// Real widths: member layouts honor the configuration's meta tag, but in
/// argument and return position the engine always passes the wide width,
/// so the `float` meta is deliberately ignored there.
fn float_type(meta: Option<&str>, kind: CtxKind) -> &'static str {
    if kind.is_member() {
        match meta {
            Some("double") => "f64",
            _ => "f32",
        }
    } else {
        "f64"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::fixture_context;

    #[test]
    fn test_untagged_int_widens_by_context() {
        let ctx = fixture_context();
        assert_eq!(
            map_type(&ctx, "int", None, CtxKind::Argument, "t").expect("maps"),
            "i64"
        );
        assert_eq!(
            map_type(&ctx, "int", None, CtxKind::BuiltinMember, "t").expect("maps"),
            "i32"
        );
        assert_eq!(
            map_type(&ctx, "int", Some("uint32"), CtxKind::Argument, "t").expect("maps"),
            "u32"
        );
    }

    #[test]
    fn test_float_meta_ignored_outside_members() {
        let ctx = fixture_context();
        // The `float` meta narrows a member, but never an argument.
        assert_eq!(
            map_type(&ctx, "float", Some("float"), CtxKind::Argument, "t").expect("maps"),
            "f64"
        );
        assert_eq!(
            map_type(&ctx, "float", Some("float"), CtxKind::Return, "t").expect("maps"),
            "f64"
        );
        assert_eq!(
            map_type(&ctx, "float", Some("float"), CtxKind::BuiltinMember, "t").expect("maps"),
            "f32"
        );
        assert_eq!(
            map_type(&ctx, "float", Some("double"), CtxKind::NativeField, "t").expect("maps"),
            "f64"
        );
    }

    #[test]
    fn test_prefixed_tokens() {
        let ctx = fixture_context();
        assert_eq!(
            map_type(&ctx, "enum::Node.ProcessMode", None, CtxKind::Argument, "t").expect("maps"),
            "NodeProcessMode"
        );
        assert_eq!(
            map_type(&ctx, "enum::Error", None, CtxKind::Return, "t").expect("maps"),
            "EmberError"
        );
        assert_eq!(
            map_type(&ctx, "bitfield::MethodFlags", None, CtxKind::Argument, "t").expect("maps"),
            "MethodFlags"
        );
        assert_eq!(
            map_type(&ctx, "typedarray::Vector2", None, CtxKind::Argument, "t").expect("maps"),
            "TypedArray<Vector2>"
        );
    }

    #[test]
    fn test_core_tokens() {
        let ctx = fixture_context();
        assert_eq!(
            map_type(&ctx, "String", None, CtxKind::Argument, "t").expect("maps"),
            "GString"
        );
        assert_eq!(
            map_type(&ctx, "Array", None, CtxKind::Argument, "t").expect("maps"),
            "VarArray"
        );
        assert_eq!(
            map_type(&ctx, "void*", None, CtxKind::Argument, "t").expect("maps"),
            "*mut c_void"
        );
        assert_eq!(
            map_type(&ctx, "Node", None, CtxKind::Argument, "t").expect("maps"),
            "Node"
        );
    }

    #[test]
    fn test_unknown_token_is_fatal() {
        let ctx = fixture_context();
        let err = map_type(&ctx, "Ghost", None, CtxKind::Argument, "Node.spook")
            .expect_err("must fail");
        assert!(matches!(
            err,
            CodegenError::UnknownType { ref type_name, ref context }
                if type_name == "Ghost" && context == "Node.spook"
        ));
    }

    #[test]
    fn test_non_void_pointer_is_unresolvable() {
        let ctx = fixture_context();
        assert!(is_pointer_token("const uint8_t**"));
        assert!(map_type(&ctx, "const uint8_t**", None, CtxKind::Argument, "t").is_err());
    }
}
