//! Native fixed-layout structure emission.
//!
//! Native structures arrive as a compact `"type name;type name"` format
//! string. They must match the engine's C layout exactly, so any field the
//! host cannot lay out identically (pointers, inline arrays) disqualifies
//! the whole structure. Enum-typed fields are stored at the engine's i32
//! width with converting accessors.

use embergen_schema::model::NativeStructure;
use tracing::warn;

use crate::classify::{flatten_qualified, map_type, CtxKind};
use crate::context::GenerationContext;
use crate::error::CodegenError;
use crate::naming::escape_ident;
use crate::printer::Printer;

/// One parsed field of a native structure format string.
#[derive(Debug, PartialEq, Eq)]
enum FieldKind {
    /// Directly representable; carries the Rust type text.
    Plain(String),
    /// Engine-side enum stored as i32, exposed through accessors.
    Enum(String),
    /// Pointer or inline array; disqualifies the structure.
    Unsupported,
}

#[derive(Debug)]
struct Field {
    name: String,
    kind: FieldKind,
}

/// C scalar spellings that appear in native structure formats.
fn c_scalar(token: &str, ctx: &GenerationContext) -> Option<&'static str> {
    Some(match token {
        "int8_t" => "i8",
        "uint8_t" => "u8",
        "int16_t" => "i16",
        "uint16_t" => "u16",
        "int32_t" | "int" => "i32",
        "uint32_t" => "u32",
        "int64_t" => "i64",
        "uint64_t" => "u64",
        "float" => "f32",
        "double" => "f64",
        "bool" => "bool",
        // real_t follows the build configuration's precision half.
        "real_t" => {
            if ctx.build_configuration.starts_with("double") {
                "f64"
            } else {
                "f32"
            }
        }
        _ => return None,
    })
}

fn parse_field(ctx: &GenerationContext, entry: &str, where_: &str) -> Result<Field, CodegenError> {
    // Defaults ("= 1.0") document the engine side only.
    let entry = entry.split('=').next().unwrap_or(entry).trim();
    let (type_part, name_part) = match entry.rsplit_once(' ') {
        Some(parts) => parts,
        None => {
            return Ok(Field {
                name: entry.to_string(),
                kind: FieldKind::Unsupported,
            })
        }
    };
    let mut name = name_part.trim().to_string();
    let mut type_text = type_part.trim().to_string();

    if name.starts_with('*') {
        type_text.push('*');
        name = name.trim_start_matches('*').to_string();
    }
    if type_text.contains('*') || name.contains('[') {
        return Ok(Field {
            name,
            kind: FieldKind::Unsupported,
        });
    }
    if type_text.contains("::") {
        return Ok(Field {
            name,
            kind: FieldKind::Enum(flatten_qualified(&type_text.replace("::", "."))),
        });
    }
    if let Some(scalar) = c_scalar(&type_text, ctx) {
        return Ok(Field {
            name,
            kind: FieldKind::Plain(scalar.to_string()),
        });
    }
    let mapped = map_type(ctx, &type_text, None, CtxKind::NativeField, where_)?;
    Ok(Field {
        name,
        kind: FieldKind::Plain(mapped),
    })
}

/// Emits one native structure; unsupported fields skip the whole
/// structure with a log.
///
/// # Errors
/// Fatal on unresolvable (non-pointer) field types.
pub fn generate_native_structure(
    ctx: &GenerationContext,
    def: &NativeStructure,
    p: &mut Printer,
) -> Result<(), CodegenError> {
    let name = def.name.as_str();
    let mut fields: Vec<Field> = Vec::new();
    for entry in def.format.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let field = parse_field(ctx, entry, &format!("{name}.{entry}"))?;
        if field.kind == FieldKind::Unsupported {
            warn!(structure = name, field = %field.name, "unsupported field shape, skipping structure");
            return Ok(());
        }
        fields.push(field);
    }

    p.line("#[repr(C)]");
    p.line("#[derive(Debug, Clone, Copy)]");
    p.block(&format!("pub struct {name}"), |p| {
        for field in &fields {
            let ident = escape_ident(&field.name);
            match &field.kind {
                FieldKind::Plain(ty) => p.line(&format!("pub {ident}: {ty},")),
                // Layout keeps the engine's i32 width; access goes through
                // the converting methods below.
                FieldKind::Enum(_) => p.line(&format!("{ident}: i32,")),
                FieldKind::Unsupported => unreachable!(),
            }
        }
    });
    p.blank();

    let enum_fields: Vec<(&str, &str)> = fields
        .iter()
        .filter_map(|f| match &f.kind {
            FieldKind::Enum(ty) => Some((f.name.as_str(), ty.as_str())),
            _ => None,
        })
        .collect();
    if !enum_fields.is_empty() {
        p.block(&format!("impl {name}"), |p| {
            for (field, ty) in &enum_fields {
                let ident = escape_ident(field);
                p.line("#[must_use]");
                p.block(&format!("pub fn {ident}(&self) -> {ty}"), |p| {
                    p.line(&format!(
                        "{ty}::from_raw(i64::from(self.{ident})).expect(\"invalid enum field\")"
                    ));
                });
                p.blank();
                p.block(&format!("pub fn set_{ident}(&mut self, value: {ty})"), |p| {
                    // Truncating write mirrors the engine's storage width.
                    p.line(&format!("self.{ident} = value.raw() as i32;"));
                });
                p.blank();
            }
        });
        p.blank();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::fixture_context;

    fn generate(name: &str) -> String {
        let ctx = fixture_context();
        let def = ctx
            .api
            .native_structures
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .expect("fixture has structure");
        let mut p = Printer::new();
        generate_native_structure(&ctx, &def, &mut p).expect("generates");
        p.finish()
    }

    #[test]
    fn test_plain_structure_emitted_with_c_layout() {
        let out = generate("AudioFrame");
        assert!(out.contains("#[repr(C)]"));
        assert!(out.contains("pub struct AudioFrame"));
        assert!(out.contains("pub left: f32,"));
        assert!(out.contains("pub right: f32,"));
    }

    #[test]
    fn test_pointer_field_skips_whole_structure() {
        // ObjectPeek has an `Object *obj` field; nothing is emitted, and
        // the sibling structures are unaffected.
        assert!(generate("ObjectPeek").is_empty());
        assert!(!generate("AudioFrame").is_empty());
    }

    #[test]
    fn test_enum_field_stored_as_i32_with_accessors() {
        let out = generate("CaretInfo");
        assert!(out.contains("leading_direction: i32,"));
        assert!(out.contains("pub fn leading_direction(&self) -> TextServerDirection"));
        assert!(out
            .contains("TextServerDirection::from_raw(i64::from(self.leading_direction))"));
        assert!(out.contains("pub fn set_leading_direction(&mut self, value: TextServerDirection)"));
        assert!(out.contains("self.leading_direction = value.raw() as i32;"));
    }
}
