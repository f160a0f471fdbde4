//! Default-argument literal translation.
//!
//! The schema carries default values as engine-syntax source text
//! (`Vector2(1, 0)`, `&"id"`, `null`). This module turns each of them into
//! Rust expression text, or `None` when the literal cannot be reconstructed
//! (the caller then omits the default and the diagnostic is logged here).

use tracing::warn;

use crate::classify::{enum_type_name, flag_set_name, flatten_qualified, rust_builtin_name};
use crate::context::GenerationContext;
use crate::enums::{case_name, common_prefix};

/// Flat scalar field labels for composite types whose schema constructors
/// do not cover the flat literal form the defaults use.
const FLAT_COMPONENTS: &[(&str, &[&str])] = &[
    ("Vector2", &["x", "y"]),
    ("Vector2i", &["x", "y"]),
    ("Vector3", &["x", "y", "z"]),
    ("Vector3i", &["x", "y", "z"]),
    ("Vector4", &["x", "y", "z", "w"]),
    ("Vector4i", &["x", "y", "z", "w"]),
    ("Color", &["r", "g", "b", "a"]),
    ("Rect2", &["x", "y", "width", "height"]),
    ("Rect2i", &["x", "y", "width", "height"]),
    ("Plane", &["a", "b", "c", "d"]),
    ("Quaternion", &["x", "y", "z", "w"]),
    (
        "AABB",
        &["px", "py", "pz", "sx", "sy", "sz"],
    ),
    (
        "Basis",
        &["xx", "xy", "xz", "yx", "yy", "yz", "zx", "zy", "zz"],
    ),
    ("Transform2D", &["xx", "xy", "yx", "yy", "ox", "oy"]),
    (
        "Transform3D",
        &[
            "xx", "xy", "xz", "yx", "yy", "yz", "zx", "zy", "zz", "ox", "oy", "oz",
        ],
    ),
    (
        "Projection",
        &[
            "xx", "xy", "xz", "xw", "yx", "yy", "yz", "yw", "zx", "zy", "zz", "zw", "wx", "wy",
            "wz", "ww",
        ],
    ),
];

/// Translates one default literal into Rust expression text.
///
/// `declared` is the argument's schema type token; `where_` names the
/// owner and argument for diagnostics. `None` means the default could not
/// be expressed and should be dropped.
#[must_use]
pub fn translate_default(
    ctx: &GenerationContext,
    declared: &str,
    raw: &str,
    where_: &str,
) -> Option<String> {
    let raw = raw.trim();

    if raw == "null" {
        return Some(if ctx.is_object_class(declared) {
            "None".to_string()
        } else {
            "Variant::nil()".to_string()
        });
    }

    if let Some(inner) = declared.strip_prefix("enum::") {
        return translate_enum_default(ctx, inner, raw, where_);
    }
    if let Some(inner) = declared.strip_prefix("bitfield::") {
        return Some(translate_bitfield_default(ctx, inner, raw));
    }

    match declared {
        "int" => return Some(raw.to_string()),
        "bool" => return Some(raw.to_string()),
        "float" => return Some(normalize_float(raw, "f64")),
        "String" => {
            return Some(format!("GString::from({raw})"));
        }
        "StringName" => {
            // Interned-name literals carry a leading `&` sigil.
            let text = raw.strip_prefix('&').unwrap_or(raw);
            return Some(format!("StringName::from({text})"));
        }
        _ => {}
    }

    if raw == "[]" {
        return Some(if declared.starts_with("typedarray::") {
            "TypedArray::new()".to_string()
        } else {
            "VarArray::new()".to_string()
        });
    }
    if raw == "{}" {
        return Some("Dictionary::new()".to_string());
    }
    if (raw.starts_with('[') || raw.starts_with('{')) && raw.len() > 2 {
        warn!(literal = raw, context = where_, "unreconstructable collection default, omitting");
        return None;
    }

    if let Some((type_name, args)) = split_constructor(raw) {
        return translate_constructor(ctx, type_name, &args, where_);
    }

    // Bare scalar of some other declared type (e.g. a Variant-typed 0).
    Some(raw.to_string())
}

fn translate_enum_default(
    ctx: &GenerationContext,
    qualified: &str,
    raw: &str,
    where_: &str,
) -> Option<String> {
    let value: i64 = raw.parse().ok()?;
    let Some(def) = ctx.enum_registry.get(qualified) else {
        warn!(enum_name = qualified, context = where_, "enum default lookup missed, omitting");
        return None;
    };
    let prefix = common_prefix(&def.values);
    let case = def.values.iter().find(|v| v.value == value)?;
    Some(format!(
        "{}::{}",
        enum_type_name(qualified),
        case_name(case, &prefix)
    ))
}

fn translate_bitfield_default(ctx: &GenerationContext, qualified: &str, raw: &str) -> String {
    let name = flag_set_name(&flatten_qualified(qualified));
    let Ok(value) = raw.parse::<u64>() else {
        return format!("{name}::default()");
    };
    if value == 0 {
        return format!("{name}::default()");
    }
    let mut parts: Vec<String> = Vec::new();
    let mut remaining = value;
    if let Some(def) = ctx.enum_registry.get(qualified) {
        let prefix = common_prefix(&def.values);
        for flag in &def.values {
            let bits = flag.value as u64;
            if bits != 0 && remaining & bits == bits {
                parts.push(format!("{name}::{}", case_name(flag, &prefix)));
                remaining &= !bits;
            }
        }
    }
    if remaining != 0 || parts.is_empty() {
        return format!("{name}({value})");
    }
    parts.join(" | ")
}

fn translate_constructor(
    ctx: &GenerationContext,
    type_name: &str,
    args: &[&str],
    where_: &str,
) -> Option<String> {
    if type_name == "Variant" && args.is_empty() {
        return Some("Variant::nil()".to_string());
    }
    if args.is_empty() {
        return Some(format!("{type_name}::default()"));
    }

    // Prefer the schema constructor whose arity matches; its argument names
    // mirror the member labels for struct-represented builtins.
    if let Some(builtin) = ctx.builtin_map.get(type_name) {
        let matching = builtin
            .constructors
            .iter()
            .find(|c| c.args().len() == args.len());
        if let Some(ctor) = matching {
            if ctx.is_struct(type_name) {
                let fields: Vec<String> = ctor
                    .args()
                    .iter()
                    .zip(args)
                    .map(|(decl, value)| {
                        let text = if decl.ty == "float" {
                            normalize_float(value, "f32")
                        } else {
                            (*value).to_string()
                        };
                        format!("{}: {text}", decl.name)
                    })
                    .collect();
                return Some(format!("{type_name} {{ {} }}", fields.join(", ")));
            }
            // Class-represented builtin; a single argument routes through
            // its From impl. Wider constructors have no one-expression
            // Rust form, so those defaults fall through and get omitted.
            if let [single] = args {
                return Some(format!("{}::from({single})", rust_builtin_name(type_name)));
            }
        }
    }

    // Flat scalar fallback for composite literals with no matching
    // schema constructor.
    if let Some((_, labels)) = FLAT_COMPONENTS.iter().find(|(n, _)| *n == type_name) {
        if labels.len() == args.len() {
            let texts: Vec<String> = args
                .iter()
                .map(|a| normalize_float(a, "f32"))
                .collect();
            return Some(format!(
                "{type_name}::from_components({})",
                texts.join(", ")
            ));
        }
    }

    warn!(
        literal = type_name,
        context = where_,
        "no constructor shape matched default, omitting"
    );
    None
}

/// Splits `Name(a, b, c)` into the name and top-level comma-separated
/// argument texts; quotes are respected, nesting is not (the defaults the
/// schema produces are flat).
fn split_constructor(raw: &str) -> Option<(&str, Vec<&str>)> {
    let open = raw.find('(')?;
    if !raw.ends_with(')') {
        return None;
    }
    let name = &raw[..open];
    if name.is_empty() || !name.chars().next()?.is_ascii_uppercase() {
        return None;
    }
    let inner = raw[open + 1..raw.len() - 1].trim();
    if inner.is_empty() {
        return Some((name, Vec::new()));
    }
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].trim());
    Some((name, args))
}

/// Normalizes a numeric literal to valid Rust float text, mapping the
/// schema's `inf` spelling to host infinity.
fn normalize_float(raw: &str, float_ty: &str) -> String {
    match raw {
        "inf" => format!("{float_ty}::INFINITY"),
        "-inf" => format!("{float_ty}::NEG_INFINITY"),
        "nan" => format!("{float_ty}::NAN"),
        _ => {
            if raw.contains('.') || raw.contains('e') {
                raw.to_string()
            } else {
                format!("{raw}.0")
            }
        }
    }
}
