//! Identifier and case conversion helpers for emitted Rust source.

/// Rust keywords that must be escaped as raw identifiers in emitted code.
const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "box", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// Escapes a name that collides with a Rust keyword.
#[must_use]
pub fn escape_ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Returns true if the name is usable as an emitted identifier.
#[must_use]
pub fn is_valid_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Converts a PascalCase type name to SCREAMING_SNAKE, collapsing the
/// dimensional suffixes the engine uses (`Transform2D` stays `TRANSFORM2D`).
#[must_use]
pub fn type_name_to_screaming(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            // Do not split inside an acronym run or after a digit suffix
            // ("2D" / "3D" / "4D" stay attached).
            let prev_breaks = prev.is_lowercase() || prev.is_ascii_digit();
            let digit_suffix = prev.is_ascii_digit() && (c == 'D' || c == 'I');
            if prev_breaks && !digit_suffix {
                result.push('_');
            }
        }
        result.push(c.to_ascii_uppercase());
    }
    result
}

/// Strips a prefix from an enum value name, falling back to the full name
/// when the remainder is not a valid identifier.
#[must_use]
pub fn drop_prefix<'a>(name: &'a str, prefix: &str) -> &'a str {
    match name.strip_prefix(prefix) {
        Some(stripped) if is_valid_ident(stripped) => stripped,
        _ => name,
    }
}
