//! Enum and flag-set emission.
//!
//! Engine enums arrive with fully-prefixed SCREAMING value names
//! (`SIDE_LEFT`). The shared prefix is derived per enum and stripped, the
//! stripped names are kept verbatim, and bitfield enums are emitted as
//! flag-set structs instead of Rust enums.

use embergen_schema::model::{EnumDef, EnumValue};

use crate::classify::{flag_set_name, flatten_qualified};
use crate::naming::drop_prefix;
use crate::printer::Printer;

/// Derives the shared value-name prefix for an enum.
///
/// The names are sorted and only the first and last are compared; their
/// common run is truncated back to the final underscore so a partial word
/// never counts as prefix.
#[must_use]
pub fn common_prefix(values: &[EnumValue]) -> String {
    if values.len() < 2 {
        return String::new();
    }
    let mut names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
    names.sort_unstable();
    let first = names[0].as_bytes();
    let last = names[names.len() - 1].as_bytes();
    let mut common = 0;
    while common < first.len() && common < last.len() && first[common] == last[common] {
        common += 1;
    }
    let run = &names[0][..common];
    match run.rfind('_') {
        Some(idx) => run[..=idx].to_string(),
        None => String::new(),
    }
}

/// Emitted case name for one enum value: prefix stripped, original kept
/// when stripping would leave an invalid identifier.
#[must_use]
pub fn case_name<'a>(value: &'a EnumValue, prefix: &str) -> &'a str {
    drop_prefix(&value.name, prefix)
}

/// Emits one enum (or flag-set, when `is_bitfield`) under its qualified
/// name; `owner` is the enclosing type for nested enums.
pub fn generate_enum(p: &mut Printer, en: &EnumDef, owner: Option<&str>) {
    let qualified = match owner {
        Some(owner) => format!("{owner}.{}", en.name),
        None => en.name.clone(),
    };
    let flat = flatten_qualified(&qualified);
    if en.is_bitfield {
        generate_flag_set(p, en, &flat);
    } else {
        generate_plain_enum(p, en, &flat);
    }
}

fn generate_plain_enum(p: &mut Printer, en: &EnumDef, flat: &str) {
    let prefix = common_prefix(&en.values);
    p.line("#[repr(i64)]");
    p.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
    let mut seen: Vec<i64> = Vec::new();
    p.block(&format!("pub enum {flat}"), |p| {
        for value in &en.values {
            let name = case_name(value, &prefix);
            if seen.contains(&value.value) {
                // Alias of an earlier case; Rust enums reject duplicate
                // discriminants, so keep it as documentation.
                p.line(&format!("// {name} = {}, (alias)", value.value));
            } else {
                seen.push(value.value);
                p.line(&format!("{name} = {},", value.value));
            }
        }
    });
    p.blank();
    p.block(&format!("impl {flat}"), |p| {
        p.block("pub fn from_raw(raw: i64) -> Option<Self>", |p| {
            p.block("match raw", |p| {
                let mut emitted: Vec<i64> = Vec::new();
                for value in &en.values {
                    if emitted.contains(&value.value) {
                        continue;
                    }
                    emitted.push(value.value);
                    let name = case_name(value, &prefix);
                    p.line(&format!("{} => Some(Self::{name}),", value.value));
                }
                p.line("_ => None,");
            });
        });
        p.blank();
        p.block("pub const fn raw(self) -> i64", |p| {
            p.line("self as i64");
        });
    });
    p.blank();
}

fn generate_flag_set(p: &mut Printer, en: &EnumDef, flat: &str) {
    let name = flag_set_name(flat);
    let prefix = common_prefix(&en.values);
    p.line("#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]");
    p.line(&format!("pub struct {name}(pub u64);"));
    p.blank();
    let mut seen: Vec<i64> = Vec::new();
    p.block(&format!("impl {name}"), |p| {
        for value in &en.values {
            let case = case_name(value, &prefix);
            if value.value == 0 {
                // Zero is the empty set; `Default` already covers it.
                continue;
            }
            if seen.contains(&value.value) {
                p.line(&format!("// {case} = {}, (alias)", value.value));
                continue;
            }
            seen.push(value.value);
            p.line(&format!("pub const {case}: Self = Self({});", value.value));
        }
        p.blank();
        p.block("pub const fn contains(self, other: Self) -> bool", |p| {
            p.line("self.0 & other.0 == other.0");
        });
    });
    p.blank();
    p.block(&format!("impl std::ops::BitOr for {name}"), |p| {
        p.line("type Output = Self;");
        p.block("fn bitor(self, rhs: Self) -> Self", |p| {
            p.line("Self(self.0 | rhs.0)");
        });
    });
    p.blank();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(name: &str, value: i64) -> EnumValue {
        EnumValue {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_common_prefix_strips_to_underscore() {
        let values = vec![ev("SIDE_LEFT", 0), ev("SIDE_TOP", 1), ev("SIDE_RIGHT", 2)];
        assert_eq!(common_prefix(&values), "SIDE_");
        assert_eq!(case_name(&values[0], "SIDE_"), "LEFT");
        assert_eq!(case_name(&values[1], "SIDE_"), "TOP");
        assert_eq!(case_name(&values[2], "SIDE_"), "RIGHT");
    }

    #[test]
    fn test_prefix_never_splits_mid_word() {
        // Common run is "KEY_SP"; only "KEY_" is a prefix.
        let values = vec![ev("KEY_SPACE", 0), ev("KEY_SPECIAL", 1)];
        assert_eq!(common_prefix(&values), "KEY_");
    }

    #[test]
    fn test_single_value_keeps_full_name() {
        let values = vec![ev("ONLY_ONE", 7)];
        assert_eq!(common_prefix(&values), "");
        assert_eq!(case_name(&values[0], ""), "ONLY_ONE");
    }

    #[test]
    fn test_digit_leading_remainder_keeps_full_name() {
        let values = vec![ev("KEY_0", 48), ev("KEY_1", 49)];
        let prefix = common_prefix(&values);
        assert_eq!(prefix, "KEY_");
        assert_eq!(case_name(&values[0], &prefix), "KEY_0");
    }

    #[test]
    fn test_duplicate_value_becomes_commented_alias() {
        let en = EnumDef {
            name: "MethodFlags".to_string(),
            is_bitfield: false,
            values: vec![
                ev("METHOD_FLAG_NORMAL", 1),
                ev("METHOD_FLAG_CONST", 4),
                ev("METHOD_FLAGS_DEFAULT", 1),
            ],
        };
        let mut p = Printer::new();
        generate_enum(&mut p, &en, None);
        let out = p.finish();
        assert!(out.contains("FLAG_NORMAL = 1,"));
        assert!(out.contains("// FLAGS_DEFAULT = 1, (alias)"));
        // The alias never reappears in from_raw.
        assert_eq!(out.matches("=> Some(").count(), 2);
    }

    #[test]
    fn test_bitfield_omits_zero_and_emits_struct() {
        let en = EnumDef {
            name: "OpenFlags".to_string(),
            is_bitfield: true,
            values: vec![
                ev("OPEN_FLAG_NONE", 0),
                ev("OPEN_FLAG_READ", 1),
                ev("OPEN_FLAG_EXEC", 4),
            ],
        };
        let mut p = Printer::new();
        generate_enum(&mut p, &en, None);
        let out = p.finish();
        assert!(out.contains("pub struct OpenFlags(pub u64);"));
        assert!(out.contains("pub const READ: Self = Self(1);"));
        assert!(out.contains("pub const EXEC: Self = Self(4);"));
        assert!(!out.contains("NONE"));
        assert!(out.contains("impl std::ops::BitOr for OpenFlags"));
    }

    #[test]
    fn test_nested_enum_flattens_owner() {
        let en = EnumDef {
            name: "ProcessMode".to_string(),
            is_bitfield: false,
            values: vec![
                ev("PROCESS_MODE_INHERIT", 0),
                ev("PROCESS_MODE_ALWAYS", 3),
            ],
        };
        let mut p = Printer::new();
        generate_enum(&mut p, &en, Some("Node"));
        let out = p.finish();
        assert!(out.contains("pub enum NodeProcessMode"));
        assert!(out.contains("INHERIT = 0,"));
    }
}
