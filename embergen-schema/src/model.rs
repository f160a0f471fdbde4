//! Schema data model.
//!
//! Mirrors the engine's `extension_api.json` document. Field names map to the
//! wire keys exactly; the wire format is the only coupling to the schema
//! producer, so renames here are deliberate and rare (`type` is a keyword).

use serde::Deserialize;

/// Root of the extension API description.
///
/// Built once per run and immutable thereafter.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDescription {
    /// Engine version header.
    pub header: Header,
    /// Per-build-configuration byte sizes for builtin value types.
    pub builtin_class_sizes: Vec<BuildConfigSizes>,
    /// Per-build-configuration member offsets for builtin value types.
    pub builtin_class_member_offsets: Vec<BuildConfigMemberOffsets>,
    /// Global constants; opaque, not consumed by the generator.
    #[serde(default)]
    pub global_constants: Vec<serde_json::Value>,
    /// Global enumerations and bitfields.
    pub global_enums: Vec<EnumDef>,
    /// Global utility functions.
    pub utility_functions: Vec<MethodDef>,
    /// Builtin value types.
    pub builtin_classes: Vec<BuiltinClass>,
    /// Object classes.
    pub classes: Vec<ObjectClass>,
    /// Singleton registrations.
    pub singletons: Vec<NameAndType>,
    /// Native fixed-layout structure descriptions.
    pub native_structures: Vec<NativeStructure>,
}

/// Engine version information.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    /// Major version.
    pub version_major: u32,
    /// Minor version.
    pub version_minor: u32,
    /// Patch version.
    pub version_patch: u32,
    /// Release status (e.g. "stable").
    pub version_status: String,
    /// Build tag.
    pub version_build: String,
    /// Human-readable version string.
    pub version_full_name: String,
}

/// Byte sizes of builtin value types for one build configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfigSizes {
    /// Configuration name (e.g. "float_64").
    pub build_configuration: String,
    /// Size entries, one per builtin type.
    pub sizes: Vec<SizeEntry>,
}

/// Size of one builtin type in bytes.
#[derive(Debug, Clone, Deserialize)]
pub struct SizeEntry {
    /// Type name.
    pub name: String,
    /// Size in bytes.
    pub size: usize,
}

/// Member offsets of builtin value types for one build configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfigMemberOffsets {
    /// Configuration name.
    pub build_configuration: String,
    /// Offset tables, one per builtin type.
    pub classes: Vec<MemberOffsetClass>,
}

/// Member offset table for one builtin type.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberOffsetClass {
    /// Type name.
    pub name: String,
    /// Member entries in declaration order.
    pub members: Vec<MemberOffset>,
}

/// Offset and width of one builtin member.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberOffset {
    /// Member name.
    pub member: String,
    /// Byte offset within the type.
    pub offset: usize,
    /// Numeric width tag for the member.
    pub meta: String,
}

/// An enumeration or bitfield definition.
#[derive(Debug, Clone, Deserialize)]
pub struct EnumDef {
    /// Enum name; may be dotted for nested enums (e.g. "Variant.Type").
    pub name: String,
    /// True if this enum is a flag set.
    #[serde(default)]
    pub is_bitfield: bool,
    /// Ordered (name, value) entries; wire order is significant for
    /// first-duplicate-wins aliasing.
    pub values: Vec<EnumValue>,
}

/// One enumeration entry.
#[derive(Debug, Clone, Deserialize)]
pub struct EnumValue {
    /// Entry name, usually SCREAMING_SNAKE with a shared prefix.
    pub name: String,
    /// Integer value.
    pub value: i64,
}

/// A method, constructor-like callable, or utility function.
///
/// The three wire shapes (builtin method, class method, utility function)
/// share this model; fields absent on a given shape decode to their defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodDef {
    /// Method name.
    pub name: String,
    /// Return type token for builtin methods and utility functions.
    #[serde(default)]
    pub return_type: Option<String>,
    /// Return type and numeric meta for class methods.
    #[serde(default)]
    pub return_value: Option<ReturnValue>,
    /// Utility function category (e.g. "math").
    #[serde(default)]
    pub category: Option<String>,
    /// True for const methods.
    #[serde(default)]
    pub is_const: bool,
    /// True for variadic methods.
    #[serde(default)]
    pub is_vararg: bool,
    /// True for static methods.
    #[serde(default)]
    pub is_static: bool,
    /// True for overridable methods.
    #[serde(default)]
    pub is_virtual: bool,
    /// Stable hash used for native pointer resolution. Absent for
    /// pure-virtual declaration points, which are never directly callable.
    #[serde(default)]
    pub hash: Option<i64>,
    /// Arguments in declaration order.
    #[serde(default)]
    pub arguments: Option<Vec<ArgumentDef>>,
}

impl MethodDef {
    /// Returns the declared return type token and meta, merging the two wire
    /// shapes. `None` means the method returns nothing.
    #[must_use]
    pub fn return_info(&self) -> Option<(&str, Option<&str>)> {
        if let Some(rv) = &self.return_value {
            return Some((rv.ty.as_str(), rv.meta.as_deref()));
        }
        self.return_type.as_deref().map(|t| (t, None))
    }

    /// Arguments as a slice, empty when absent.
    #[must_use]
    pub fn args(&self) -> &[ArgumentDef] {
        self.arguments.as_deref().unwrap_or(&[])
    }
}

/// Return type of a class method.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnValue {
    /// Type token.
    #[serde(rename = "type")]
    pub ty: String,
    /// Numeric width tag.
    #[serde(default)]
    pub meta: Option<String>,
}

/// One method or constructor argument.
#[derive(Debug, Clone, Deserialize)]
pub struct ArgumentDef {
    /// Argument name.
    pub name: String,
    /// Type token, possibly prefixed `enum::`, `bitfield::` or `typedarray::`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Textual default literal, free-form.
    #[serde(default)]
    pub default_value: Option<String>,
    /// Numeric width tag.
    #[serde(default)]
    pub meta: Option<String>,
}

/// A builtin value type definition.
#[derive(Debug, Clone, Deserialize)]
pub struct BuiltinClass {
    /// Type name.
    pub name: String,
    /// True if the type supports keyed indexing (dictionary-like).
    pub is_keyed: bool,
    /// Operator definitions.
    pub operators: Vec<OperatorDef>,
    /// Indexed constructors.
    pub constructors: Vec<ConstructorDef>,
    /// True when a destructor must be invoked on drop.
    pub has_destructor: bool,
    /// Element type for integer indexing, if any.
    #[serde(default)]
    pub indexing_return_type: Option<String>,
    /// Methods.
    #[serde(default)]
    pub methods: Option<Vec<MethodDef>>,
    /// Field members; present only for struct-represented types.
    #[serde(default)]
    pub members: Option<Vec<NameAndType>>,
    /// Typed constants.
    #[serde(default)]
    pub constants: Option<Vec<BuiltinConstant>>,
    /// Nested enums.
    #[serde(default)]
    pub enums: Option<Vec<EnumDef>>,
}

/// One operator definition on a builtin type.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorDef {
    /// Operator token (e.g. "+", "==", "unary-").
    pub name: String,
    /// Right-hand operand type, absent for unary operators.
    #[serde(default)]
    pub right_type: Option<String>,
    /// Result type.
    pub return_type: String,
}

/// One indexed constructor on a builtin type.
#[derive(Debug, Clone, Deserialize)]
pub struct ConstructorDef {
    /// Constructor index used for native resolution.
    pub index: usize,
    /// Arguments, absent for the default constructor.
    #[serde(default)]
    pub arguments: Option<Vec<ArgumentDef>>,
}

impl ConstructorDef {
    /// Arguments as a slice, empty when absent.
    #[must_use]
    pub fn args(&self) -> &[ArgumentDef] {
        self.arguments.as_deref().unwrap_or(&[])
    }
}

/// A typed constant on a builtin type.
#[derive(Debug, Clone, Deserialize)]
pub struct BuiltinConstant {
    /// Constant name.
    pub name: String,
    /// Type token.
    #[serde(rename = "type")]
    pub ty: String,
    /// Free-form value text, often constructor-call shaped.
    pub value: String,
}

/// An object class definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectClass {
    /// Class name.
    pub name: String,
    /// True when instances are reference counted.
    pub is_refcounted: bool,
    /// True when instances can be constructed directly.
    pub is_instantiable: bool,
    /// Single parent class name; absent only for the root class.
    #[serde(default)]
    pub inherits: Option<String>,
    /// API surface the class belongs to ("core" or "editor").
    pub api_type: String,
    /// Nested enums.
    #[serde(default)]
    pub enums: Option<Vec<EnumDef>>,
    /// Methods.
    #[serde(default)]
    pub methods: Option<Vec<MethodDef>>,
    /// Properties bound to getter/setter methods.
    #[serde(default)]
    pub properties: Option<Vec<PropertyDef>>,
    /// Signals.
    #[serde(default)]
    pub signals: Option<Vec<SignalDef>>,
    /// Integer constants.
    #[serde(default)]
    pub constants: Option<Vec<EnumValue>>,
}

impl ObjectClass {
    /// Methods as a slice, empty when absent.
    #[must_use]
    pub fn method_list(&self) -> &[MethodDef] {
        self.methods.as_deref().unwrap_or(&[])
    }
}

/// A property wired to getter/setter methods.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    /// Declared property type token.
    #[serde(rename = "type")]
    pub ty: String,
    /// Property name.
    pub name: String,
    /// Setter method name, absent for read-only properties.
    #[serde(default)]
    pub setter: Option<String>,
    /// Getter method name.
    pub getter: String,
    /// Index passed to the accessor methods, if any.
    #[serde(default)]
    pub index: Option<i64>,
}

/// A signal declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalDef {
    /// Signal name.
    pub name: String,
    /// Signal arguments.
    #[serde(default)]
    pub arguments: Option<Vec<NameAndType>>,
}

/// A (name, type) pair used for members, singletons and signal arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameAndType {
    /// Name.
    pub name: String,
    /// Type token.
    #[serde(rename = "type")]
    pub ty: String,
}

/// A native fixed-layout structure description.
#[derive(Debug, Clone, Deserialize)]
pub struct NativeStructure {
    /// Structure name.
    pub name: String,
    /// Compact `"type name; type name; ..."` field list.
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_def_decodes_builtin_shape() {
        let json = r#"{
            "name": "angle",
            "return_type": "float",
            "is_vararg": false,
            "is_const": true,
            "is_static": false,
            "hash": 1234
        }"#;
        let m: MethodDef = serde_json::from_str(json).expect("decode");
        assert_eq!(m.name, "angle");
        assert_eq!(m.return_info(), Some(("float", None)));
        assert!(m.is_const);
        assert!(!m.is_virtual);
        assert_eq!(m.hash, Some(1234));
        assert!(m.args().is_empty());
    }

    #[test]
    fn test_method_def_decodes_class_shape() {
        let json = r#"{
            "name": "_process",
            "is_const": false,
            "is_vararg": false,
            "is_static": false,
            "is_virtual": true,
            "return_value": { "type": "int", "meta": "int32" },
            "arguments": [
                { "name": "delta", "type": "float", "meta": "double" }
            ]
        }"#;
        let m: MethodDef = serde_json::from_str(json).expect("decode");
        assert!(m.is_virtual);
        assert!(m.hash.is_none());
        assert_eq!(m.return_info(), Some(("int", Some("int32"))));
        assert_eq!(m.args().len(), 1);
        assert_eq!(m.args()[0].meta.as_deref(), Some("double"));
    }

    #[test]
    fn test_enum_def_is_bitfield_defaults_false() {
        let json = r#"{ "name": "Side", "values": [{ "name": "SIDE_LEFT", "value": 0 }] }"#;
        let e: EnumDef = serde_json::from_str(json).expect("decode");
        assert!(!e.is_bitfield);
        assert_eq!(e.values[0].value, 0);
    }

    #[test]
    fn test_argument_type_key_renamed() {
        let json = r#"{ "name": "from", "type": "Vector2", "default_value": "Vector2(0, 0)" }"#;
        let a: ArgumentDef = serde_json::from_str(json).expect("decode");
        assert_eq!(a.ty, "Vector2");
        assert_eq!(a.default_value.as_deref(), Some("Vector2(0, 0)"));
    }
}
