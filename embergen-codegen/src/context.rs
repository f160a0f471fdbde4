//! Shared, immutable lookup state for one generation run.
//!
//! Everything the emission tasks consult is assembled here, once, during the
//! sequential model-build phase. After `GenerationContext::build` returns the
//! context is never mutated; emission tasks hold shared references only.

use std::collections::{HashMap, HashSet};

use embergen_schema::model::{
    ApiDescription, BuiltinClass, EnumDef, MemberOffset, ObjectClass,
};

use crate::error::CodegenError;

/// How a type crosses the ABI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRepr {
    /// Copied by value; the layout is known on both sides.
    Value,
    /// Accessed through an opaque handle, never copied.
    Reference,
}

/// Content storage width for a class-represented builtin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// 4 bytes (or zero-sized sentinel).
    I32,
    /// 8 bytes.
    I64,
    /// 16 bytes.
    I64Pair,
}

impl Storage {
    /// Emitted Rust type for this storage width.
    #[must_use]
    pub const fn rust_type(self) -> &'static str {
        match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I64Pair => "[i64; 2]",
        }
    }

    /// Emitted zero initializer for this storage width.
    #[must_use]
    pub const fn zero_init(self) -> &'static str {
        match self {
            Self::I32 | Self::I64 => "0",
            Self::I64Pair => "[0; 2]",
        }
    }
}

/// Primitive tokens that are always value-represented.
const PRIMITIVES: &[&str] = &["int", "float", "bool", "void", "Nil"];

/// Immutable lookup state shared by every emission task.
#[derive(Debug)]
pub struct GenerationContext {
    /// The parsed schema, owned for the lifetime of the run.
    pub api: ApiDescription,
    /// Selected build configuration name.
    pub build_configuration: String,
    /// Byte sizes of builtin types under the selected configuration.
    pub builtin_sizes: HashMap<String, usize>,
    /// Member offset tables under the selected configuration.
    pub member_offsets: HashMap<String, Vec<MemberOffset>>,
    /// Names of value-represented types (schema members present, or primitive).
    struct_types: HashSet<String>,
    /// Object class definitions by name.
    pub class_map: HashMap<String, ObjectClass>,
    /// Builtin type definitions by name.
    pub builtin_map: HashMap<String, BuiltinClass>,
    /// Classes that appear as a parent of some other class.
    pub has_subclasses: HashSet<String>,
    /// Every enum/bitfield the run will emit, keyed by qualified name
    /// (`Name` for globals, `Owner.Name` for nested enums).
    pub enum_registry: HashMap<String, EnumDef>,
    /// Singleton class names; these classes get a shared-instance
    /// accessor instead of a constructor.
    pub singletons: HashSet<String>,
    /// Effective class filter, transitively closed over ancestors.
    /// `None` generates everything.
    class_filter: Option<HashSet<String>>,
}

impl GenerationContext {
    /// Builds the context from a parsed schema.
    ///
    /// # Errors
    /// Returns `CodegenError::UnknownBuildConfiguration` when the requested
    /// configuration has no entry in the schema's size tables.
    pub fn build(
        api: ApiDescription,
        build_configuration: &str,
        filter: &[String],
    ) -> Result<Self, CodegenError> {
        let sizes = api
            .builtin_class_sizes
            .iter()
            .find(|t| t.build_configuration == build_configuration)
            .ok_or_else(|| CodegenError::UnknownBuildConfiguration {
                name: build_configuration.to_string(),
            })?;
        let builtin_sizes: HashMap<String, usize> = sizes
            .sizes
            .iter()
            .map(|s| (s.name.clone(), s.size))
            .collect();

        let member_offsets: HashMap<String, Vec<MemberOffset>> = api
            .builtin_class_member_offsets
            .iter()
            .find(|t| t.build_configuration == build_configuration)
            .map(|t| {
                t.classes
                    .iter()
                    .map(|c| (c.name.clone(), c.members.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let mut struct_types: HashSet<String> =
            PRIMITIVES.iter().map(|s| (*s).to_string()).collect();
        for bc in &api.builtin_classes {
            if bc.members.as_ref().is_some_and(|m| !m.is_empty()) {
                struct_types.insert(bc.name.clone());
            }
        }

        let class_map: HashMap<String, ObjectClass> = api
            .classes
            .iter()
            .map(|c| (c.name.clone(), c.clone()))
            .collect();
        let builtin_map: HashMap<String, BuiltinClass> = api
            .builtin_classes
            .iter()
            .map(|b| (b.name.clone(), b.clone()))
            .collect();
        let has_subclasses: HashSet<String> =
            api.classes.iter().filter_map(|c| c.inherits.clone()).collect();

        let mut enum_registry: HashMap<String, EnumDef> = HashMap::new();
        for en in &api.global_enums {
            enum_registry.insert(en.name.clone(), en.clone());
        }
        for bc in &api.builtin_classes {
            for en in bc.enums.as_deref().unwrap_or(&[]) {
                enum_registry.insert(format!("{}.{}", bc.name, en.name), en.clone());
            }
        }
        for class in &api.classes {
            for en in class.enums.as_deref().unwrap_or(&[]) {
                enum_registry.insert(format!("{}.{}", class.name, en.name), en.clone());
            }
        }

        let singletons: HashSet<String> =
            api.singletons.iter().map(|s| s.ty.clone()).collect();

        let class_filter = if filter.is_empty() {
            None
        } else {
            Some(close_over_ancestors(filter, &class_map))
        };

        Ok(Self {
            api,
            build_configuration: build_configuration.to_string(),
            builtin_sizes,
            member_offsets,
            struct_types,
            class_map,
            builtin_map,
            has_subclasses,
            enum_registry,
            singletons,
            class_filter,
        })
    }

    /// Classifies a type name as value- or reference-represented.
    ///
    /// A type is value-represented iff the schema lists members for it or it
    /// is a recognized primitive; everything else is an opaque handle.
    #[must_use]
    pub fn classify(&self, name: &str) -> TypeRepr {
        if self.struct_types.contains(name) {
            TypeRepr::Value
        } else {
            TypeRepr::Reference
        }
    }

    /// True when the type name is a struct-represented builtin or primitive.
    #[must_use]
    pub fn is_struct(&self, name: &str) -> bool {
        self.struct_types.contains(name)
    }

    /// True when the type name is an object class.
    #[must_use]
    pub fn is_object_class(&self, name: &str) -> bool {
        self.class_map.contains_key(name)
    }

    /// Content storage for a class-represented builtin, derived from the
    /// selected configuration's size table.
    ///
    /// # Errors
    /// Returns a generation error for sizes with no storage mapping.
    pub fn storage_for(&self, name: &str) -> Result<Storage, CodegenError> {
        let size = self.builtin_sizes.get(name).copied().ok_or_else(|| {
            CodegenError::unknown_type(name, format!("size table '{}'", self.build_configuration))
        })?;
        match size {
            0 | 4 => Ok(Storage::I32),
            8 => Ok(Storage::I64),
            16 => Ok(Storage::I64Pair),
            other => Err(CodegenError::generation(format!(
                "no storage mapping for builtin '{name}' of size {other}"
            ))),
        }
    }

    /// True when this class should be generated under the active filter.
    #[must_use]
    pub fn should_generate_class(&self, name: &str) -> bool {
        match &self.class_filter {
            Some(filter) => filter.contains(name),
            None => true,
        }
    }
}

/// Expands an explicit class selection with every ancestor, so inheritance
/// chains stay resolvable in the generated output.
fn close_over_ancestors(
    selected: &[String],
    class_map: &HashMap<String, ObjectClass>,
) -> HashSet<String> {
    let mut closed: HashSet<String> = HashSet::new();
    for name in selected {
        let mut current = Some(name.clone());
        while let Some(cname) = current {
            if !closed.insert(cname.clone()) {
                break;
            }
            current = class_map.get(&cname).and_then(|c| c.inherits.clone());
        }
    }
    closed
}
