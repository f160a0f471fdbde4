//! Generation driver.
//!
//! The model and context are built once, sequentially; after that every
//! category (core definitions, builtins, classes, utility functions,
//! native structures) emits into its own buffer and only reads shared
//! state. The caller may run the category emitters concurrently; assembly
//! at the end is deterministic either way because units are sorted by name
//! before output.

use embergen_schema::model::ApiDescription;
use tracing::{debug, info};

use crate::builtins::generate_builtin;
use crate::classes::generate_class;
use crate::context::GenerationContext;
use crate::enums::generate_enum;
use crate::error::CodegenError;
use crate::native_structs::generate_native_structure;
use crate::printer::Printer;
use crate::utility::generate_utilities;

/// Run settings, fixed for the lifetime of one generation.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Build configuration selecting size and offset tables.
    pub build_configuration: String,
    /// Emit one concatenated file instead of one file per unit.
    pub single_file: bool,
    /// Class names to generate; empty generates everything. Ancestors of
    /// selected classes are always included.
    pub filter: Vec<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            build_configuration: "float_64".to_string(),
            single_file: false,
            filter: Vec::new(),
        }
    }
}

/// One emitted unit of source text, named for deterministic ordering.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    /// Unit name (type name or category name).
    pub name: String,
    /// Source text without the file preamble.
    pub text: String,
}

/// One output file, ready to write.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// File name relative to the output directory.
    pub name: String,
    /// Complete file contents.
    pub contents: String,
}

/// Holds the immutable context and drives category emission.
#[derive(Debug)]
pub struct Generator {
    ctx: GenerationContext,
    single_file: bool,
}

impl Generator {
    /// Builds the context from a parsed schema.
    ///
    /// # Errors
    /// Fatal when the requested build configuration is unknown.
    pub fn new(api: ApiDescription, settings: &GeneratorSettings) -> Result<Self, CodegenError> {
        info!(
            version = %api.header.version_full_name,
            build_configuration = %settings.build_configuration,
            "building generation context"
        );
        let ctx = GenerationContext::build(api, &settings.build_configuration, &settings.filter)?;
        Ok(Self {
            ctx,
            single_file: settings.single_file,
        })
    }

    /// Shared lookup state, for callers driving categories themselves.
    #[must_use]
    pub fn context(&self) -> &GenerationContext {
        &self.ctx
    }

    /// Global enums and engine-wide definitions.
    ///
    /// # Errors
    /// Fatal on unresolvable type tokens.
    pub fn core_defs(&self) -> Result<GeneratedUnit, CodegenError> {
        let mut p = Printer::new();
        for en in &self.ctx.api.global_enums {
            generate_enum(&mut p, en, None);
        }
        Ok(GeneratedUnit {
            name: "core_defs".to_string(),
            text: p.finish(),
        })
    }

    /// One unit per builtin value type.
    ///
    /// # Errors
    /// Fatal on unresolvable type tokens.
    pub fn builtin_units(&self) -> Result<Vec<GeneratedUnit>, CodegenError> {
        let mut units = Vec::new();
        for builtin in &self.ctx.api.builtin_classes {
            let mut p = Printer::new();
            generate_builtin(&self.ctx, builtin, &mut p)?;
            let text = p.finish();
            if !text.is_empty() {
                units.push(GeneratedUnit {
                    name: builtin.name.clone(),
                    text,
                });
            }
        }
        Ok(units)
    }

    /// One unit per object class passing the filter.
    ///
    /// # Errors
    /// Fatal on unresolvable type tokens outside the per-method skip rules.
    pub fn class_units(&self) -> Result<Vec<GeneratedUnit>, CodegenError> {
        let mut units = Vec::new();
        for class in &self.ctx.api.classes {
            if !self.ctx.should_generate_class(&class.name) {
                debug!(class = %class.name, "outside filter, skipping");
                continue;
            }
            let mut p = Printer::new();
            generate_class(&self.ctx, class, &mut p)?;
            units.push(GeneratedUnit {
                name: class.name.clone(),
                text: p.finish(),
            });
        }
        Ok(units)
    }

    /// The utility-function namespace.
    ///
    /// # Errors
    /// Fatal on unresolvable type tokens outside the per-method skip rules.
    pub fn utility_unit(&self) -> Result<GeneratedUnit, CodegenError> {
        let mut p = Printer::new();
        generate_utilities(&self.ctx, &mut p)?;
        Ok(GeneratedUnit {
            name: "utility".to_string(),
            text: p.finish(),
        })
    }

    /// All representable native structures, as one unit.
    ///
    /// # Errors
    /// Fatal on unresolvable (non-pointer) field types.
    pub fn native_structure_unit(&self) -> Result<GeneratedUnit, CodegenError> {
        let mut p = Printer::new();
        for def in &self.ctx.api.native_structures {
            generate_native_structure(&self.ctx, def, &mut p)?;
        }
        Ok(GeneratedUnit {
            name: "native_structs".to_string(),
            text: p.finish(),
        })
    }

    /// Runs every category sequentially and assembles the output files.
    ///
    /// # Errors
    /// Propagates the first fatal error from any category.
    pub fn run(&self) -> Result<Vec<GeneratedFile>, CodegenError> {
        let mut units = vec![self.core_defs()?];
        units.extend(self.builtin_units()?);
        units.extend(self.class_units()?);
        units.push(self.utility_unit()?);
        units.push(self.native_structure_unit()?);
        Ok(self.assemble(units))
    }

    /// Turns emitted units into output files. Units are sorted by name so
    /// identical inputs produce byte-identical output regardless of the
    /// order the categories finished in.
    #[must_use]
    pub fn assemble(&self, mut units: Vec<GeneratedUnit>) -> Vec<GeneratedFile> {
        units.sort_by(|a, b| a.name.cmp(&b.name));
        units.retain(|u| !u.text.is_empty());
        if self.single_file {
            let mut p = Printer::new();
            p.preamble();
            let contents = units
                .iter()
                .map(|u| u.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            vec![GeneratedFile {
                name: "bindings.rs".to_string(),
                contents: format!("{}{contents}", p.finish()),
            }]
        } else {
            units
                .into_iter()
                .map(|u| {
                    let mut p = Printer::new();
                    p.preamble();
                    GeneratedFile {
                        name: format!("{}.rs", u.name.to_ascii_lowercase()),
                        contents: format!("{}{}", p.finish(), u.text),
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::FIXTURE;
    use embergen_schema::parse_api;

    fn generator(single_file: bool, filter: &[&str]) -> Generator {
        let api = parse_api(FIXTURE).expect("fixture parses");
        let settings = GeneratorSettings {
            build_configuration: "float_64".to_string(),
            single_file,
            filter: filter.iter().map(|s| (*s).to_string()).collect(),
        };
        Generator::new(api, &settings).expect("builds")
    }

    #[test]
    fn test_run_produces_all_categories() {
        let files = generator(false, &[]).run().expect("runs");
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"core_defs.rs"));
        assert!(names.contains(&"vector2.rs"));
        assert!(names.contains(&"node.rs"));
        assert!(names.contains(&"utility.rs"));
        assert!(names.contains(&"native_structs.rs"));
        for file in &files {
            assert!(file.contents.starts_with("// Generated by embergen; do not edit.\n"));
        }
    }

    #[test]
    fn test_single_file_sorted_and_concatenated() {
        let files = generator(true, &[]).run().expect("runs");
        assert_eq!(files.len(), 1);
        let contents = &files[0].contents;
        // Sorted by unit name: Dictionary before Node before Vector2.
        let dict = contents.find("pub struct Dictionary").expect("dict");
        let node = contents.find("pub struct Node").expect("node");
        let vec2 = contents.find("pub struct Vector2").expect("vec2");
        assert!(dict < node);
        assert!(node < vec2);
    }

    #[test]
    fn test_regeneration_is_idempotent() {
        let a = generator(true, &[]).run().expect("first run");
        let b = generator(true, &[]).run().expect("second run");
        assert_eq!(a[0].contents, b[0].contents);
    }

    #[test]
    fn test_filter_limits_classes_but_keeps_ancestors() {
        let files = generator(false, &["Node2D"]).run().expect("runs");
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"node2d.rs"));
        assert!(names.contains(&"node.rs"));
        assert!(names.contains(&"object.rs"));
        // Builtins and utilities are unaffected by the class filter.
        assert!(names.contains(&"vector2.rs"));
        assert!(names.contains(&"utility.rs"));
    }
}
