//! Command-line driver.
//!
//! Parses the schema, builds the generation context sequentially, then
//! runs one blocking task per output category and joins them before
//! assembling and writing the files. Only fatal errors exit nonzero;
//! per-entity skips are logged and generation continues.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::task;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use embergen_codegen::{CodegenError, GeneratedUnit, Generator, GeneratorSettings};

#[derive(Debug, Parser)]
#[command(name = "embergen", version, about = "Generate Rust bindings from an Ember extension API schema")]
struct Args {
    /// Path to the extension_api.json schema.
    schema: PathBuf,

    /// Directory the generated sources are written to.
    #[arg(short, long, default_value = "bindings")]
    output: PathBuf,

    /// Emit one concatenated bindings.rs instead of one file per type.
    #[arg(long)]
    single_file: bool,

    /// Generate only these classes (plus their ancestors). Repeatable.
    #[arg(long = "filter", value_name = "CLASS")]
    filter: Vec<String>,

    /// Build configuration selecting the size and offset tables.
    #[arg(long, default_value = "float_64")]
    build_configuration: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(count) => {
            info!(files = count, output = %args.output.display(), "generation complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "generation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<usize, CodegenError> {
    let api = embergen_schema::parse_api_file(&args.schema)?;
    embergen_schema::validation::validate(&api)?;

    let settings = GeneratorSettings {
        build_configuration: args.build_configuration.clone(),
        single_file: args.single_file,
        filter: args.filter.clone(),
    };
    let generator = Arc::new(Generator::new(api, &settings)?);

    // Context is frozen; each category emits into its own buffer.
    let core = spawn_category(&generator, |g| g.core_defs().map(|u| vec![u]));
    let builtins = spawn_category(&generator, Generator::builtin_units);
    let classes = spawn_category(&generator, Generator::class_units);
    let utility = spawn_category(&generator, |g| g.utility_unit().map(|u| vec![u]));
    let natives = spawn_category(&generator, |g| g.native_structure_unit().map(|u| vec![u]));

    let mut units: Vec<GeneratedUnit> = Vec::new();
    for handle in [core, builtins, classes, utility, natives] {
        units.extend(join_category(handle).await?);
    }

    let files = generator.assemble(units);
    std::fs::create_dir_all(&args.output)?;
    for file in &files {
        std::fs::write(args.output.join(&file.name), &file.contents)?;
    }
    Ok(files.len())
}

type CategoryHandle = task::JoinHandle<Result<Vec<GeneratedUnit>, CodegenError>>;

fn spawn_category(
    generator: &Arc<Generator>,
    emit: impl FnOnce(&Generator) -> Result<Vec<GeneratedUnit>, CodegenError> + Send + 'static,
) -> CategoryHandle {
    let generator = Arc::clone(generator);
    task::spawn_blocking(move || emit(&generator))
}

async fn join_category(handle: CategoryHandle) -> Result<Vec<GeneratedUnit>, CodegenError> {
    handle
        .await
        .map_err(|err| CodegenError::generation(format!("emission task failed: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "header": {
            "version_major": 4, "version_minor": 2, "version_patch": 1,
            "version_status": "stable", "version_build": "official",
            "version_full_name": "Ember v4.2.1.stable.official"
        },
        "builtin_class_sizes": [
            { "build_configuration": "float_64", "sizes": [] }
        ],
        "builtin_class_member_offsets": [],
        "global_enums": [
            {
                "name": "Side",
                "values": [
                    { "name": "SIDE_LEFT", "value": 0 },
                    { "name": "SIDE_RIGHT", "value": 1 }
                ]
            }
        ],
        "utility_functions": [],
        "builtin_classes": [],
        "classes": [],
        "singletons": [],
        "native_structures": []
    }"#;

    #[tokio::test]
    async fn test_run_writes_generated_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let schema_path = dir.path().join("extension_api.json");
        std::fs::write(&schema_path, SCHEMA).expect("write schema");

        let out = dir.path().join("bindings");
        let args = Args {
            schema: schema_path,
            output: out.clone(),
            single_file: false,
            filter: vec![],
            build_configuration: "float_64".to_string(),
        };
        let count = run(&args).await.expect("runs");
        assert!(count >= 1);
        let core = std::fs::read_to_string(out.join("core_defs.rs")).expect("core_defs written");
        assert!(core.starts_with("// Generated by embergen; do not edit.\n"));
        assert!(core.contains("pub enum Side"));
        assert!(core.contains("LEFT = 0,"));
    }

    #[tokio::test]
    async fn test_unknown_build_configuration_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let schema_path = dir.path().join("extension_api.json");
        std::fs::write(&schema_path, SCHEMA).expect("write schema");

        let args = Args {
            schema: schema_path,
            output: dir.path().join("bindings"),
            single_file: false,
            filter: vec![],
            build_configuration: "double_128".to_string(),
        };
        let err = run(&args).await.expect_err("must fail");
        assert!(matches!(
            err,
            CodegenError::UnknownBuildConfiguration { ref name } if name == "double_128"
        ));
    }
}
