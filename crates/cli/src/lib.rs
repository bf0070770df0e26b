//! Command-line front end for `oapi-split-core`.
//!
//! Reads a JSON or YAML document, runs the generator and writes one request
//! module and one declaration file per tag plus an index module.

pub mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info};

use oapi_split_core::{GeneratedOutput, GeneratorConfig, INDEX_STEM, SchemaDocument, generate};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "oapi-split",
    version,
    about = "Generate a typed TypeScript client from an OpenAPI or Swagger document"
)]
pub struct Args {
    #[arg(
        long,
        short = 'i',
        value_name = "FILE",
        help = "The OpenAPI 3 or Swagger 2 document (.json, .yaml or .yml)"
    )]
    pub input: PathBuf,
    #[arg(
        long,
        short = 'o',
        value_name = "DIR",
        help = "Directory the generated modules are written to"
    )]
    pub out_dir: PathBuf,
    #[arg(long, short = 'c', value_name = "FILE", help = "Generator config (TOML)")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Override the declaration namespace")]
    pub namespace: Option<String>,
    #[arg(long, help = "Override the module the request helper is imported from")]
    pub request_import: Option<String>,
}

/// Parse `args` and run the generator, returning the process exit code.
pub fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => run(&args),
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

pub fn run(args: &Args) -> i32 {
    match run_inner(args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn run_inner(args: &Args) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path).map_err(|e| e.to_string())?,
        None => GeneratorConfig::default(),
    };
    if let Some(namespace) = &args.namespace {
        config.namespace.clone_from(namespace);
    }
    if let Some(request_import) = &args.request_import {
        config.request_import.clone_from(request_import);
    }

    let doc = load_document(&args.input)?;
    let output = generate(&doc, &config).map_err(|e| e.to_string())?;
    let written = write_output(&output, &args.out_dir)?;
    info!(
        files = written.len(),
        out_dir = %args.out_dir.display(),
        "generated client"
    );
    Ok(())
}

/// Read a document, choosing the parser by file extension.
pub fn load_document(path: &Path) -> Result<SchemaDocument, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let doc = if is_yaml {
        SchemaDocument::from_yaml(&contents)
    } else {
        SchemaDocument::from_json(&contents)
    };
    doc.map_err(|e| format!("{}: {e}", path.display()))
}

/// Write every generated file under `out_dir`, returning the written paths.
///
/// Layout: `<stem>.ts`, `types/<stem>.d.ts` and `index.ts`.
pub fn write_output(output: &GeneratedOutput, out_dir: &Path) -> Result<Vec<PathBuf>, String> {
    let types_dir = out_dir.join("types");
    fs::create_dir_all(&types_dir)
        .map_err(|e| format!("Failed to create {}: {e}", types_dir.display()))?;

    let mut written = Vec::with_capacity(output.tags.len() * 2 + 1);
    for tag in output.tags.values() {
        let module = out_dir.join(format!("{}.ts", tag.file_stem));
        write_file(&module, tag.functions_source())?;
        written.push(module);

        let declarations = types_dir.join(format!("{}.d.ts", tag.file_stem));
        write_file(&declarations, tag.declarations_source())?;
        written.push(declarations);
    }

    let index = out_dir.join(format!("{INDEX_STEM}.ts"));
    write_file(&index, output.index_source())?;
    written.push(index);
    Ok(written)
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    fs::write(path, contents).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}
