//! OpenAPI 3 / Swagger 2 to TypeScript client generator.
//!
//! [`generate`] runs the whole pipeline over a parsed [`SchemaDocument`]:
//!
//! 1. [`resolve`] turns every schema into a slot of the [`model::TypeArena`],
//!    named schemas first so references always find their target.
//! 2. [`group`] collects operations and partitions them by tag.
//! 3. [`synth`] mints every identifier and assigns each named type to the
//!    tag that declares it.
//! 4. [`codegen`] builds the TypeScript AST per tag and [`emit`] prints it.
//!
//! Writing the result to disk is left to the caller.

pub mod codegen;
pub mod config;
pub mod document;
pub mod emit;
pub mod error;
pub mod group;
pub mod model;
pub mod naming;
pub mod resolve;
pub mod synth;
pub mod ts;

use tracing::debug;

pub use codegen::{GeneratedOutput, TagOutput};
pub use config::GeneratorConfig;
pub use document::SchemaDocument;
pub use error::{GenError, Result};

use codegen::EmitContext;
use naming::ident::file_stem;
use resolve::Resolver;

/// File stem of the module re-exporting every tag module.
pub const INDEX_STEM: &str = "index";

/// Generate the TypeScript client for `doc`.
pub fn generate(doc: &SchemaDocument, config: &GeneratorConfig) -> Result<GeneratedOutput> {
    let mut resolver = Resolver::new(doc, config);
    resolver.resolve_components()?;
    let operations = group::collect_operations(&mut resolver, config)?;
    let arena = resolver.into_arena();
    debug!(types = arena.len(), operations = operations.len(), "resolved document");

    let mut groups = group::partition(&operations);
    let mut synthesis = synth::synthesize(&arena, &operations, &mut groups, config)?;

    synthesis.names.files.mint(INDEX_STEM, "module:index")?;
    let mut stems = Vec::with_capacity(groups.len());
    for group in &groups {
        let stem = synthesis
            .names
            .files
            .mint(&file_stem(&group.tag), &format!("tag:{}", group.tag))?;
        stems.push(stem);
    }

    let ctx = EmitContext {
        arena: &arena,
        operations: &operations,
        groups: &groups,
        synthesis: &synthesis,
        config,
    };
    Ok(codegen::emit_all(&ctx, &stems))
}
