//! Code generation from tag groups to emitted units.
//!
//! Runs after every name is minted; the arena, operation list and synthesis
//! are only read here, so tag groups can be emitted on the rayon pool.

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::document::HttpMethod;
use crate::emit::Emit;
use crate::group::{Operation, TagGroup, TemplatePart as UrlPart};
use crate::model::{Primitive, Type, TypeArena, TypeId, UnionMember};
use crate::synth::{Synthesis, compare_names};
use crate::ts::{
    ObjectEntry, TemplatePart, TsExpr, TsFunction, TsImport, TsItem, TsModule, TsNamespace,
    TsParam, TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind,
};

/// Role of a function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Params,
    Body,
    Options,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArg {
    pub kind: ArgKind,
    pub name: String,
    /// Emitted TypeScript type.
    pub ty: String,
    pub optional: bool,
}

/// How the params bag reaches the transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryWiring {
    /// No query record is passed.
    None,
    /// `params: { ...queryParams }` after destructuring path fields.
    Rest,
    /// `params: { ...params }`; the bag has no path fields.
    All,
}

/// What the emitted function hands to the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportCall {
    pub method: HttpMethod,
    /// URL template with `${paramN}` placeholders.
    pub url: String,
    /// `(bag field, local alias)` per placeholder, in placeholder order.
    pub path_bindings: Vec<(String, String)>,
    pub query: QueryWiring,
    /// Content type of the body, when there is one.
    pub body_content_type: Option<String>,
    pub response_type: String,
}

/// One emitted request function.
#[derive(Debug, Clone)]
pub struct FunctionUnit {
    pub name: String,
    pub args: Vec<FunctionArg>,
    pub doc: Vec<String>,
    pub call: TransportCall,
    /// Rendered source of the function.
    pub text: String,
}

/// Shape of an emitted declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclShape {
    Object,
    Union,
    Intersection,
    Array,
    Map,
    Alias,
}

/// One emitted `type` declaration.
#[derive(Debug, Clone)]
pub struct TypeDeclUnit {
    pub name: String,
    pub shape: DeclShape,
    pub text: String,
}

/// A named type used by a tag but declared in another tag's file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalType {
    pub name: String,
    pub tag: String,
}

/// Everything emitted for one tag.
#[derive(Debug, Clone)]
pub struct TagOutput {
    pub tag: String,
    pub file_stem: String,
    pub functions: Vec<FunctionUnit>,
    pub declarations: Vec<TypeDeclUnit>,
    pub external_types: Vec<ExternalType>,
    functions_source: String,
    declarations_source: String,
}

impl TagOutput {
    /// Request-function module (`<stem>.ts`).
    pub fn functions_source(&self) -> &str {
        &self.functions_source
    }

    /// Declaration file (`types/<stem>.d.ts`).
    pub fn declarations_source(&self) -> &str {
        &self.declarations_source
    }
}

/// Complete result of a run, keyed by tag in order of first appearance.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    pub tags: IndexMap<String, TagOutput>,
    index_source: String,
}

impl GeneratedOutput {
    pub fn tag(&self, tag: &str) -> Option<&TagOutput> {
        self.tags.get(tag)
    }

    /// Index module re-exporting every tag module.
    pub fn index_source(&self) -> &str {
        &self.index_source
    }
}

/// Read-only state shared by every tag emission.
#[derive(Debug)]
pub struct EmitContext<'a> {
    pub arena: &'a TypeArena,
    pub operations: &'a [Operation],
    pub groups: &'a [TagGroup],
    pub synthesis: &'a Synthesis,
    pub config: &'a GeneratorConfig,
}

impl EmitContext<'_> {
    /// Type expression for `id`; named types are prefixed with the
    /// namespace when `qualified`.
    fn ts_type(&self, id: TypeId, qualified: bool) -> TsType {
        if let Some(name) = self.synthesis.type_name(id) {
            return TsType::Ref(self.qualify(name, qualified));
        }
        self.shape(self.arena.ty(id), qualified)
    }

    fn qualify(&self, name: &str, qualified: bool) -> String {
        if qualified {
            format!("{}.{name}", self.config.namespace)
        } else {
            name.to_string()
        }
    }

    fn shape(&self, ty: &Type, qualified: bool) -> TsType {
        match ty {
            Type::Primitive(p) => TsType::Primitive(*p),
            Type::Reference(target) => self.ts_type(*target, qualified),
            Type::Array(item) => TsType::Array(Box::new(self.ts_type(*item, qualified))),
            Type::Map(value) => TsType::Record(Box::new(self.ts_type(*value, qualified))),
            Type::Union(members) => TsType::Union(
                members
                    .iter()
                    .map(|m| match m {
                        UnionMember::Literal(lit) => TsType::Literal(lit.clone()),
                        UnionMember::Type(id) => self.ts_type(*id, qualified),
                    })
                    .collect(),
            ),
            Type::Intersection(parts) => TsType::Intersection(
                parts.iter().map(|id| self.ts_type(*id, qualified)).collect(),
            ),
            // objects are always hoisted; an unnamed one only happens for
            // slots nothing declares
            Type::Object { .. } => TsType::Record(Box::new(TsType::Primitive(Primitive::Any))),
        }
    }

    fn typedef(&self, id: TypeId) -> Option<(DeclShape, TsTypeDef)> {
        let name = self.synthesis.type_name(id)?.to_string();
        let slot = self.arena.slot(id);
        let (shape, kind) = match &slot.ty {
            Type::Object { fields, extra } => (
                DeclShape::Object,
                TypeDefKind::Object {
                    props: fields
                        .iter()
                        .map(|f| TsProp {
                            name: f.name.clone(),
                            ty: self.ts_type(f.ty, false),
                            optional: f.optional,
                            doc: f.description.clone(),
                        })
                        .collect(),
                    extra: extra.map(|e| self.ts_type(e, false)),
                },
            ),
            ty => {
                let shape = match ty {
                    Type::Union(_) => DeclShape::Union,
                    Type::Intersection(_) => DeclShape::Intersection,
                    Type::Array(_) => DeclShape::Array,
                    Type::Map(_) => DeclShape::Map,
                    _ => DeclShape::Alias,
                };
                (shape, TypeDefKind::Alias(self.shape(ty, false)))
            }
        };
        Some((
            shape,
            TsTypeDef {
                name,
                doc: slot.description.clone(),
                kind,
            },
        ))
    }

    fn function(&self, index: usize) -> (FunctionUnit, TsFunction) {
        let op = &self.operations[index];
        let name = self.synthesis.function_name(index).to_string();

        let url_parts: Vec<TemplatePart> = op
            .template
            .iter()
            .map(|part| match part {
                UrlPart::Static(s) => TemplatePart::Static(s.clone()),
                UrlPart::Placeholder(n) => TemplatePart::Dynamic(format!("param{n}")),
            })
            .collect();
        let url: String = url_parts
            .iter()
            .map(|part| match part {
                TemplatePart::Static(s) => s.clone(),
                TemplatePart::Dynamic(alias) => format!("${{{alias}}}"),
            })
            .collect();

        let mut doc = Vec::new();
        let title = op
            .summary
            .as_deref()
            .or(op.description.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        doc.push(match title {
            Some(title) => format!("{title} {} {url}", op.method),
            None => format!("{} {url}", op.method),
        });
        if op.deprecated {
            doc.push("@deprecated".to_string());
        }

        let mut args = Vec::new();
        if let Some(bag) = op.params_bag {
            args.push(FunctionArg {
                kind: ArgKind::Params,
                name: "params".to_string(),
                ty: self.ts_type(bag, true).emit(),
                optional: !op.params_required() && op.body.is_none(),
            });
        }
        if let Some(body) = &op.body {
            args.push(FunctionArg {
                kind: ArgKind::Body,
                name: "body".to_string(),
                ty: self.ts_type(body.ty, true).emit(),
                optional: false,
            });
        }
        let options_ty = TsType::IndexSignature(Box::new(TsType::Primitive(Primitive::Any)));
        args.push(FunctionArg {
            kind: ArgKind::Options,
            name: "options".to_string(),
            ty: options_ty.emit(),
            optional: true,
        });

        let path_bindings: Vec<(String, String)> = op
            .path_bindings
            .iter()
            .enumerate()
            .map(|(n, field)| (field.clone(), format!("param{n}")))
            .collect();
        let query = match (op.has_query(), path_bindings.is_empty()) {
            (false, _) => QueryWiring::None,
            (true, false) => QueryWiring::Rest,
            (true, true) => QueryWiring::All,
        };

        let mut body = Vec::new();
        if !path_bindings.is_empty() {
            body.push(TsStmt::Destructure {
                bindings: path_bindings.clone(),
                rest: (query == QueryWiring::Rest).then(|| "queryParams".to_string()),
                source: "params".to_string(),
            });
        }

        let mut entries = vec![ObjectEntry::KeyValue(
            "method".to_string(),
            TsExpr::Str(op.method.as_str().to_string()),
        )];
        if let Some(request_body) = &op.body {
            entries.push(ObjectEntry::KeyValue(
                "headers".to_string(),
                TsExpr::Object {
                    entries: vec![ObjectEntry::KeyValue(
                        "Content-Type".to_string(),
                        TsExpr::Str(request_body.content_type.clone()),
                    )],
                    multiline: true,
                },
            ));
        }
        let spread_source = match query {
            QueryWiring::None => None,
            QueryWiring::Rest => Some("queryParams"),
            QueryWiring::All => Some("params"),
        };
        if let Some(source) = spread_source {
            entries.push(ObjectEntry::KeyValue(
                "params".to_string(),
                TsExpr::Object {
                    entries: vec![ObjectEntry::Spread(TsExpr::Ident(source.to_string()))],
                    multiline: false,
                },
            ));
        }
        if op.body.is_some() {
            entries.push(ObjectEntry::KeyValue(
                "data".to_string(),
                TsExpr::Ident("body".to_string()),
            ));
        }
        entries.push(ObjectEntry::Spread(TsExpr::Raw("(options || {})".to_string())));

        let response_type = self.ts_type(op.response, true);
        body.push(TsStmt::Return(TsExpr::Call {
            callee: self.config.request_fn.clone(),
            type_args: vec![response_type.clone()],
            args: vec![
                TsExpr::Template(url_parts),
                TsExpr::Object {
                    entries,
                    multiline: true,
                },
            ],
        }));

        let mut params = Vec::with_capacity(args.len());
        for arg in &args {
            let ty = match arg.kind {
                ArgKind::Params => op.params_bag.map(|bag| self.ts_type(bag, true)),
                ArgKind::Body => op.body.as_ref().map(|b| self.ts_type(b.ty, true)),
                ArgKind::Options => Some(options_ty.clone()),
            };
            if let Some(ty) = ty {
                params.push(TsParam {
                    name: arg.name.clone(),
                    ty,
                    optional: arg.optional,
                });
            }
        }

        let function = TsFunction {
            name: name.clone(),
            doc: doc.clone(),
            params,
            body,
            is_async: true,
            is_export: true,
            print_width: self.config.print_width,
        };

        let unit = FunctionUnit {
            name,
            args,
            doc,
            call: TransportCall {
                method: op.method,
                url,
                path_bindings,
                query,
                body_content_type: op.body.as_ref().map(|b| b.content_type.clone()),
                response_type: response_type.emit(),
            },
            text: function.emit(),
        };
        (unit, function)
    }

    fn external_types(&self, group_index: usize) -> Vec<ExternalType> {
        let group = &self.groups[group_index];
        let mut roots = Vec::new();
        for &index in &group.operations {
            roots.extend(self.operations[index].roots());
        }
        let mut external: Vec<ExternalType> = self
            .arena
            .named_closure(&roots)
            .into_iter()
            .filter_map(|id| {
                let owner = self.synthesis.owner(id)?;
                if owner == group_index {
                    return None;
                }
                Some(ExternalType {
                    name: self.synthesis.type_name(id)?.to_string(),
                    tag: self.groups.get(owner)?.tag.clone(),
                })
            })
            .collect();
        external.sort_by(|a, b| compare_names(&a.name, &b.name));
        external
    }

    /// Emit one tag group.
    pub fn emit_tag(&self, group_index: usize, file_stem: String) -> TagOutput {
        let group = &self.groups[group_index];

        let mut functions = Vec::with_capacity(group.operations.len());
        let mut items = Vec::with_capacity(group.operations.len());
        for &index in &group.operations {
            let (unit, function) = self.function(index);
            functions.push(unit);
            items.push(TsItem::Function(function));
        }
        let module = TsModule {
            header: self.config.file_header.clone(),
            imports: vec![TsImport::Named {
                items: vec![self.config.request_fn.clone()],
                from: self.config.request_import.clone(),
            }],
            items,
        };

        let mut declarations = Vec::with_capacity(group.types.len());
        let mut defs = Vec::with_capacity(group.types.len());
        for (shape, def) in group.types.iter().filter_map(|id| self.typedef(*id)) {
            declarations.push(TypeDeclUnit {
                name: def.name.clone(),
                shape,
                text: def.emit(),
            });
            defs.push(def);
        }
        let namespace = TsNamespace {
            name: self.config.namespace.clone(),
            types: defs,
        };

        TagOutput {
            tag: group.tag.clone(),
            file_stem,
            functions,
            declarations,
            external_types: self.external_types(group_index),
            functions_source: module.emit(),
            declarations_source: namespace.emit(),
        }
    }
}

fn index_module(config: &GeneratorConfig, stems: &[&str]) -> TsModule {
    TsModule {
        header: config.file_header.clone(),
        imports: stems
            .iter()
            .map(|stem| TsImport::Namespace {
                alias: (*stem).to_string(),
                from: format!("./{stem}"),
            })
            .collect(),
        items: vec![TsItem::ExportDefault(TsExpr::Object {
            entries: stems
                .iter()
                .map(|stem| ObjectEntry::Shorthand((*stem).to_string()))
                .collect(),
            multiline: true,
        })],
    }
}

/// Emit every tag group, in parallel when configured.
pub fn emit_all(ctx: &EmitContext<'_>, file_stems: &[String]) -> GeneratedOutput {
    let jobs: Vec<(usize, String)> = file_stems.iter().cloned().enumerate().collect();
    let outputs: Vec<TagOutput> = if ctx.config.parallel_emit {
        jobs.into_par_iter()
            .map(|(index, stem)| ctx.emit_tag(index, stem))
            .collect()
    } else {
        jobs.into_iter()
            .map(|(index, stem)| ctx.emit_tag(index, stem))
            .collect()
    };

    let stems: Vec<&str> = outputs.iter().map(|o| o.file_stem.as_str()).collect();
    let index_source = index_module(ctx.config, &stems).emit();

    debug!(tags = outputs.len(), "emitted tag modules");
    GeneratedOutput {
        tags: outputs
            .into_iter()
            .map(|output| (output.tag.clone(), output))
            .collect(),
        index_source,
    }
}
