//! Operation collection, parameter shaping and tag partitioning.

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::config::GeneratorConfig;
use crate::document::{
    self, HttpMethod, MediaType, Parameter as DocParameter, RefOr, RequestBody, Response,
};
use crate::error::{GenError, Result};
use crate::model::{Field, Primitive, Type, TypeId, TypeOrigin};
use crate::naming::ident::{route_function_name, sanitize_identifier, to_snake_case, type_name};
use crate::resolve::{Resolver, child_pointer};

/// Success responses, in the order their schema is looked up.
const SUCCESS_STATUSES: [&str; 7] = ["200", "201", "202", "203", "206", "2XX", "default"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
    /// Swagger 2 body parameter.
    Body,
    /// Swagger 2 form field.
    FormData,
}

impl ParamLocation {
    fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            "body" => Some(Self::Body),
            "formData" => Some(Self::FormData),
            _ => None,
        }
    }
}

/// A path or query parameter of an operation.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub ty: TypeId,
    pub description: Option<String>,
}

/// Piece of a URL path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Static(String),
    /// Index into [`Operation::path_bindings`].
    Placeholder(usize),
}

#[derive(Debug, Clone)]
pub struct RequestBodyShape {
    pub ty: TypeId,
    pub content_type: String,
    pub required: bool,
}

/// One method + path pair with its resolved shapes.
#[derive(Debug, Clone)]
pub struct Operation {
    /// `METHOD /path`
    pub key: String,
    pub method: HttpMethod,
    pub path: String,
    /// Function name before collision resolution.
    pub name_candidate: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Declared tags (never empty).
    pub tags: Vec<String>,
    /// Path parameters first, then query parameters, each in declared order.
    pub parameters: Vec<Parameter>,
    /// Merged path + query type, present iff there is at least one parameter.
    pub params_bag: Option<TypeId>,
    pub template: Vec<TemplatePart>,
    /// Path parameter names, indexed by placeholder position.
    pub path_bindings: Vec<String>,
    pub body: Option<RequestBodyShape>,
    pub response: TypeId,
}

impl Operation {
    pub fn path_params(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Path)
    }

    pub fn query_params(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
    }

    pub fn has_query(&self) -> bool {
        self.query_params().next().is_some()
    }

    /// Whether any bag field is required.
    pub fn params_required(&self) -> bool {
        self.parameters.iter().any(|p| p.required)
    }

    /// Types the operation's signature depends on.
    pub fn roots(&self) -> Vec<TypeId> {
        let mut roots: Vec<TypeId> = self.params_bag.into_iter().collect();
        roots.extend(self.body.as_ref().map(|b| b.ty));
        roots.push(self.response);
        roots
    }
}

/// Operations sharing a tag, in document order.
#[derive(Debug, Clone)]
pub struct TagGroup {
    pub tag: String,
    /// Indices into the operation list.
    pub operations: Vec<usize>,
    /// Named types declared by this tag.
    pub types: Vec<TypeId>,
}

/// Collect every operation of the document, resolving its parameter, body
/// and response schemas into the resolver's arena.
pub fn collect_operations(
    resolver: &mut Resolver<'_>,
    config: &GeneratorConfig,
) -> Result<Vec<Operation>> {
    let doc = resolver.doc();
    let mut operations = Vec::new();
    for (path, item) in &doc.paths {
        for (method, op) in &item.operations {
            let location = document::pointer(&["paths", path, method.key()]);
            let operation =
                build_operation(resolver, config, path, *method, op, &item.parameters, &location)?;
            trace!(operation = %operation.key, "collected operation");
            operations.push(operation);
        }
    }
    debug!(count = operations.len(), "collected operations");
    Ok(operations)
}

fn build_operation(
    resolver: &mut Resolver<'_>,
    config: &GeneratorConfig,
    path: &str,
    method: HttpMethod,
    op: &document::Operation,
    shared: &[RefOr<DocParameter>],
    location: &str,
) -> Result<Operation> {
    let key = format!("{method} {path}");
    let name_candidate = match op.operation_id.as_deref() {
        Some(id) if !id.trim().is_empty() => sanitize_identifier(id),
        _ => route_function_name(method, path),
    };
    let field_hint = type_name(&format!("{name_candidate}{}", config.params_suffix));

    let declared = merge_parameters(resolver, shared, &op.parameters, location)?;

    let mut path_params: Vec<Parameter> = Vec::new();
    let mut query_params: Vec<Parameter> = Vec::new();
    let mut form_fields = Vec::new();
    let mut body = None;
    for (param, param_location) in declared {
        let Some(kind) = ParamLocation::parse(&param.location) else {
            return Err(GenError::malformed(
                param_location.as_str(),
                format!("unknown parameter location '{}'", param.location),
            ));
        };
        match kind {
            ParamLocation::Header | ParamLocation::Cookie => {
                trace!(operation = %key, param = %param.name, location = %param.location, "parameter not part of the params bag");
            }
            ParamLocation::Body => {
                let schema = param.effective_schema();
                let ty = resolver.resolve(&schema, &format!("{name_candidate}Body"), &param_location)?;
                body = Some(RequestBodyShape {
                    ty,
                    content_type: swagger_content_type(&op.consumes, false),
                    required: param.required,
                });
            }
            ParamLocation::FormData => {
                let hint = format!("{}{}", type_name(&format!("{name_candidate}Body")), type_name(&param.name));
                let ty = resolver.resolve(&param.effective_schema(), &hint, &param_location)?;
                form_fields.push(Field {
                    name: param.name.clone(),
                    ty,
                    optional: !param.required,
                    description: param.description.clone(),
                });
            }
            ParamLocation::Path | ParamLocation::Query => {
                // both land in one bag keyed by name
                let clash = path_params
                    .iter()
                    .chain(&query_params)
                    .any(|p| p.name == param.name);
                if clash {
                    return Err(GenError::malformed(
                        param_location.as_str(),
                        format!(
                            "parameter '{}' is declared in both path and query of {key}",
                            param.name
                        ),
                    ));
                }
                let hint = format!("{field_hint}{}", type_name(&param.name));
                let ty = resolver.resolve(&param.effective_schema(), &hint, &param_location)?;
                let parameter = Parameter {
                    name: param.name.clone(),
                    location: kind,
                    required: kind == ParamLocation::Path || param.required,
                    ty,
                    description: param.description.clone(),
                };
                if kind == ParamLocation::Path {
                    path_params.push(parameter);
                } else {
                    query_params.push(parameter);
                }
            }
        }
    }

    if !form_fields.is_empty() {
        let body_location = child_pointer(location, "formData");
        let ty = resolver.alloc(
            Type::Object {
                fields: form_fields,
                extra: None,
            },
            TypeOrigin::Inline {
                hint: format!("{name_candidate}Body"),
                location: body_location,
            },
            None,
        );
        body = Some(RequestBodyShape {
            ty,
            content_type: swagger_content_type(&op.consumes, true),
            required: true,
        });
    }

    if let Some(request_body) = &op.request_body {
        body = request_body_shape(resolver, request_body, &name_candidate, location)?;
    }

    let (template, tokens) = parse_template(path, &key)?;
    let path_bindings = bind_placeholders(&key, &tokens, &path_params)?;

    let mut parameters = path_params;
    parameters.extend(query_params);
    let params_bag = if parameters.is_empty() {
        None
    } else {
        let fields = parameters
            .iter()
            .map(|p| Field {
                name: p.name.clone(),
                ty: p.ty,
                optional: !p.required,
                description: p.description.clone(),
            })
            .collect();
        Some(resolver.alloc(
            Type::Object {
                fields,
                extra: None,
            },
            TypeOrigin::ParamsBag {
                operation: key.clone(),
            },
            None,
        ))
    };

    let response = response_type(resolver, op, &name_candidate, location)?;

    let tags = if op.tags.is_empty() {
        vec![config.default_tag.clone()]
    } else {
        let mut tags: Vec<String> = Vec::with_capacity(op.tags.len());
        for tag in &op.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    };

    Ok(Operation {
        key,
        method,
        path: path.to_string(),
        name_candidate,
        summary: op.summary.clone(),
        description: op.description.clone(),
        deprecated: op.deprecated,
        tags,
        parameters,
        params_bag,
        template,
        path_bindings,
        body,
        response,
    })
}

/// Path-level parameters overridden by operation-level ones with the same
/// name and location.
fn merge_parameters<'doc>(
    resolver: &Resolver<'doc>,
    shared: &'doc [RefOr<DocParameter>],
    own: &'doc [RefOr<DocParameter>],
    location: &str,
) -> Result<Vec<(&'doc DocParameter, String)>> {
    let doc = resolver.doc();
    let path_location = location.rsplit_once('/').map_or(location, |(head, _)| head);
    let sources = shared
        .iter()
        .enumerate()
        .map(|(i, p)| (p, child_pointer(&child_pointer(path_location, "parameters"), &i.to_string())))
        .chain(
            own.iter()
                .enumerate()
                .map(|(i, p)| (p, child_pointer(&child_pointer(location, "parameters"), &i.to_string()))),
        );

    let mut merged: Vec<(&'doc DocParameter, String)> = Vec::new();
    for (entry, entry_location) in sources {
        let param = match entry {
            RefOr::Item(param) => param,
            RefOr::Ref { ref_path } => doc
                .parameter_ref(ref_path)
                .ok_or_else(|| GenError::unresolved(ref_path.as_str(), entry_location.as_str()))?,
        };
        merged.retain(|(p, _)| !(p.name == param.name && p.location == param.location));
        merged.push((param, entry_location));
    }
    Ok(merged)
}

fn swagger_content_type(consumes: &[String], form: bool) -> String {
    let pick = |wanted: &str| consumes.iter().find(|c| c.as_str() == wanted).cloned();
    if form {
        pick("multipart/form-data")
            .or_else(|| pick("application/x-www-form-urlencoded"))
            .unwrap_or_else(|| "multipart/form-data".to_string())
    } else {
        consumes
            .iter()
            .find(|c| c.as_str() == "application/json" || c.ends_with("+json"))
            .cloned()
            .unwrap_or_else(|| "application/json".to_string())
    }
}

/// Preferred media type: JSON, then `*+json`, then multipart, then
/// urlencoded, then whatever is declared first.
fn pick_media_type(content: &IndexMap<String, MediaType>) -> Option<(&str, &MediaType)> {
    let find = |wanted: &str| content.get_key_value(wanted);
    find("application/json")
        .or_else(|| content.iter().find(|(k, _)| k.ends_with("+json")))
        .or_else(|| find("multipart/form-data"))
        .or_else(|| find("application/x-www-form-urlencoded"))
        .or_else(|| content.first())
        .map(|(k, v)| (k.as_str(), v))
}

fn request_body_shape(
    resolver: &mut Resolver<'_>,
    entry: &RefOr<RequestBody>,
    name_candidate: &str,
    location: &str,
) -> Result<Option<RequestBodyShape>> {
    let body_location = child_pointer(location, "requestBody");
    let doc = resolver.doc();
    let body = match entry {
        RefOr::Item(body) => body,
        RefOr::Ref { ref_path } => doc
            .request_body_ref(ref_path)
            .ok_or_else(|| GenError::unresolved(ref_path.as_str(), body_location.as_str()))?,
    };
    let Some((content_type, media)) = pick_media_type(&body.content) else {
        warn!(%location, "request body declares no content; ignoring it");
        return Ok(None);
    };
    let hint = format!("{name_candidate}Body");
    let ty = match &media.schema {
        Some(schema) => {
            let media_location = child_pointer(&child_pointer(&body_location, "content"), content_type);
            resolver.resolve(schema, &hint, &child_pointer(&media_location, "schema"))?
        }
        None => resolver.primitive(Primitive::Any, &body_location),
    };
    Ok(Some(RequestBodyShape {
        ty,
        content_type: content_type.to_string(),
        required: body.required,
    }))
}

fn response_type(
    resolver: &mut Resolver<'_>,
    op: &document::Operation,
    name_candidate: &str,
    location: &str,
) -> Result<TypeId> {
    let doc = resolver.doc();
    let responses_location = child_pointer(location, "responses");
    for status in SUCCESS_STATUSES {
        let Some(entry) = op.responses.get(status) else {
            continue;
        };
        let status_location = child_pointer(&responses_location, status);
        let response: &Response = match entry {
            RefOr::Item(response) => response,
            RefOr::Ref { ref_path } => doc
                .response_ref(ref_path)
                .ok_or_else(|| GenError::unresolved(ref_path.as_str(), status_location.as_str()))?,
        };
        let schema = match pick_media_type(&response.content) {
            Some((media_type, MediaType { schema: Some(schema) })) => Some((
                schema,
                child_pointer(
                    &child_pointer(&child_pointer(&status_location, "content"), media_type),
                    "schema",
                ),
            )),
            _ => response
                .schema
                .as_ref()
                .map(|schema| (schema, child_pointer(&status_location, "schema"))),
        };
        if let Some((schema, schema_location)) = schema {
            return resolver.resolve(schema, &format!("{name_candidate}Response"), &schema_location);
        }
    }
    Ok(resolver.primitive(Primitive::Any, &responses_location))
}

/// Split a path template into static text and `{placeholder}` tokens.
pub fn parse_template(path: &str, operation: &str) -> Result<(Vec<TemplatePart>, Vec<String>)> {
    let mut parts = Vec::new();
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut open: Option<String> = None;

    for c in path.chars() {
        match c {
            '{' => {
                if open.is_some() {
                    return Err(GenError::placeholder(operation, "nested '{' in path template"));
                }
                if !current.is_empty() {
                    parts.push(TemplatePart::Static(std::mem::take(&mut current)));
                }
                open = Some(String::new());
            }
            '}' => {
                let Some(token) = open.take() else {
                    return Err(GenError::placeholder(operation, "unmatched '}' in path template"));
                };
                if token.is_empty() {
                    return Err(GenError::placeholder(operation, "empty placeholder '{}'"));
                }
                if tokens.contains(&token) {
                    return Err(GenError::placeholder(
                        operation,
                        format!("placeholder '{{{token}}}' appears twice"),
                    ));
                }
                parts.push(TemplatePart::Placeholder(tokens.len()));
                tokens.push(token);
            }
            c => match open.as_mut() {
                Some(token) => token.push(c),
                None => current.push(c),
            },
        }
    }
    if open.is_some() {
        return Err(GenError::placeholder(operation, "unclosed '{' in path template"));
    }
    if !current.is_empty() {
        parts.push(TemplatePart::Static(current));
    }
    Ok((parts, tokens))
}

/// Pair every placeholder with a path parameter.
///
/// When every token names a distinct parameter (exactly or by snake_case
/// equivalence) the pairing follows the names; otherwise tokens are filled
/// positionally by parameter declaration order.
fn bind_placeholders(operation: &str, tokens: &[String], params: &[Parameter]) -> Result<Vec<String>> {
    if tokens.len() != params.len() {
        return Err(GenError::placeholder(
            operation,
            format!(
                "{} placeholder(s) in the path template but {} path parameter(s)",
                tokens.len(),
                params.len()
            ),
        ));
    }

    let by_name: Option<Vec<String>> = tokens
        .iter()
        .map(|token| find_matching_param(token, params))
        .collect();
    if let Some(names) = by_name {
        let mut distinct = names.clone();
        distinct.sort();
        distinct.dedup();
        if distinct.len() == names.len() {
            return Ok(names);
        }
    }

    warn!(
        %operation,
        placeholders = ?tokens,
        "placeholders do not name distinct path parameters; binding by position"
    );
    Ok(params.iter().map(|p| p.name.clone()).collect())
}

/// Find a matching param by trying exact match, then snake_case equivalence
fn find_matching_param(placeholder: &str, params: &[Parameter]) -> Option<String> {
    if let Some(p) = params.iter().find(|p| p.name == placeholder) {
        return Some(p.name.clone());
    }
    let placeholder_snake = to_snake_case(placeholder);
    params
        .iter()
        .find(|p| to_snake_case(&p.name) == placeholder_snake)
        .map(|p| p.name.clone())
}

/// Partition operations by tag, in order of first tag appearance.
pub fn partition(operations: &[Operation]) -> Vec<TagGroup> {
    let mut groups: IndexMap<&str, TagGroup> = IndexMap::new();
    for (index, op) in operations.iter().enumerate() {
        for tag in &op.tags {
            groups
                .entry(tag.as_str())
                .or_insert_with(|| TagGroup {
                    tag: tag.clone(),
                    operations: Vec::new(),
                    types: Vec::new(),
                })
                .operations
                .push(index);
        }
    }
    debug!(tags = groups.len(), "partitioned operations");
    groups.into_values().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::document::SchemaDocument;

    fn collect(json: &str) -> (Vec<Operation>, crate::model::TypeArena) {
        let doc = SchemaDocument::from_json(json).unwrap();
        let config = GeneratorConfig::default();
        let mut resolver = Resolver::new(&doc, &config);
        resolver.resolve_components().unwrap();
        let ops = collect_operations(&mut resolver, &config).unwrap();
        (ops, resolver.into_arena())
    }

    fn collect_err(json: &str) -> GenError {
        let doc = SchemaDocument::from_json(json).unwrap();
        let config = GeneratorConfig::default();
        let mut resolver = Resolver::new(&doc, &config);
        resolver.resolve_components().unwrap();
        collect_operations(&mut resolver, &config).unwrap_err()
    }

    #[test]
    fn test_single_path_param_bag() {
        let (ops, arena) = collect(
            r##"{ "paths": { "/pets/{petId}": { "get": {
  "operationId": "getPet",
  "parameters": [ { "name": "petId", "in": "path", "required": true, "schema": { "type": "integer" } } ],
  "responses": { "200": { "description": "ok" } }
} } } }"##,
        );
        let op = &ops[0];
        assert_eq!(op.key, "GET /pets/{petId}");
        assert_eq!(op.path_bindings, ["petId"]);
        assert!(!op.has_query());
        let Type::Object { fields, .. } = arena.ty(op.params_bag.unwrap()) else {
            panic!("bag should be an object");
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "petId");
        assert!(!fields[0].optional);
    }

    #[test]
    fn test_path_fields_first_then_query() {
        let (ops, arena) = collect(
            r##"{ "paths": { "/users/{id}/posts": {
  "parameters": [ { "name": "limit", "in": "query", "schema": { "type": "integer" } } ],
  "get": {
    "parameters": [
      { "name": "X-Trace", "in": "header", "schema": { "type": "string" } },
      { "name": "id", "in": "path", "schema": { "type": "string" } }
    ],
    "responses": {}
  } } } }"##,
        );
        let op = &ops[0];
        assert_eq!(op.name_candidate, "getUsersByIdPosts");
        let Type::Object { fields, .. } = arena.ty(op.params_bag.unwrap()) else {
            panic!("bag should be an object");
        };
        let names: Vec<_> = fields.iter().map(|f| (f.name.as_str(), f.optional)).collect();
        assert_eq!(names, [("id", false), ("limit", true)]);
        assert_eq!(op.tags, ["default"]);
    }

    #[test]
    fn test_operation_param_overrides_path_level() {
        let (ops, _) = collect(
            r##"{ "paths": { "/items": {
  "parameters": [ { "name": "q", "in": "query", "required": false, "schema": { "type": "string" } } ],
  "get": { "parameters": [ { "name": "q", "in": "query", "required": true, "schema": { "type": "string" } } ], "responses": {} }
} } }"##,
        );
        assert_eq!(ops[0].parameters.len(), 1);
        assert!(ops[0].parameters[0].required);
    }

    #[test]
    fn test_body_only_has_no_bag() {
        let (ops, _) = collect(
            r##"{ "paths": { "/pets": { "post": {
  "operationId": "addPet",
  "requestBody": { "content": {
    "application/xml": { "schema": { "type": "string" } },
    "application/json": { "schema": { "type": "object", "properties": { "name": { "type": "string" } } } }
  } },
  "responses": { "201": { "content": { "application/json": { "schema": { "type": "string" } } } } }
} } } }"##,
        );
        let op = &ops[0];
        assert!(op.params_bag.is_none());
        let body = op.body.as_ref().unwrap();
        assert_eq!(body.content_type, "application/json");
    }

    #[test]
    fn test_swagger_body_and_form_data() {
        let (ops, arena) = collect(
            r##"{ "swagger": "2.0", "paths": {
  "/pet": { "post": { "operationId": "addPet", "consumes": ["application/json"],
    "parameters": [ { "name": "body", "in": "body", "required": true, "schema": { "type": "object", "properties": { "id": { "type": "integer" } } } } ],
    "responses": { "200": { "description": "ok", "schema": { "type": "string" } } } } },
  "/pet/{petId}/upload": { "post": { "operationId": "uploadFile", "consumes": ["multipart/form-data"],
    "parameters": [
      { "name": "petId", "in": "path", "required": true, "type": "integer" },
      { "name": "file", "in": "formData", "type": "file" }
    ],
    "responses": {} } }
} }"##,
        );
        assert_eq!(ops[0].body.as_ref().unwrap().content_type, "application/json");
        assert_eq!(arena.ty(ops[0].response), &Type::Primitive(Primitive::String));

        let upload = &ops[1];
        let body = upload.body.as_ref().unwrap();
        assert_eq!(body.content_type, "multipart/form-data");
        let Type::Object { fields, .. } = arena.ty(body.ty) else {
            panic!("form body should be an object");
        };
        assert_eq!(fields[0].name, "file");
        assert_eq!(arena.ty(fields[0].ty), &Type::Primitive(Primitive::File));
        assert_eq!(upload.path_bindings, ["petId"]);
    }

    #[test]
    fn test_placeholder_count_mismatch() {
        let err = collect_err(
            r##"{ "paths": { "/pets/{petId}": { "get": { "responses": {} } } } }"##,
        );
        match err {
            GenError::PlaceholderMismatch { operation, .. } => {
                assert_eq!(operation, "GET /pets/{petId}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_unclosed_placeholder() {
        let err = collect_err(
            r##"{ "paths": { "/pets/{petId": { "get": { "responses": {} } } } }"##,
        );
        assert!(matches!(err, GenError::PlaceholderMismatch { .. }));
    }

    #[test]
    fn test_path_and_query_sharing_a_name_is_rejected() {
        let err = collect_err(
            r##"{ "paths": { "/pets/{id}": { "get": { "operationId": "getPet", "parameters": [
    { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } },
    { "name": "id", "in": "query", "schema": { "type": "integer" } } ], "responses": {} } } } }"##,
        );
        match err {
            GenError::MalformedSchema { location, reason } => {
                assert!(location.ends_with("/get/parameters/1"), "{location}");
                assert!(reason.contains("'id'"), "{reason}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_placeholders_bind_by_name_then_position() {
        let (ops, _) = collect(
            r##"{ "paths": {
  "/a/{owner_id}/{repo}": { "get": { "parameters": [
    { "name": "repo", "in": "path", "type": "string" },
    { "name": "ownerId", "in": "path", "type": "string" } ], "responses": {} } },
  "/b/{x}/{y}": { "get": { "parameters": [
    { "name": "first", "in": "path", "type": "string" },
    { "name": "second", "in": "path", "type": "string" } ], "responses": {} } }
} }"##,
        );
        assert_eq!(ops[0].path_bindings, ["ownerId", "repo"]);
        assert_eq!(ops[1].path_bindings, ["first", "second"]);
    }

    #[test]
    fn test_unresolved_parameter_ref() {
        let err = collect_err(
            r##"{ "paths": { "/x": { "get": { "parameters": [ { "$ref": "#/components/parameters/Nope" } ], "responses": {} } } } }"##,
        );
        assert!(matches!(err, GenError::UnresolvedReference { ref reference, .. } if reference == "#/components/parameters/Nope"));
    }

    #[test]
    fn test_component_parameter_and_response_refs() {
        let (ops, arena) = collect(
            r##"{ "paths": { "/x": { "get": {
  "parameters": [ { "$ref": "#/components/parameters/Limit" } ],
  "responses": { "200": { "$ref": "#/components/responses/Ok" } } } } },
  "components": {
    "parameters": { "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } } },
    "responses": { "Ok": { "description": "ok", "content": { "application/json": { "schema": { "type": "boolean" } } } } }
  } }"##,
        );
        assert_eq!(ops[0].parameters[0].name, "limit");
        assert_eq!(arena.ty(ops[0].response), &Type::Primitive(Primitive::Boolean));
    }

    #[test]
    fn test_partition_multi_tag_and_order() {
        let (ops, _) = collect(
            r##"{ "paths": {
  "/a": { "get": { "tags": ["store"], "responses": {} } },
  "/b": { "get": { "tags": ["pet", "store"], "responses": {} } },
  "/c": { "get": { "responses": {} } }
} }"##,
        );
        let groups = partition(&ops);
        let summary: Vec<_> = groups
            .iter()
            .map(|g| (g.tag.as_str(), g.operations.clone()))
            .collect();
        assert_eq!(
            summary,
            [("store", vec![0, 1]), ("pet", vec![1]), ("default", vec![2])]
        );
    }

    #[test]
    fn test_parse_template() {
        let (parts, tokens) = parse_template("/pets/{petId}/photos/{n}", "GET x").unwrap();
        assert_eq!(tokens, ["petId", "n"]);
        assert_eq!(
            parts,
            [
                TemplatePart::Static("/pets/".into()),
                TemplatePart::Placeholder(0),
                TemplatePart::Static("/photos/".into()),
                TemplatePart::Placeholder(1),
            ]
        );
        assert!(parse_template("/a/{x}/{x}", "GET x").is_err());
        assert!(parse_template("/a/}", "GET x").is_err());
    }
}
