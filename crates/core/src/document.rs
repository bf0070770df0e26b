//! Schema document structs for serde deserialization.
//!
//! A subset of OpenAPI 3.x and Swagger 2.0 covering what the generator needs:
//! paths and their operations, parameters, request bodies, responses and
//! named schemas. Maps are `IndexMap`s so document order survives parsing.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{GenError, Result};

const COMPONENT_SCHEMAS: [&str; 2] = ["components", "schemas"];
const DEFINITIONS: [&str; 1] = ["definitions"];

/// Root schema document.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    /// Swagger version marker (`2.0`), when the document is a Swagger document.
    #[serde(default)]
    pub swagger: Option<String>,
    /// OpenAPI version marker (`3.x`).
    #[serde(default)]
    pub openapi: Option<String>,
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
    /// Swagger 2 named schemas.
    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,
    /// Swagger 2 reusable parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    /// Swagger 2 reusable responses.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Reusable OpenAPI 3 components.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    pub request_bodies: IndexMap<String, RequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

/// Top-level tag declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Parse a path item key (`get`, `post`, ...).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "delete" => Some(Self::Delete),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            "patch" => Some(Self::Patch),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }

    /// Lowercase key as it appears in a path item.
    pub fn key(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path item: shared parameters plus its operations in document order.
#[derive(Debug, Clone, Default)]
pub struct PathItem {
    pub parameters: Vec<RefOr<Parameter>>,
    pub operations: Vec<(HttpMethod, Operation)>,
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PathItemVisitor;

        impl<'de> Visitor<'de> for PathItemVisitor {
            type Value = PathItem;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a path item object")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<PathItem, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut item = PathItem::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key == "parameters" {
                        item.parameters = map.next_value()?;
                    } else if let Some(method) = HttpMethod::from_key(&key) {
                        if item.operations.iter().any(|(m, _)| *m == method) {
                            return Err(de::Error::custom(format!("duplicate method '{key}'")));
                        }
                        let operation: Operation = map.next_value()?;
                        item.operations.push((method, operation));
                    } else {
                        // summary, description, servers, $ref ...
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(item)
            }
        }

        deserializer.deserialize_map(PathItemVisitor)
    }
}

/// A reference to a reusable object, or the object itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Item(T),
}

/// An API operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    #[serde(default)]
    pub request_body: Option<RefOr<RequestBody>>,
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
    #[serde(default)]
    pub deprecated: bool,
    /// Swagger 2 request media types.
    #[serde(default)]
    pub consumes: Vec<String>,
}

/// A parameter (path, query, header, cookie, or Swagger 2 body/formData).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Option<Schema>,

    // Swagger 2 non-body parameters describe their type inline.
    #[serde(rename = "type", default)]
    pub param_type: Option<SchemaType>,
    #[serde(default)]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum", default)]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub format: Option<String>,
}

impl Parameter {
    /// The parameter's schema, synthesized from inline Swagger 2 keywords when
    /// no `schema` is given.
    pub fn effective_schema(&self) -> Cow<'_, Schema> {
        if let Some(schema) = &self.schema {
            return Cow::Borrowed(schema);
        }
        Cow::Owned(Schema {
            schema_type: self.param_type.clone(),
            items: self.items.clone(),
            enum_values: self.enum_values.clone(),
            format: self.format.clone(),
            description: self.description.clone(),
            ..Schema::default()
        })
    }
}

/// A request body definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    /// Swagger 2 response schema.
    #[serde(default)]
    pub schema: Option<Schema>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<Schema>,
}

/// JSON Schema node as it appears in the document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default)]
    pub schema_type: Option<SchemaType>,

    #[serde(rename = "$ref", default)]
    pub ref_path: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Properties for object types, in declared order.
    #[serde(default)]
    pub properties: Option<IndexMap<String, Schema>>,

    /// Object-level list of required properties, or a per-property flag.
    #[serde(default)]
    pub required: Option<Required>,

    #[serde(default)]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "enum", default)]
    pub enum_values: Option<Vec<EnumValue>>,

    #[serde(default)]
    pub any_of: Option<Vec<Schema>>,

    #[serde(default)]
    pub one_of: Option<Vec<Schema>>,

    #[serde(default)]
    pub all_of: Option<Vec<Schema>>,

    #[serde(default)]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(rename = "const", default)]
    pub const_value: Option<serde_json::Value>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    #[serde(default)]
    pub nullable: Option<bool>,

    #[serde(default)]
    pub deprecated: Option<bool>,
}

impl Schema {
    /// Check if this schema is nullable (type array with null, or nullable flag).
    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }
        matches!(&self.schema_type, Some(SchemaType::Multiple(types)) if types.iter().any(|t| t == "null"))
    }

    /// Whether this node only holds a `{ "type": "null" }` marker.
    pub fn is_null_marker(&self) -> bool {
        matches!(&self.schema_type, Some(SchemaType::Single(t)) if t == "null")
            && self.ref_path.is_none()
    }
}

/// `required` is a list on objects and a boolean on Swagger-style properties.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Required {
    List(Vec<String>),
    Flag(bool),
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// Where a named schema is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaCollection {
    /// `#/components/schemas`
    Components,
    /// `#/definitions`
    Definitions,
}

impl SchemaCollection {
    /// JSON pointer of a schema in this collection.
    pub fn pointer(self, name: &str) -> String {
        match self {
            Self::Components => pointer(&[COMPONENT_SCHEMAS[0], COMPONENT_SCHEMAS[1], name]),
            Self::Definitions => pointer(&[DEFINITIONS[0], name]),
        }
    }
}

impl SchemaDocument {
    /// Parse a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json);
        let doc = serde_path_to_error::deserialize(&mut de).map_err(invalid_document)?;
        de.end().map_err(|err| GenError::InvalidDocument {
            path: ".".to_string(),
            message: err.to_string(),
        })?;
        Ok(doc)
    }

    /// Parse a document from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let de = serde_yaml::Deserializer::from_str(yaml);
        serde_path_to_error::deserialize(de).map_err(invalid_document)
    }

    /// Build a document from an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_path_to_error::deserialize(value).map_err(invalid_document)
    }

    /// Named schemas of both collections, in document order.
    pub fn named_schemas(&self) -> impl Iterator<Item = (SchemaCollection, &str, &Schema)> {
        self.components
            .schemas
            .iter()
            .map(|(name, schema)| (SchemaCollection::Components, name.as_str(), schema))
            .chain(
                self.definitions
                    .iter()
                    .map(|(name, schema)| (SchemaCollection::Definitions, name.as_str(), schema)),
            )
    }

    /// Look up the named schema a `$ref` points to.
    pub fn schema_ref(&self, reference: &str) -> Option<(SchemaCollection, &str, &Schema)> {
        let segments = decode_pointer(reference)?;
        let (collection, name) = match segments.as_slice() {
            [a, b, name] if a == COMPONENT_SCHEMAS[0] && b == COMPONENT_SCHEMAS[1] => {
                (SchemaCollection::Components, name)
            }
            [a, name] if a == DEFINITIONS[0] => (SchemaCollection::Definitions, name),
            _ => return None,
        };
        let map = match collection {
            SchemaCollection::Components => &self.components.schemas,
            SchemaCollection::Definitions => &self.definitions,
        };
        map.get_key_value(name.as_str())
            .map(|(key, schema)| (collection, key.as_str(), schema))
    }

    /// Look up a reusable parameter.
    pub fn parameter_ref(&self, reference: &str) -> Option<&Parameter> {
        match decode_pointer(reference)?.as_slice() {
            [a, b, name] if a == "components" && b == "parameters" => {
                self.components.parameters.get(name.as_str())
            }
            [a, name] if a == "parameters" => self.parameters.get(name.as_str()),
            _ => None,
        }
    }

    /// Look up a reusable request body.
    pub fn request_body_ref(&self, reference: &str) -> Option<&RequestBody> {
        match decode_pointer(reference)?.as_slice() {
            [a, b, name] if a == "components" && b == "requestBodies" => {
                self.components.request_bodies.get(name.as_str())
            }
            _ => None,
        }
    }

    /// Look up a reusable response.
    pub fn response_ref(&self, reference: &str) -> Option<&Response> {
        match decode_pointer(reference)?.as_slice() {
            [a, b, name] if a == "components" && b == "responses" => {
                self.components.responses.get(name.as_str())
            }
            [a, name] if a == "responses" => self.responses.get(name.as_str()),
            _ => None,
        }
    }
}

fn invalid_document<E: fmt::Display>(err: serde_path_to_error::Error<E>) -> GenError {
    GenError::InvalidDocument {
        path: err.path().to_string(),
        message: err.inner().to_string(),
    }
}

/// Decode a local JSON pointer reference (`#/a/b~1c`) into its segments.
pub fn decode_pointer(reference: &str) -> Option<Vec<String>> {
    let rest = reference.strip_prefix("#/")?;
    Some(
        rest.split('/')
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .collect(),
    )
}

/// Build a local JSON pointer from raw segments.
pub fn pointer(segments: &[&str]) -> String {
    let mut out = String::from("#");
    for segment in segments {
        out.push('/');
        out.push_str(&segment.replace('~', "~0").replace('/', "~1"));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_keep_document_order() {
        let doc = SchemaDocument::from_json(
            r##"{
  "paths": {
    "/b": { "post": { "responses": {} }, "get": { "responses": {} }, "summary": "ignored" },
    "/a": { "delete": { "responses": {} } }
  }
}"##,
        )
        .unwrap();
        let paths: Vec<_> = doc.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, ["/b", "/a"]);
        let methods: Vec<_> = doc.paths["/b"].operations.iter().map(|(m, _)| *m).collect();
        assert_eq!(methods, [HttpMethod::Post, HttpMethod::Get]);
    }

    #[test]
    fn test_properties_keep_declared_order() {
        let doc = SchemaDocument::from_json(
            r##"{
  "paths": {},
  "components": { "schemas": { "Pet": { "type": "object", "properties": {
    "zeta": { "type": "string" }, "alpha": { "type": "string" }, "mid": { "type": "integer" }
  } } } }
}"##,
        )
        .unwrap();
        let props = doc.components.schemas["Pet"].properties.as_ref().unwrap();
        let names: Vec<_> = props.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_missing_paths_is_invalid_document() {
        let err = SchemaDocument::from_json(r#"{ "openapi": "3.0.0" }"#).unwrap_err();
        assert!(matches!(err, GenError::InvalidDocument { .. }), "{err}");
    }

    #[test]
    fn test_invalid_document_reports_path() {
        let err = SchemaDocument::from_json(
            r##"{ "paths": { "/x": { "get": { "tags": "not-a-list" } } } }"##,
        )
        .unwrap_err();
        match err {
            GenError::InvalidDocument { path, .. } => {
                assert!(path.contains("tags"), "path should point at tags, got {path}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_yaml_document() {
        let doc = SchemaDocument::from_yaml(
            "swagger: '2.0'\npaths:\n  /pets:\n    get:\n      operationId: listPets\n      responses: {}\n",
        )
        .unwrap();
        assert_eq!(doc.swagger.as_deref(), Some("2.0"));
        let (method, op) = &doc.paths["/pets"].operations[0];
        assert_eq!(*method, HttpMethod::Get);
        assert_eq!(op.operation_id.as_deref(), Some("listPets"));
    }

    #[test]
    fn test_schema_ref_lookup_both_collections() {
        let doc = SchemaDocument::from_json(
            r##"{
  "paths": {},
  "definitions": { "Legacy": { "type": "string" } },
  "components": { "schemas": { "a/b": { "type": "integer" } } }
}"##,
        )
        .unwrap();
        let (collection, name, _) = doc.schema_ref("#/definitions/Legacy").unwrap();
        assert_eq!(collection, SchemaCollection::Definitions);
        assert_eq!(name, "Legacy");
        let (_, name, _) = doc.schema_ref("#/components/schemas/a~1b").unwrap();
        assert_eq!(name, "a/b");
        assert!(doc.schema_ref("#/components/schemas/Nope").is_none());
        assert!(doc.schema_ref("other.yaml#/Pet").is_none());
    }

    #[test]
    fn test_pointer_round_trip_escapes() {
        let p = pointer(&["paths", "/pets/{id}", "get"]);
        assert_eq!(p, "#/paths/~1pets~1{id}/get");
        assert_eq!(decode_pointer(&p).unwrap(), ["paths", "/pets/{id}", "get"]);
    }

    #[test]
    fn test_swagger_parameter_effective_schema() {
        let param: Parameter = serde_json::from_str(
            r#"{ "name": "status", "in": "query", "type": "string", "enum": ["a", "b"] }"#,
        )
        .unwrap();
        let schema = param.effective_schema();
        assert!(matches!(schema.schema_type, Some(SchemaType::Single(ref t)) if t == "string"));
        assert_eq!(schema.enum_values.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_required_list_and_flag() {
        let schema: Schema = serde_json::from_str(
            r#"{ "type": "object", "required": ["id"], "properties": { "id": { "type": "string", "required": false } } }"#,
        )
        .unwrap();
        assert!(matches!(schema.required, Some(Required::List(ref l)) if l == &["id".to_string()]));
        let prop = &schema.properties.unwrap()["id"];
        assert!(matches!(prop.required, Some(Required::Flag(false))));
    }
}
