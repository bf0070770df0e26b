//! End-to-end generation over small OpenAPI and Swagger documents.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashSet;

use oapi_split_core::codegen::QueryWiring;
use oapi_split_core::{GenError, GeneratedOutput, GeneratorConfig, SchemaDocument, generate};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

fn petstore() -> GeneratedOutput {
    let doc = SchemaDocument::from_yaml(PETSTORE).unwrap();
    generate(&doc, &GeneratorConfig::default()).unwrap()
}

fn run_json(json: &str) -> oapi_split_core::Result<GeneratedOutput> {
    let doc = SchemaDocument::from_json(json).unwrap();
    generate(&doc, &GeneratorConfig::default())
}

#[test]
fn test_petstore_pet_module() {
    let output = petstore();
    let pet = output.tag("pet").unwrap();
    assert_eq!(pet.file_stem, "pet");
    assert_eq!(
        pet.functions_source(),
        "// @ts-ignore
/* eslint-disable */
import { request } from 'umi';

/** List all pets GET /pets */
export async function listPets(options?: { [key: string]: any }) {
  return request<API.PetsResponse>('/pets', {
    method: 'GET',
    ...(options || {}),
  });
}

/** Info for a specific pet GET /pets/${param0} */
export async function getPet(params: API.getPetParams, options?: { [key: string]: any }) {
  const { petId: param0 } = params;
  return request<API.Pet>(`/pets/${param0}`, {
    method: 'GET',
    ...(options || {}),
  });
}
"
    );
}

#[test]
fn test_petstore_order_module() {
    let output = petstore();
    let order = output.tag("order").unwrap();
    assert_eq!(
        order.functions_source(),
        "// @ts-ignore
/* eslint-disable */
import { request } from 'umi';

/** Create a new order POST /orders */
export async function createOrder(body: API.OrderRequest, options?: { [key: string]: any }) {
  return request<API.Order>('/orders', {
    method: 'POST',
    headers: {
      'Content-Type': 'application/json',
    },
    data: body,
    ...(options || {}),
  });
}
"
    );
}

#[test]
fn test_petstore_declarations() {
    let output = petstore();
    assert_eq!(
        output.tag("pet").unwrap().declarations_source(),
        "declare namespace API {
  type getPetParams = {
    /** The id of the pet */
    petId: string;
  };

  type Pet = {
    id: string;
    name: string;
    petType?: PetType;
  };

  type PetsResponse = {
    items: Pet[];
    total: number;
  };

  type PetType = 'cat' | 'dog' | 'bird';
}
"
    );
    assert_eq!(
        output.tag("order").unwrap().declarations_source(),
        "declare namespace API {
  type Order = {
    orderId: string;
    status?: OrderStatus;
  };

  type OrderRequest = {
    petId: string;
    quantity: number;
  };

  type OrderStatus = 'created' | 'fulfilled' | 'cancelled';
}
"
    );
}

#[test]
fn test_petstore_index() {
    assert_eq!(
        petstore().index_source(),
        "// @ts-ignore
/* eslint-disable */
import * as pet from './pet';
import * as order from './order';

export default {
  pet,
  order,
};
"
    );
}

#[test]
fn test_generation_is_deterministic() {
    let first = petstore();
    for _ in 0..5 {
        let again = petstore();
        assert_eq!(first.index_source(), again.index_source());
        for (a, b) in first.tags.values().zip(again.tags.values()) {
            assert_eq!(a.functions_source(), b.functions_source());
            assert_eq!(a.declarations_source(), b.declarations_source());
        }
    }
}

#[test]
fn test_every_named_type_declared_once() {
    let output = petstore();
    let mut seen = HashSet::new();
    for tag in output.tags.values() {
        for decl in &tag.declarations {
            assert!(seen.insert(decl.name.clone()), "{} declared twice", decl.name);
        }
    }
    assert_eq!(seen.len(), 7);
}

#[test]
fn test_placeholder_count_matches_path_parameters() {
    let output = run_json(
        r##"{ "paths": { "/users/{user_id}/posts/{postId}": { "get": { "operationId": "getPost", "tags": ["posts"],
  "parameters": [
    { "name": "postId", "in": "path", "required": true, "schema": { "type": "string" } },
    { "name": "userId", "in": "path", "required": true, "schema": { "type": "string" } },
    { "name": "expand", "in": "query", "required": true, "schema": { "type": "boolean" } }
  ], "responses": {} } } } }"##,
    )
    .unwrap();
    let function = &output.tag("posts").unwrap().functions[0];
    assert_eq!(function.call.url, "/users/${param0}/posts/${param1}");
    assert_eq!(
        function.call.path_bindings,
        [
            ("userId".to_string(), "param0".to_string()),
            ("postId".to_string(), "param1".to_string())
        ]
    );
    assert_eq!(function.call.query, QueryWiring::Rest);
    assert!(function.text.contains("(params: API.getPostParams, options?:"));
}

#[test]
fn test_optional_fields_follow_required_list() {
    let output = run_json(
        r##"{ "paths": { "/things": { "get": { "operationId": "listThings", "tags": ["things"],
  "responses": { "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Thing" } } } } } } } },
  "components": { "schemas": { "Thing": { "type": "object", "required": ["id"],
    "properties": { "id": { "type": "integer" }, "label": { "type": ["string", "null"] } } } } } }"##,
    )
    .unwrap();
    assert_eq!(
        output.tag("things").unwrap().declarations_source(),
        "declare namespace API {\n  type Thing = {\n    id: number;\n    label?: string | null;\n  };\n}\n"
    );
}

#[test]
fn test_recursive_schema_terminates() {
    let output = run_json(
        r##"{ "paths": { "/tree": { "get": { "operationId": "getTree", "tags": ["tree"],
  "responses": { "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Node" } } } } } } } },
  "components": { "schemas": { "Node": { "type": "object", "required": ["children"],
    "properties": { "children": { "type": "array", "items": { "$ref": "#/components/schemas/Node" } } } } } } }"##,
    )
    .unwrap();
    let tree = output.tag("tree").unwrap();
    assert_eq!(tree.declarations.len(), 1);
    assert!(tree.declarations_source().contains("    children: Node[];\n"));
}

#[test]
fn test_inline_collision_gets_suffix() {
    let output = run_json(
        r##"{ "paths": {
  "/a": { "get": { "operationId": "getA", "tags": ["t"], "responses": { "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/A" } } } } } } },
  "/b": { "get": { "operationId": "getB", "tags": ["t"], "responses": { "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/B" } } } } } } } },
  "components": { "schemas": {
    "A": { "type": "object", "properties": { "s": { "title": "Status", "type": "string", "enum": ["on"] } } },
    "B": { "type": "object", "properties": { "s": { "title": "Status", "type": "string", "enum": ["off"] } } }
  } } }"##,
    )
    .unwrap();
    let source = output.tag("t").unwrap().declarations_source().to_string();
    assert!(source.contains("  type Status = 'on';\n"));
    assert!(source.contains("  type Status2 = 'off';\n"));
    assert!(source.contains("  type A = {\n    s: Status;\n  };\n"));
    assert!(source.contains("  type B = {\n    s: Status2;\n  };\n"));
}

#[test]
fn test_swagger_body_parameter() {
    let output = run_json(
        r##"{ "swagger": "2.0", "consumes": ["application/json"],
  "paths": { "/pets": { "post": { "operationId": "addPet", "tags": ["pet"],
    "parameters": [ { "name": "pet", "in": "body", "required": true, "schema": { "$ref": "#/definitions/Pet" } } ],
    "responses": { "200": { "schema": { "$ref": "#/definitions/Pet" } } } } } },
  "definitions": { "Pet": { "type": "object", "properties": { "name": { "type": "string" } } } } }"##,
    )
    .unwrap();
    let function = &output.tag("pet").unwrap().functions[0];
    assert_eq!(function.args[0].ty, "API.Pet");
    assert_eq!(function.call.response_type, "API.Pet");
    assert_eq!(
        function.call.body_content_type.as_deref(),
        Some("application/json")
    );
}

#[test]
fn test_dangling_reference_is_an_error() {
    let err = run_json(
        r##"{ "paths": { "/pets": { "get": { "operationId": "listPets",
  "responses": { "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Missing" } } } } } } } } }"##,
    )
    .unwrap_err();
    match err {
        GenError::UnresolvedReference { reference, .. } => {
            assert_eq!(reference, "#/components/schemas/Missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_placeholder_without_parameter_is_an_error() {
    let err = run_json(
        r##"{ "paths": { "/pets/{petId}": { "get": { "operationId": "getPet", "responses": {} } } } }"##,
    )
    .unwrap_err();
    assert!(matches!(err, GenError::PlaceholderMismatch { .. }), "{err}");
}

#[test]
fn test_tag_named_index_does_not_take_index_stem() {
    let output = run_json(
        r##"{ "paths": { "/status": { "get": { "operationId": "getStatus", "tags": ["index"], "responses": {} } } } }"##,
    )
    .unwrap();
    let tag = output.tag("index").unwrap();
    assert_eq!(tag.file_stem, "index2");
    assert_eq!(
        output.index_source(),
        "// @ts-ignore\n/* eslint-disable */\nimport * as index2 from './index2';\n\nexport default {\n  index2,\n};\n"
    );
}
