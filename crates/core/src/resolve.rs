//! Schema resolution into the type arena.
//!
//! Named schemas get their arena slot reserved before any body is resolved,
//! so every `$ref` (including self references and mutual recursion) becomes a
//! [`Type::Reference`] to an id that already exists.

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::config::GeneratorConfig;
use crate::document::{
    AdditionalProperties, EnumValue, Required, Schema, SchemaDocument, SchemaType,
};
use crate::error::{GenError, Result};
use crate::model::{Field, Literal, Primitive, Type, TypeArena, TypeId, TypeOrigin, UnionMember};
use crate::naming::ident::type_name;

/// Append an escaped segment to a JSON pointer.
pub(crate) fn child_pointer(location: &str, segment: &str) -> String {
    format!(
        "{location}/{}",
        segment.replace('~', "~0").replace('/', "~1")
    )
}

/// Resolves document schemas into [`TypeArena`] slots.
#[derive(Debug)]
pub struct Resolver<'doc> {
    doc: &'doc SchemaDocument,
    implicit_required: bool,
    arena: TypeArena,
    /// schema pointer -> reserved slot, in document order
    components: IndexMap<String, TypeId>,
}

impl<'doc> Resolver<'doc> {
    pub fn new(doc: &'doc SchemaDocument, config: &GeneratorConfig) -> Self {
        Self {
            doc,
            implicit_required: config.implicit_required,
            arena: TypeArena::new(),
            components: IndexMap::new(),
        }
    }

    pub fn doc(&self) -> &'doc SchemaDocument {
        self.doc
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn into_arena(self) -> TypeArena {
        self.arena
    }

    /// Slots of the named schemas, in document order.
    pub fn components(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.components.values().copied()
    }

    /// Reserve a slot for every named schema, then resolve their bodies.
    pub fn resolve_components(&mut self) -> Result<()> {
        let doc = self.doc;
        for (collection, name, schema) in doc.named_schemas() {
            let pointer = collection.pointer(name);
            let origin = TypeOrigin::Component {
                collection,
                name: name.to_string(),
                pointer: pointer.clone(),
            };
            let id = self.arena.reserve(origin, schema.description.clone());
            self.components.insert(pointer, id);
        }

        for (collection, name, schema) in doc.named_schemas() {
            let pointer = collection.pointer(name);
            let Some(&id) = self.components.get(&pointer) else {
                continue;
            };
            let ty = self.build(schema, &type_name(name), &pointer)?;
            self.arena.set(id, ty);
        }

        self.check_alias_loops()?;
        debug!(count = self.components.len(), "resolved named schemas");
        Ok(())
    }

    /// Resolve an inline schema into a fresh slot.
    ///
    /// A `title` on the schema replaces the positional name hint.
    pub fn resolve(&mut self, schema: &Schema, hint: &str, location: &str) -> Result<TypeId> {
        let hint = schema
            .title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .map_or_else(|| hint.to_string(), type_name);
        let id = self.arena.reserve(inline(&hint, location), schema.description.clone());
        let ty = self.build(schema, &hint, location)?;
        self.arena.set(id, ty);
        Ok(id)
    }

    /// Allocate a slot for a shape assembled outside schema resolution.
    pub fn alloc(&mut self, ty: Type, origin: TypeOrigin, description: Option<String>) -> TypeId {
        self.arena.alloc(ty, origin, description)
    }

    pub fn primitive(&mut self, primitive: Primitive, location: &str) -> TypeId {
        self.arena
            .alloc(Type::Primitive(primitive), inline("", location), None)
    }

    /// Decide whether an object property is required.
    pub fn field_required(&self, object: &Schema, name: &str, property: &Schema) -> bool {
        let flag = match property.required {
            Some(Required::Flag(flag)) => Some(flag),
            _ => None,
        };
        match &object.required {
            Some(Required::List(list)) => list.iter().any(|r| r == name) || flag == Some(true),
            _ => flag.unwrap_or(self.implicit_required),
        }
    }

    fn component_ref(&self, reference: &str, location: &str) -> Result<TypeId> {
        self.doc
            .schema_ref(reference)
            .and_then(|(collection, name, _)| self.components.get(&collection.pointer(name)))
            .copied()
            .ok_or_else(|| GenError::unresolved(reference, location))
    }

    fn build(&mut self, schema: &Schema, hint: &str, location: &str) -> Result<Type> {
        let ty = self.build_shape(schema, hint, location)?;
        if !schema.is_nullable() || ty == Type::Primitive(Primitive::Null) {
            return Ok(ty);
        }
        Ok(match ty {
            Type::Union(mut members) if has_literal(&members) => {
                let null = UnionMember::Literal(Literal::Null);
                if !members.contains(&null) {
                    members.push(null);
                }
                Type::Union(members)
            }
            Type::Union(mut members) => {
                members.push(UnionMember::Type(self.primitive(Primitive::Null, location)));
                Type::Union(members)
            }
            ty => {
                let inner = self.arena.alloc(ty, inline(hint, location), None);
                let null = self.primitive(Primitive::Null, location);
                Type::Union(vec![UnionMember::Type(inner), UnionMember::Type(null)])
            }
        })
    }

    fn build_shape(&mut self, schema: &Schema, hint: &str, location: &str) -> Result<Type> {
        if let Some(reference) = &schema.ref_path {
            return Ok(Type::Reference(self.component_ref(reference, location)?));
        }
        if let Some(parts) = schema.all_of.as_deref().filter(|p| !p.is_empty()) {
            return self.build_intersection(schema, parts, hint, location);
        }
        if let Some(members) = schema.one_of.as_deref().filter(|m| !m.is_empty()) {
            return self.build_union(members, hint, &child_pointer(location, "oneOf"));
        }
        if let Some(members) = schema.any_of.as_deref().filter(|m| !m.is_empty()) {
            return self.build_union(members, hint, &child_pointer(location, "anyOf"));
        }
        if let Some(values) = &schema.enum_values {
            return Ok(enum_union(values));
        }
        if let Some(value) = &schema.const_value {
            return Ok(const_union(value, location));
        }

        match &schema.schema_type {
            Some(SchemaType::Single(kind)) => self.build_typed(schema, kind, hint, location),
            Some(SchemaType::Multiple(kinds)) => {
                let concrete: Vec<&String> = kinds.iter().filter(|k| *k != "null").collect();
                match concrete.as_slice() {
                    [] => Ok(Type::Primitive(Primitive::Null)),
                    [kind] => self.build_typed(schema, kind, hint, location),
                    many => {
                        let mut members = Vec::with_capacity(many.len());
                        for (i, kind) in many.iter().enumerate() {
                            let member_hint = format!("{hint}Variant{}", i + 1);
                            let member_location =
                                child_pointer(&child_pointer(location, "type"), &i.to_string());
                            let ty = self.build_typed(schema, kind, &member_hint, &member_location)?;
                            let id = self.arena.alloc(ty, inline(&member_hint, &member_location), None);
                            members.push(UnionMember::Type(id));
                        }
                        Ok(Type::Union(members))
                    }
                }
            }
            None if schema.properties.is_some() || schema.additional_properties.is_some() => {
                self.build_object(schema, hint, location)
            }
            None if schema.items.is_some() => self.build_array(schema, hint, location),
            None => Ok(Type::Primitive(Primitive::Any)),
        }
    }

    fn build_typed(
        &mut self,
        schema: &Schema,
        kind: &str,
        hint: &str,
        location: &str,
    ) -> Result<Type> {
        let primitive = match kind {
            "string" if schema.format.as_deref() == Some("binary") => Primitive::File,
            "string" => Primitive::String,
            "number" | "integer" => Primitive::Number,
            "boolean" => Primitive::Boolean,
            "null" => Primitive::Null,
            "file" => Primitive::File,
            "array" => return self.build_array(schema, hint, location),
            "object" => return self.build_object(schema, hint, location),
            other => {
                return Err(GenError::malformed(
                    location,
                    format!("unknown schema type '{other}'"),
                ));
            }
        };
        Ok(Type::Primitive(primitive))
    }

    fn build_array(&mut self, schema: &Schema, hint: &str, location: &str) -> Result<Type> {
        let item = match &schema.items {
            Some(items) => self.resolve(items, &format!("{hint}Item"), &child_pointer(location, "items"))?,
            None => self.primitive(Primitive::Any, location),
        };
        Ok(Type::Array(item))
    }

    fn build_object(&mut self, schema: &Schema, hint: &str, location: &str) -> Result<Type> {
        let extra = match &schema.additional_properties {
            Some(AdditionalProperties::Bool(true)) => Some(self.primitive(Primitive::Any, location)),
            Some(AdditionalProperties::Schema(value)) => Some(self.resolve(
                value,
                &format!("{hint}Value"),
                &child_pointer(location, "additionalProperties"),
            )?),
            Some(AdditionalProperties::Bool(false)) | None => None,
        };

        let properties = match &schema.properties {
            Some(properties) if !properties.is_empty() => properties,
            _ => {
                let value = match extra {
                    Some(value) => value,
                    None => self.primitive(Primitive::Any, location),
                };
                return Ok(Type::Map(value));
            }
        };

        let mut fields = Vec::with_capacity(properties.len());
        for (name, property) in properties {
            let field_hint = format!("{hint}{}", type_name(name));
            let field_location = child_pointer(&child_pointer(location, "properties"), name);
            let ty = self.resolve(property, &field_hint, &field_location)?;
            let optional = !self.field_required(schema, name, property);
            trace!(field = %name, optional, "resolved field");
            fields.push(Field {
                name: name.clone(),
                ty,
                optional,
                description: property.description.clone(),
            });
        }
        Ok(Type::Object { fields, extra })
    }

    fn build_intersection(
        &mut self,
        schema: &Schema,
        parts: &[Schema],
        hint: &str,
        location: &str,
    ) -> Result<Type> {
        let all_of = child_pointer(location, "allOf");
        let own_properties = schema.properties.as_ref().is_some_and(|p| !p.is_empty());
        if let [only] = parts {
            if !own_properties {
                return self.build(only, hint, &child_pointer(&all_of, "0"));
            }
        }

        let mut ids = Vec::with_capacity(parts.len() + 1);
        for (i, part) in parts.iter().enumerate() {
            let part_hint = format!("{hint}Part{}", i + 1);
            ids.push(self.resolve(part, &part_hint, &child_pointer(&all_of, &i.to_string()))?);
        }
        if own_properties {
            let part_hint = format!("{hint}Part{}", parts.len() + 1);
            let part_location = child_pointer(location, "properties");
            let id = self.arena.reserve(inline(&part_hint, &part_location), None);
            let ty = self.build_object(schema, &part_hint, location)?;
            self.arena.set(id, ty);
            ids.push(id);
        }
        Ok(Type::Intersection(ids))
    }

    fn build_union(&mut self, members: &[Schema], hint: &str, location: &str) -> Result<Type> {
        let concrete: Vec<(usize, &Schema)> = members
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_null_marker())
            .collect();
        let saw_null = concrete.len() < members.len();

        if let [(i, only)] = concrete.as_slice() {
            if !saw_null {
                return self.build(only, hint, &child_pointer(location, &i.to_string()));
            }
        }

        let mut out = Vec::with_capacity(members.len());
        for (n, (i, member)) in concrete.iter().enumerate() {
            let member_hint = format!("{hint}Variant{}", n + 1);
            let id = self.resolve(member, &member_hint, &child_pointer(location, &i.to_string()))?;
            out.push(UnionMember::Type(id));
        }
        if saw_null {
            out.push(UnionMember::Type(self.primitive(Primitive::Null, location)));
        }
        Ok(Type::Union(out))
    }

    fn check_alias_loops(&self) -> Result<()> {
        for (pointer, &start) in &self.components {
            let mut seen = vec![start];
            let mut current = start;
            while let Type::Reference(next) = self.arena.ty(current) {
                if seen.contains(next) {
                    return Err(GenError::malformed(
                        pointer.as_str(),
                        "reference chain loops back without reaching a concrete schema",
                    ));
                }
                seen.push(*next);
                current = *next;
            }
        }
        Ok(())
    }
}

fn inline(hint: &str, location: &str) -> TypeOrigin {
    TypeOrigin::Inline {
        hint: hint.to_string(),
        location: location.to_string(),
    }
}

fn has_literal(members: &[UnionMember]) -> bool {
    members.iter().any(|m| matches!(m, UnionMember::Literal(_)))
}

fn enum_literal(value: &EnumValue) -> Literal {
    match value {
        EnumValue::String(s) => Literal::String(s.clone()),
        EnumValue::Integer(n) => Literal::Int(*n),
        EnumValue::Float(f) => Literal::Number(*f),
        EnumValue::Bool(b) => Literal::Bool(*b),
        EnumValue::Null => Literal::Null,
    }
}

/// Literal union in source order, without duplicates.
fn enum_union(values: &[EnumValue]) -> Type {
    let mut members: Vec<UnionMember> = Vec::with_capacity(values.len());
    for value in values {
        let member = UnionMember::Literal(enum_literal(value));
        if !members.contains(&member) {
            members.push(member);
        }
    }
    Type::Union(members)
}

fn const_union(value: &serde_json::Value, location: &str) -> Type {
    let literal = match value {
        serde_json::Value::String(s) => Literal::String(s.clone()),
        serde_json::Value::Bool(b) => Literal::Bool(*b),
        serde_json::Value::Null => Literal::Null,
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Literal::Int(i),
            None => Literal::Number(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            warn!(%location, "structured const value is typed as any");
            return Type::Primitive(Primitive::Any);
        }
    };
    Type::Union(vec![UnionMember::Literal(literal)])
}
