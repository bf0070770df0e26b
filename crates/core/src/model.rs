//! Normalized type model.
//!
//! Types live in an id-indexed [`TypeArena`]. Recursive shapes point at each
//! other through [`Type::Reference`] slots, so the graph stays finite no matter
//! how the schemas loop.

use std::collections::HashSet;
use std::fmt;

use crate::document::SchemaCollection;

/// Index of a slot in the [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Null,
    Any,
    /// Binary payloads (`format: binary`, Swagger `type: file`).
    File,
}

impl Primitive {
    pub fn ts_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Any => "any",
            Self::File => "File",
        }
    }
}

/// Literal member of an enum union.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Int(i64),
    Number(f64),
    Bool(bool),
    Null,
}

/// One field of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnionMember {
    Literal(Literal),
    Type(TypeId),
}

/// A normalized shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    /// Ordered fields, plus the value type of undeclared keys when allowed.
    Object {
        fields: Vec<Field>,
        extra: Option<TypeId>,
    },
    Array(TypeId),
    /// String-keyed record of a value type.
    Map(TypeId),
    Union(Vec<UnionMember>),
    Intersection(Vec<TypeId>),
    Reference(TypeId),
}

impl Type {
    /// Direct children of this shape.
    pub fn children(&self) -> Vec<TypeId> {
        match self {
            Type::Primitive(_) => Vec::new(),
            Type::Object { fields, extra } => {
                fields.iter().map(|f| f.ty).chain(extra.iter().copied()).collect()
            }
            Type::Array(inner) | Type::Map(inner) | Type::Reference(inner) => vec![*inner],
            Type::Union(members) => members
                .iter()
                .filter_map(|m| match m {
                    UnionMember::Type(id) => Some(*id),
                    UnionMember::Literal(_) => None,
                })
                .collect(),
            Type::Intersection(parts) => parts.clone(),
        }
    }

    fn has_literal(&self) -> bool {
        matches!(self, Type::Union(members) if members.iter().any(|m| matches!(m, UnionMember::Literal(_))))
    }
}

/// Where a slot came from; drives naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOrigin {
    /// A named schema of the document.
    Component {
        collection: SchemaCollection,
        name: String,
        pointer: String,
    },
    /// The merged path+query parameter type of an operation.
    ParamsBag { operation: String },
    /// Anything else, with the name it would get if hoisted.
    Inline { hint: String, location: String },
}

impl TypeOrigin {
    /// Stable owner key for the name registry.
    pub fn owner_key(&self) -> String {
        match self {
            TypeOrigin::Component { pointer, .. } => format!("schema:{pointer}"),
            TypeOrigin::ParamsBag { operation } => format!("params:{operation}"),
            TypeOrigin::Inline { location, .. } => format!("inline:{location}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeSlot {
    pub ty: Type,
    pub origin: TypeOrigin,
    pub description: Option<String>,
}

/// Id-indexed table of every type of a run.
#[derive(Debug, Clone, Default)]
pub struct TypeArena {
    slots: Vec<TypeSlot>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot whose shape is filled in later with [`TypeArena::set`].
    pub fn reserve(&mut self, origin: TypeOrigin, description: Option<String>) -> TypeId {
        self.alloc(Type::Primitive(Primitive::Any), origin, description)
    }

    pub fn alloc(
        &mut self,
        ty: Type,
        origin: TypeOrigin,
        description: Option<String>,
    ) -> TypeId {
        let id = TypeId(self.slots.len());
        self.slots.push(TypeSlot {
            ty,
            origin,
            description,
        });
        id
    }

    pub fn set(&mut self, id: TypeId, ty: Type) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.ty = ty;
        }
    }

    /// Slot for an id handed out by this arena.
    pub fn slot(&self, id: TypeId) -> &TypeSlot {
        &self.slots[id.0]
    }

    pub fn ty(&self, id: TypeId) -> &Type {
        &self.slot(id).ty
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.slots.len()).map(TypeId)
    }

    /// Whether the slot becomes a named declaration rather than being
    /// written structurally at its use site.
    pub fn is_hoisted(&self, id: TypeId) -> bool {
        let slot = self.slot(id);
        match &slot.origin {
            TypeOrigin::Component { .. } | TypeOrigin::ParamsBag { .. } => true,
            TypeOrigin::Inline { .. } => match &slot.ty {
                Type::Object { .. } | Type::Intersection(_) => true,
                ty => ty.has_literal(),
            },
        }
    }

    /// Hoisted types reachable from `roots`, in first-visit order.
    ///
    /// The walk passes through every slot once, so it terminates on cyclic
    /// graphs. Roots that are hoisted themselves are included.
    pub fn named_closure(&self, roots: &[TypeId]) -> Vec<TypeId> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        let mut stack: Vec<TypeId> = roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if self.is_hoisted(id) {
                out.push(id);
            }
            for child in self.ty(id).children().into_iter().rev() {
                if !visited.contains(&child) {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Hoisted types this slot refers to without passing through another
    /// hoisted type.
    pub fn direct_named_deps(&self, id: TypeId) -> Vec<TypeId> {
        let mut visited = HashSet::from([id]);
        let mut out = Vec::new();
        let mut stack: Vec<TypeId> = self.ty(id).children().into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            if self.is_hoisted(next) {
                out.push(next);
                continue;
            }
            stack.extend(self.ty(next).children().into_iter().rev());
        }
        out
    }
}
