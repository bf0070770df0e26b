//! TypeScript AST for the emitted modules.
//!
//! Only the constructs the request modules and declaration files use:
//! type expressions, `type` declarations, async request functions and
//! module-level imports.

use crate::model::{Literal, Primitive};

/// TypeScript type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// string, number, boolean, null, any, File
    Primitive(Primitive),
    /// 'a', 42, true
    Literal(Literal),
    /// Named type, already qualified for the module it appears in.
    Ref(String),
    /// T[]
    Array(Box<TsType>),
    /// Record<string, T>
    Record(Box<TsType>),
    /// A | B | C
    Union(Vec<TsType>),
    /// A & B & C
    Intersection(Vec<TsType>),
    /// { [key: string]: T }
    IndexSignature(Box<TsType>),
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// type Foo = { ... } (& Record<string, T>)
    Object {
        props: Vec<TsProp>,
        extra: Option<TsType>,
    },
    /// type Foo = ...
    Alias(TsType),
}

/// Type definition inside the declaration namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    pub name: String,
    pub doc: Option<String>,
    pub kind: TypeDefKind,
}

/// `declare namespace API { ... }`
#[derive(Debug, Clone)]
pub struct TsNamespace {
    pub name: String,
    pub types: Vec<TsTypeDef>,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

/// Template literal part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Static string part
    Static(String),
    /// `${ident}`
    Dynamic(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
    /// key: value
    KeyValue(String, TsExpr),
    /// key
    Shorthand(String),
    /// ...expr
    Spread(TsExpr),
}

/// TypeScript expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    Ident(String),
    /// Single-quoted string literal.
    Str(String),
    /// URL template; a template without dynamic parts prints as a plain string.
    Template(Vec<TemplatePart>),
    Object {
        entries: Vec<ObjectEntry>,
        multiline: bool,
    },
    Call {
        callee: String,
        type_args: Vec<TsType>,
        args: Vec<TsExpr>,
    },
    /// Raw code that doesn't fit the AST
    Raw(String),
}

/// Statement in a function body
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    /// const { a: alias, ...rest } = source;
    Destructure {
        bindings: Vec<(String, String)>,
        rest: Option<String>,
        source: String,
    },
    Return(TsExpr),
}

/// Function definition
#[derive(Debug, Clone)]
pub struct TsFunction {
    pub name: String,
    /// Lines of the leading `/** */` comment.
    pub doc: Vec<String>,
    pub params: Vec<TsParam>,
    pub body: Vec<TsStmt>,
    pub is_async: bool,
    pub is_export: bool,
    /// Signatures longer than this print one parameter per line.
    pub print_width: usize,
}

/// Import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsImport {
    /// import { a, b } from 'mod';
    Named { items: Vec<String>, from: String },
    /// import * as name from 'mod';
    Namespace { alias: String, from: String },
}

/// Top-level module item.
#[derive(Debug, Clone)]
pub enum TsItem {
    Function(TsFunction),
    /// export default expr;
    ExportDefault(TsExpr),
}

/// Complete TypeScript module
#[derive(Debug, Clone)]
pub struct TsModule {
    /// Verbatim leading lines (lint pragmas).
    pub header: Vec<String>,
    pub imports: Vec<TsImport>,
    pub items: Vec<TsItem>,
}
