//! TypeScript code emission via the Emit trait.
//!
//! Each AST type implements `Emit`. Multi-line constructs emit without a
//! leading indent; the enclosing construct indents their continuation lines.

use crate::model::{Literal, Primitive};
use crate::naming::ident::{escape_comment, quote_if_needed, single_quoted};
use crate::ts::{
    ObjectEntry, TemplatePart, TsExpr, TsFunction, TsImport, TsItem, TsModule, TsNamespace,
    TsParam, TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind,
};

const INDENT: &str = "  ";

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

/// Prefix every line after the first with `prefix`.
fn indent_continuation(text: &str, prefix: &str) -> String {
    text.replace('\n', &format!("\n{prefix}"))
}

/// Prefix every non-empty line with `prefix`.
fn indent_block(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn doc_comment(lines: &[String]) -> String {
    match lines {
        [] => String::new(),
        [line] => format!("/** {} */\n", escape_comment(line)),
        lines => {
            let mut output = String::from("/**\n");
            for line in lines {
                output.push_str(&format!(" * {}\n", escape_comment(line)));
            }
            output.push_str(" */\n");
            output
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl Emit for Primitive {
    fn emit(&self) -> String {
        self.ts_name().to_string()
    }
}

impl Emit for Literal {
    fn emit(&self) -> String {
        match self {
            Literal::String(s) => single_quoted(s),
            Literal::Int(i) => i.to_string(),
            Literal::Number(n) => n.to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                // Wrap complex types in parentheses
                if matches!(**inner, TsType::Union(_) | TsType::Intersection(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Record(value) => format!("Record<string, {}>", value.emit()),
            TsType::Union(types) => types.iter().map(|t| t.emit()).collect::<Vec<_>>().join(" | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit();
                    if matches!(t, TsType::Union(_)) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::IndexSignature(value) => format!("{{ [key: string]: {} }}", value.emit()),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let doc = self
            .doc
            .as_ref()
            .map(|d| doc_comment(std::slice::from_ref(d)))
            .unwrap_or_default();
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{doc}{key}{opt}: {};", self.ty.emit())
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let mut output = self
            .doc
            .as_ref()
            .map(|d| doc_comment(std::slice::from_ref(d)))
            .unwrap_or_default();
        match &self.kind {
            TypeDefKind::Object { props, extra } => {
                if props.is_empty() {
                    output.push_str(&format!("type {} = {{}}", self.name));
                } else {
                    output.push_str(&format!("type {} = {{\n", self.name));
                    for prop in props {
                        output.push_str(&indent_block(&prop.emit(), INDENT));
                        output.push('\n');
                    }
                    output.push('}');
                }
                if let Some(extra) = extra {
                    output.push_str(&format!(" & Record<string, {}>", extra.emit()));
                }
                output.push(';');
            }
            TypeDefKind::Alias(ty) => {
                output.push_str(&format!("type {} = {};", self.name, ty.emit()));
            }
        }
        output
    }
}

impl Emit for TsNamespace {
    fn emit(&self) -> String {
        if self.types.is_empty() {
            return format!("declare namespace {} {{}}\n", self.name);
        }
        let body = self
            .types
            .iter()
            .map(|t| indent_block(&t.emit(), INDENT))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("declare namespace {} {{\n{body}\n}}\n", self.name)
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for ObjectEntry {
    fn emit(&self) -> String {
        match self {
            ObjectEntry::KeyValue(key, value) => format!("{}: {}", quote_if_needed(key), value.emit()),
            ObjectEntry::Shorthand(name) => name.clone(),
            ObjectEntry::Spread(expr) => format!("...{}", expr.emit()),
        }
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Str(s) => single_quoted(s),
            TsExpr::Template(parts) => {
                if parts.iter().all(|p| matches!(p, TemplatePart::Static(_))) {
                    let content: String = parts
                        .iter()
                        .map(|p| match p {
                            TemplatePart::Static(s) | TemplatePart::Dynamic(s) => s.as_str(),
                        })
                        .collect();
                    return single_quoted(&content);
                }
                let content: String = parts
                    .iter()
                    .map(|p| match p {
                        TemplatePart::Static(s) => s.replace('\\', "\\\\").replace('`', "\\`"),
                        TemplatePart::Dynamic(e) => format!("${{{e}}}"),
                    })
                    .collect();
                format!("`{content}`")
            }
            TsExpr::Object { entries, multiline } => {
                if entries.is_empty() {
                    "{}".to_string()
                } else if *multiline {
                    let mut output = String::from("{\n");
                    for entry in entries {
                        output.push_str(INDENT);
                        output.push_str(&indent_continuation(&entry.emit(), INDENT));
                        output.push_str(",\n");
                    }
                    output.push('}');
                    output
                } else {
                    let parts: Vec<_> = entries.iter().map(|e| e.emit()).collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            TsExpr::Call {
                callee,
                type_args,
                args,
            } => {
                let type_args_str = if type_args.is_empty() {
                    String::new()
                } else {
                    format!(
                        "<{}>",
                        type_args.iter().map(|t| t.emit()).collect::<Vec<_>>().join(", ")
                    )
                };
                let args_str = args.iter().map(|a| a.emit()).collect::<Vec<_>>().join(", ");
                format!("{callee}{type_args_str}({args_str})")
            }
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        format!("{}{}: {}", self.name, opt, self.ty.emit())
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl TsStmt {
    /// Emit with specified indentation level (2 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        match self {
            TsStmt::Destructure {
                bindings,
                rest,
                source,
            } => {
                let mut parts: Vec<String> = bindings
                    .iter()
                    .map(|(key, alias)| format!("{}: {alias}", quote_if_needed(key)))
                    .collect();
                if let Some(rest) = rest {
                    parts.push(format!("...{rest}"));
                }
                format!("{prefix}const {{ {} }} = {source};\n", parts.join(", "))
            }
            TsStmt::Return(expr) => {
                format!(
                    "{prefix}return {};\n",
                    indent_continuation(&expr.emit(), &prefix)
                )
            }
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let mut output = doc_comment(&self.doc);

        let export_str = if self.is_export { "export " } else { "" };
        let async_str = if self.is_async { "async " } else { "" };
        let head = format!("{export_str}{async_str}function {}(", self.name);

        let params: Vec<String> = self.params.iter().map(|p| p.emit()).collect();
        let one_line = format!("{head}{}) {{", params.join(", "));
        if one_line.len() <= self.print_width || params.is_empty() {
            output.push_str(&one_line);
        } else {
            output.push_str(&head);
            output.push('\n');
            for param in &params {
                output.push_str(&format!("{INDENT}{param},\n"));
            }
            output.push_str(") {");
        }
        output.push('\n');

        for stmt in &self.body {
            output.push_str(&stmt.emit_indented(1));
        }
        output.push_str("}\n");
        output
    }
}

// =============================================================================
// Modules
// =============================================================================

impl Emit for TsImport {
    fn emit(&self) -> String {
        match self {
            TsImport::Named { items, from } => {
                format!("import {{ {} }} from {};", items.join(", "), single_quoted(from))
            }
            TsImport::Namespace { alias, from } => {
                format!("import * as {alias} from {};", single_quoted(from))
            }
        }
    }
}

impl Emit for TsItem {
    fn emit(&self) -> String {
        match self {
            TsItem::Function(function) => function.emit(),
            TsItem::ExportDefault(expr) => format!("export default {};\n", expr.emit()),
        }
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();
        for line in &self.header {
            output.push_str(line);
            output.push('\n');
        }
        for import in &self.imports {
            output.push_str(&import.emit());
            output.push('\n');
        }
        for item in &self.items {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&item.emit());
        }
        output
    }
}
