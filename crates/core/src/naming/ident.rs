//! Identifier helpers shared by naming and printing.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::document::HttpMethod;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Whether a property key must be quoted.
pub fn needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            !chars.all(is_ident_char)
        }
        _ => true,
    }
}

/// Escape text for a single-quoted string literal.
pub fn escape_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// `'text'`
pub fn single_quoted(s: &str) -> String {
    format!("'{}'", escape_single_quoted(s))
}

/// Quote a property key if it is not a plain identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        single_quoted(name)
    } else {
        name.to_string()
    }
}

/// Make text safe inside a `/** ... */` block.
pub fn escape_comment(s: &str) -> String {
    s.replace("*/", "*\\/")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join(" ")
}

fn camel_parts(name: &str) -> String {
    let mut result = String::new();
    for (i, part) in name.split(|c: char| !is_ident_char(c)).enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 || result.is_empty() {
            result.push_str(part);
        } else {
            result.push_str(&capitalize_first(part));
        }
    }
    result
}

fn pascal_words(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .map(capitalize_first)
        .collect()
}

/// Sanitize a name into a valid identifier.
/// - Splits on anything that is not an identifier character and camelCases
/// - Prepends `_` if it starts with a digit
/// - Escapes reserved words with a `_` prefix
pub fn sanitize_identifier(name: &str) -> String {
    let mut result = camel_parts(name);
    if result.is_empty() {
        return "_empty".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result = format!("_{result}");
    }
    if TS_RESERVED_WORDS.contains(result.as_str()) {
        result = format!("_{result}");
    }
    result
}

/// Sanitize a name into a PascalCase type name.
pub fn type_name(name: &str) -> String {
    let mut result = capitalize_first(&camel_parts(name));
    if result.is_empty() {
        return "Anonymous".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result = format!("_{result}");
    }
    result
}

/// Sanitize a tag into a lower-camel file stem.
pub fn file_stem(tag: &str) -> String {
    sanitize_identifier(&lower_first(&camel_parts(tag)))
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercase the first letter of a string.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Convert a string to snake_case (for comparison purposes).
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else if c == '-' {
            result.push('_');
        } else {
            result.push(c);
        }
    }
    result
}

/// Function name for an operation without an `operationId`.
///
/// `GET /pets/{id}` becomes `getPetsById`.
pub fn route_function_name(method: HttpMethod, path: &str) -> String {
    let mut name = method.key().to_string();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if let Some(param) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            name.push_str("By");
            name.push_str(&pascal_words(param));
        } else {
            name.push_str(&pascal_words(segment));
        }
    }
    sanitize_identifier(&name)
}
