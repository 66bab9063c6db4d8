use heck::ToSnakeCase;

use crate::{
    constants::{IDENTIFIER_REGEX, NAMESPACE_TRIM_CUTSET},
    error::XsdError,
};

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX.is_match(name)
}

/// Class name for a schema type: the prefix followed by each `.`/`-`/`_`-separated piece of the
/// type name with its first letter upper-cased (`Patient.contact` → `FHIRPatientContact`).
pub fn class_name(prefix: &str, type_name: &str) -> Result<String, XsdError> {
    let mut name = prefix.to_string();
    for piece in type_name.split(['.', '-', '_']).filter(|p| !p.is_empty()) {
        let mut chars = piece.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    if is_identifier(&name) {
        Ok(name)
    } else {
        Err(XsdError::InvalidClassName(name))
    }
}

/// Module segment contributed by an ancestor type to the namespace of its descendants.
pub fn module_name(type_name: &str) -> String {
    type_name.replace(['.', '-'], "_").to_snake_case()
}

/// Normalizes a namespace written with `\`, `/`, `.` or `::` separators into a `::`-delimited
/// module path. The empty namespace is the crate root.
pub fn normalize_namespace(raw: &str) -> Result<String, XsdError> {
    let trimmed = raw.trim_matches(NAMESPACE_TRIM_CUTSET);
    let segments: Vec<&str> = trimmed
        .split(['\\', '/', '.', ':'])
        .filter(|s| !s.is_empty())
        .collect();
    if segments.iter().all(|s| is_identifier(s)) {
        Ok(segments.join("::"))
    } else {
        Err(XsdError::InvalidNamespace(raw.to_string()))
    }
}

/// Joins two namespaces, either of which may be empty.
pub fn join_namespace(outer: &str, inner: &str) -> String {
    match (outer.is_empty(), inner.is_empty()) {
        (true, _) => inner.to_string(),
        (_, true) => outer.to_string(),
        _ => format!("{outer}::{inner}"),
    }
}
