#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helper functions for deriving Rust-safe identifiers from OpenAPI names:
//! operation ids, property names, tags and path templates.

use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::Span;
use regex::Regex;
use std::sync::OnceLock;
use syn::Ident;

/// Words that are keywords in some edition; they become raw identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const PATH_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/// Type names that would shadow the prelude inside generated modules.
const PRELUDE_TYPES: &[&str] = &[
    "AsMut", "AsRef", "Box", "Clone", "Copy", "Debug", "Default", "Drop", "Eq", "Err", "Extend",
    "Fn", "FnMut", "FnOnce", "From", "Hash", "Into", "IntoIterator", "Iterator", "None", "Ok",
    "Option", "Ord", "PartialEq", "PartialOrd", "Result", "Self", "Send", "Sized", "Some",
    "String", "Sync", "ToOwned", "ToString", "Vec",
];

/// Converts a mixed-case string (CamelCase, camelCase, kebab-case) to snake_case.
/// Used for converting `operationId` into valid Rust function names.
pub fn to_snake_case(s: &str) -> String {
    s.to_snake_case()
}

/// Derives a handler name from the HTTP Method and URL path when `operationId` is missing.
///
/// e.g. `GET /users/{id}` -> `get_users_id`
pub fn derive_handler_name(method: &str, path: &str) -> String {
    let clean_path = path.replace(['{', '}'], "").replace(['/', '-', '.'], "_");
    format!(
        "{}_{}",
        method.to_lowercase(),
        clean_path.trim_start_matches('_')
    )
    .trim_end_matches('_')
    .to_string()
}

/// PascalCase type name. Leading digits get a `T` prefix and prelude names a `Model` suffix.
pub fn to_type_name(s: &str) -> String {
    let name = s.to_upper_camel_case();
    let name = if name.is_empty() {
        "Unnamed".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{}", name)
    } else {
        name
    };
    if PRELUDE_TYPES.contains(&name.as_str()) {
        format!("{}Model", name)
    } else {
        name
    }
}

/// PascalCase enum variant name for a wire value.
pub fn to_variant_name(s: &str) -> String {
    let name = s.to_upper_camel_case();
    if name.is_empty() {
        String::new()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("V{}", name)
    } else if name == "Self" {
        "SelfValue".to_string()
    } else {
        name
    }
}

/// snake_case field, parameter or method name, before keyword escaping.
pub fn field_name(s: &str) -> String {
    let name = s.to_snake_case();
    if name.is_empty() || name == "_" {
        "field".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name
    }
}

/// Identifier for a field, parameter or function, escaping keywords.
pub fn ident(name: &str) -> Ident {
    if PATH_KEYWORDS.contains(&name) {
        Ident::new(&format!("{}_", name), Span::call_site())
    } else if KEYWORDS.contains(&name) {
        Ident::new_raw(name, Span::call_site())
    } else {
        Ident::new(name, Span::call_site())
    }
}

/// Identifier for a type or variant name produced by [`to_type_name`] or [`to_variant_name`].
pub fn type_ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

/// Variant name for a response status code.
pub fn status_variant_name(code: u16) -> String {
    match code {
        100 => "Continue".into(),
        200 => "Ok".into(),
        201 => "Created".into(),
        202 => "Accepted".into(),
        204 => "NoContent".into(),
        206 => "PartialContent".into(),
        301 => "MovedPermanently".into(),
        302 => "Found".into(),
        303 => "SeeOther".into(),
        304 => "NotModified".into(),
        307 => "TemporaryRedirect".into(),
        308 => "PermanentRedirect".into(),
        400 => "BadRequest".into(),
        401 => "Unauthorized".into(),
        403 => "Forbidden".into(),
        404 => "NotFound".into(),
        405 => "MethodNotAllowed".into(),
        406 => "NotAcceptable".into(),
        409 => "Conflict".into(),
        410 => "Gone".into(),
        412 => "PreconditionFailed".into(),
        415 => "UnsupportedMediaType".into(),
        422 => "UnprocessableEntity".into(),
        429 => "TooManyRequests".into(),
        500 => "InternalServerError".into(),
        501 => "NotImplemented".into(),
        502 => "BadGateway".into(),
        503 => "ServiceUnavailable".into(),
        504 => "GatewayTimeout".into(),
        other => format!("Status{}", other),
    }
}

fn template_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("path template pattern is valid"))
}

/// Template variables of a path, in order of appearance.
///
/// e.g. `/urls/{alias}/stats` -> `["alias"]`
pub fn path_variables(path: &str) -> Vec<String> {
    template_pattern()
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}

/// Rewrites `{name}` segments into axum's `:name` form.
pub fn axum_path(path: &str) -> String {
    template_pattern().replace_all(path, ":$1").into_owned()
}
