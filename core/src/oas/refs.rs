//! # Reference Resolution
//!
//! Follows local `#/components/...` references to the items they name.

use crate::error::{AppError, AppResult};
use openapiv3::{Header, OpenAPI, Parameter, ReferenceOr, RequestBody, Response, Schema};

/// Longest chain of reference-to-reference hops that is followed.
const MAX_REF_DEPTH: usize = 16;

/// Extracts the component name from `#/components/{section}/{name}`.
pub(crate) fn component_name(reference: &str, section: &str) -> AppResult<String> {
    let prefix = format!("#/components/{}/", section);
    reference
        .strip_prefix(prefix.as_str())
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .map(|name| name.replace("~1", "/").replace("~0", "~"))
        .ok_or_else(|| {
            AppError::UnresolvedRef(format!(
                "{} (expected a reference into #/components/{})",
                reference, section
            ))
        })
}

fn resolve<'a, T>(
    mut item: &'a ReferenceOr<T>,
    section: &str,
    lookup: impl Fn(&str) -> Option<&'a ReferenceOr<T>>,
) -> AppResult<&'a T> {
    for _ in 0..MAX_REF_DEPTH {
        match item {
            ReferenceOr::Item(value) => return Ok(value),
            ReferenceOr::Reference { reference } => {
                let name = component_name(reference, section)?;
                item = lookup(&name).ok_or_else(|| AppError::UnresolvedRef(reference.clone()))?;
            }
        }
    }
    Err(AppError::UnresolvedRef(format!(
        "reference chain in #/components/{} is too deep or cyclic",
        section
    )))
}

pub(crate) fn resolve_parameter<'a>(
    doc: &'a OpenAPI,
    item: &'a ReferenceOr<Parameter>,
) -> AppResult<&'a Parameter> {
    resolve(item, "parameters", |name| {
        doc.components.as_ref()?.parameters.get(name)
    })
}

pub(crate) fn resolve_request_body<'a>(
    doc: &'a OpenAPI,
    item: &'a ReferenceOr<RequestBody>,
) -> AppResult<&'a RequestBody> {
    resolve(item, "requestBodies", |name| {
        doc.components.as_ref()?.request_bodies.get(name)
    })
}

pub(crate) fn resolve_response<'a>(
    doc: &'a OpenAPI,
    item: &'a ReferenceOr<Response>,
) -> AppResult<&'a Response> {
    resolve(item, "responses", |name| {
        doc.components.as_ref()?.responses.get(name)
    })
}

pub(crate) fn resolve_header<'a>(
    doc: &'a OpenAPI,
    item: &'a ReferenceOr<Header>,
) -> AppResult<&'a Header> {
    resolve(item, "headers", |name| {
        doc.components.as_ref()?.headers.get(name)
    })
}

/// Follows a component schema (possibly itself a reference) to its definition.
pub(crate) fn resolve_schema<'a>(doc: &'a OpenAPI, reference: &str) -> AppResult<&'a Schema> {
    let name = component_name(reference, "schemas")?;
    let item = doc
        .components
        .as_ref()
        .and_then(|c| c.schemas.get(name.as_str()))
        .ok_or_else(|| AppError::UnresolvedRef(reference.to_string()))?;
    resolve(item, "schemas", |name| {
        doc.components.as_ref()?.schemas.get(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_name() {
        assert_eq!(
            component_name("#/components/schemas/UrlResource", "schemas").unwrap(),
            "UrlResource"
        );
        assert_eq!(
            component_name("#/components/schemas/a~1b", "schemas").unwrap(),
            "a/b"
        );
        assert!(component_name("#/components/parameters/Alias", "schemas").is_err());
        assert!(component_name("other.yaml#/components/schemas/X", "schemas").is_err());
    }

    #[test]
    fn test_resolve_parameter_chain() {
        let yaml = r#"
openapi: 3.0.3
info: { title: T, version: "1" }
paths: {}
components:
  parameters:
    Alias:
      $ref: '#/components/parameters/Real'
    Real:
      name: alias
      in: path
      required: true
      schema: { type: string }
"#;
        let doc: OpenAPI = serde_yaml::from_str(yaml).unwrap();
        let item = ReferenceOr::Reference {
            reference: "#/components/parameters/Alias".to_string(),
        };
        let param = resolve_parameter(&doc, &item).unwrap();
        assert_eq!(param.parameter_data_ref().name, "alias");
    }

    #[test]
    fn test_cyclic_chain_is_reported() {
        let yaml = r#"
openapi: 3.0.3
info: { title: T, version: "1" }
paths: {}
components:
  parameters:
    A: { $ref: '#/components/parameters/B' }
    B: { $ref: '#/components/parameters/A' }
"#;
        let doc: OpenAPI = serde_yaml::from_str(yaml).unwrap();
        let item = ReferenceOr::Reference {
            reference: "#/components/parameters/A".to_string(),
        };
        let err = resolve_parameter(&doc, &item).unwrap_err();
        assert!(matches!(err, AppError::UnresolvedRef(_)));
    }
}
