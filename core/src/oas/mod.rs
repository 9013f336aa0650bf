#![deny(missing_docs)]

//! # OpenAPI Parsing Module
//!
//! - **models**: Intermediate Representation definitions.
//! - **naming**: Rust-safe identifiers from OpenAPI names.
//! - **resolver**: Logic for mapping OpenAPI schemas to Rust types.
//! - **routes**: Parsing logic for API paths/endpoints.
//! - **schemas**: Parsing logic for data model definitions.
//! - **validation**: Whole-document checks run before lowering.

pub mod models;
pub mod naming;
pub(crate) mod refs;
pub(crate) mod resolver;
pub mod routes;
pub mod schemas;
pub mod validation;

pub use models::{
    BodyMedia, Contract, HttpMethod, Model, Operation, Param, ParamLocation, RequestBody,
    Response, ResponseBody, ResponseHeader, ResponseStatus, RustType,
};
pub use routes::parse_operations;
pub use schemas::parse_models;
pub use validation::{validate_contract, validate_document};

use crate::error::{AppError, AppResult};
use openapiv3::OpenAPI;
use resolver::SchemaLowering;

/// Parses contract text into both a raw YAML tree and a typed document.
pub(crate) fn load_document(text: &str) -> AppResult<(serde_yaml::Value, OpenAPI)> {
    let raw: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| AppError::Contract(format!("Failed to parse YAML: {}", e)))?;
    let doc: OpenAPI = serde_yaml::from_value(raw.clone())
        .map_err(|e| AppError::Contract(format!("Not an OpenAPI 3.x document: {}", e)))?;
    if !doc.openapi.starts_with("3.") {
        return Err(AppError::Contract(format!(
            "unsupported OpenAPI version `{}` (expected 3.x)",
            doc.openapi
        )));
    }
    Ok((raw, doc))
}

/// Parses an OpenAPI 3.x document without validating its references.
pub fn load_contract(text: &str) -> AppResult<OpenAPI> {
    load_document(text).map(|(_, doc)| doc)
}

/// Validates and lowers contract text into the IR consumed by the emitters.
pub fn parse_contract(text: &str) -> AppResult<Contract> {
    let (raw, doc) = load_document(text)?;
    validate_document(&raw, &doc)?;
    lower_contract(&doc)
}

/// Lowers an already-validated document.
pub fn lower_contract(doc: &OpenAPI) -> AppResult<Contract> {
    let mut lowering = SchemaLowering::new(doc)?;
    lowering.lower_components()?;
    let operations = routes::lower_operations(doc, &mut lowering)?;
    Ok(Contract {
        title: doc.info.title.clone(),
        version: doc.info.version.clone(),
        models: lowering.into_models(),
        operations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_contract_checks_version() {
        let body = "info: { title: T, version: '1' }\npaths: {}\n";
        assert!(load_contract(&format!("openapi: 3.0.3\n{}", body)).is_ok());
        let err = load_contract(&format!("openapi: 2.0.0\n{}", body)).unwrap_err();
        assert!(err.to_string().contains("unsupported OpenAPI version `2.0.0`"));
    }
}
