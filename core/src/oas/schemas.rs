#![deny(missing_docs)]

//! # Schema Parsing
//!
//! Entry point for lowering `components/schemas` on its own.

use crate::error::AppResult;
use crate::oas::models::Model;
use crate::oas::resolver::SchemaLowering;
use openapiv3::OpenAPI;

/// Lowers every component schema (and the inline shapes they contain) into models,
/// sorted by Rust name.
pub fn parse_models(doc: &OpenAPI) -> AppResult<Vec<Model>> {
    let mut lowering = SchemaLowering::new(doc)?;
    lowering.lower_components()?;
    Ok(lowering.into_models())
}
