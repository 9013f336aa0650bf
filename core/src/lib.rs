#![deny(missing_docs)]

//! # tinyurl-core
//!
//! Contract compiler: turns an OpenAPI 3.x document into Rust models, handler
//! traits and framework glue before the consuming crate compiles.

/// `build.rs` integration.
pub mod build;

/// Rendering of models, traits and the module file.
pub mod codegen;

/// Generator knobs.
pub mod config;

/// Shared error types.
pub mod error;

/// Ownership manifest written next to generated files.
pub mod manifest;

/// OpenAPI loading, validation and lowering.
pub mod oas;

/// Server bindings per web framework.
pub mod strategies;

/// Writing and cleaning output directories.
pub mod workflows;

pub use build::Builder;
pub use codegen::{generate, GeneratedFile};
pub use config::{DateLibrary, Framework, GeneratorConfig};
pub use error::{AppError, AppResult};
pub use oas::{parse_contract, validate_contract, Contract};
pub use workflows::{clean, generate_to_dir, write_output, CleanOutcome, GenerationReport};
