#![deny(missing_docs)]

//! # Code Generation
//!
//! Renders the lowered contract into Rust source files:
//!
//! - `models.rs`: serde types for every named schema.
//! - `api.rs`: response enums and one async trait per tag.
//! - `server.rs`: framework bindings, unless the framework is `none`.
//! - `mod.rs`: declares the above for crates that use the directory as a module.
//!
//! Output is a pure function of the contract and the [`GeneratorConfig`].

pub(crate) mod api;
pub(crate) mod models;
pub mod types;

use crate::config::GeneratorConfig;
use crate::error::{AppError, AppResult};
use crate::oas::models::Contract;
use crate::strategies;
use proc_macro2::TokenStream;
use quote::quote;
use std::path::PathBuf;

/// A rendered output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Relative path, `/`-separated.
    pub path: PathBuf,
    /// Full file contents.
    pub contents: String,
}

impl GeneratedFile {
    fn new(path: &str, contents: String) -> Self {
        Self {
            path: PathBuf::from(path),
            contents,
        }
    }
}

/// Renders every output file for a contract.
pub fn generate(contract: &Contract, config: &GeneratorConfig) -> AppResult<Vec<GeneratedFile>> {
    api::check_names(contract)?;
    let header = file_header(contract);

    let mut files = vec![
        GeneratedFile::new(
            "models.rs",
            render(&header, models::models_file(contract, config))?,
        ),
        GeneratedFile::new("api.rs", render(&header, api::api_file(contract, config))?),
    ];
    let mut modules = vec![quote!(pub mod api;), quote!(pub mod models;)];

    if let Some(strategy) = strategies::strategy_for(config.framework) {
        tracing::debug!(framework = strategy.name(), "rendering server bindings");
        let server = strategies::server_file(contract, config, strategy.as_ref())?;
        files.push(GeneratedFile::new("server.rs", render(&header, server)?));
        modules.push(quote!(pub mod server;));
    }

    files.push(GeneratedFile::new(
        "mod.rs",
        render(&header, quote!(#(#modules)*))?,
    ));
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Banner identical for every file and every configuration of one contract.
fn file_header(contract: &Contract) -> String {
    let clean = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(
        "// @generated by tinyurl-codegen from \"{}\" {}.\n// Do not edit by hand; regenerate from the contract instead.\n\n",
        clean(&contract.title),
        clean(&contract.version)
    )
}

/// Formats a token stream as a source file.
fn render(header: &str, tokens: TokenStream) -> AppResult<String> {
    let file: syn::File = syn::parse2(tokens)
        .map_err(|e| AppError::General(format!("generated code does not parse: {}", e)))?;
    Ok(format!("{}{}", header, prettyplease::unparse(&file)))
}
