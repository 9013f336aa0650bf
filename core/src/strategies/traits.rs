#![deny(missing_docs)]

//! # Backend Strategy Trait
//!
//! Defines the interface required to generate `server.rs` for a specific web
//! framework (e.g. Actix, Axum).

use crate::codegen::types::TypeContext;
use crate::error::AppResult;
use crate::oas::models::Operation;
use proc_macro2::TokenStream;

/// Operations sharing one path template, registered together.
#[derive(Debug, Clone)]
pub struct RouteGroup<'a> {
    /// Path template as written in the contract.
    pub path: &'a str,
    /// Operations on the path, in method order.
    pub operations: Vec<&'a Operation>,
}

/// A strategy trait for decoupling framework-specific code generation.
///
/// Implementors define how handlers extract parameters, how trait results are
/// turned into HTTP responses, and how routes are registered. Everything they
/// emit lands in one `server.rs` that sits beside `models.rs` and `api.rs`.
pub trait BackendStrategy {
    /// Short framework name used in logs.
    fn name(&self) -> &'static str;

    /// `use` items at the top of `server.rs`.
    fn preamble(&self) -> TokenStream;

    /// One handler function that adapts the framework to a trait method.
    ///
    /// # Arguments
    ///
    /// * `operation` - The lowered operation.
    /// * `ctx` - Type spelling for this file.
    fn handler(&self, operation: &Operation, ctx: &TypeContext) -> AppResult<TokenStream>;

    /// The public registration entry point.
    ///
    /// # Arguments
    ///
    /// * `routes` - Path groups, literal paths first.
    /// * `bounds` - Trait bounds the implementation type must satisfy.
    fn registration(&self, routes: &[RouteGroup<'_>], bounds: &[TokenStream]) -> TokenStream;

    /// Private helpers the handlers call through `support::`.
    fn support(&self) -> TokenStream;
}
