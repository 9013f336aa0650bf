#![deny(missing_docs)]

//! # Strategies
//!
//! This module defines the architecture for pluggable backend generation.
//!
//! - **traits**: Defines `BackendStrategy` for implementing new frameworks.
//! - **actix**: The default implementation for Actix Web.
//! - **axum**: The implementation for axum.

pub mod actix;
pub mod axum;
pub mod traits;

// Re-export for easier access downstream
pub use actix::ActixStrategy;
pub use axum::AxumStrategy;
pub use traits::{BackendStrategy, RouteGroup};

use crate::codegen::api::{operations_by_tag, trait_name};
use crate::codegen::types::{doc_attrs, TypeContext};
use crate::config::{Framework, GeneratorConfig};
use crate::error::{AppError, AppResult};
use crate::oas::models::{Contract, Operation, Param, ParamLocation, RustType};
use crate::oas::naming;
use indexmap::IndexMap;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

/// Function names the registration entry points occupy.
const RESERVED_FUNCTIONS: &[&str] = &["configure", "router"];

/// Returns the strategy for a framework, or `None` when no bindings are wanted.
pub fn strategy_for(framework: Framework) -> Option<Box<dyn BackendStrategy>> {
    match framework {
        Framework::ActixWeb => Some(Box::new(ActixStrategy)),
        Framework::Axum => Some(Box::new(AxumStrategy)),
        Framework::None => None,
    }
}

/// Token stream for the whole `server.rs`.
pub(crate) fn server_file(
    contract: &Contract,
    config: &GeneratorConfig,
    strategy: &dyn BackendStrategy,
) -> AppResult<TokenStream> {
    let ctx = TypeContext::qualified(config.date_library);
    for operation in &contract.operations {
        check_operation(operation, &ctx)?;
    }

    let preamble = strategy.preamble();
    let queries = contract
        .operations
        .iter()
        .filter_map(|operation| query_struct(operation, &ctx));
    let handlers = contract
        .operations
        .iter()
        .map(|operation| strategy.handler(operation, &ctx))
        .collect::<AppResult<Vec<_>>>()?;
    let bounds: Vec<TokenStream> = operations_by_tag(contract)
        .keys()
        .map(|tag| {
            let ident = format_ident!("{}", trait_name(tag));
            quote!(api::#ident)
        })
        .collect();
    let registration = strategy.registration(&route_groups(contract), &bounds);
    let support = strategy.support();

    Ok(quote! {
        #preamble
        #(#queries)*
        #(#handlers)*
        #registration
        #support
    })
}

/// Operations grouped by path; paths without template variables come first so
/// that `/urls` is matched before `/{alias}`.
pub fn route_groups(contract: &Contract) -> Vec<RouteGroup<'_>> {
    let mut groups: IndexMap<&str, Vec<&Operation>> = IndexMap::new();
    for operation in &contract.operations {
        groups
            .entry(operation.path.as_str())
            .or_default()
            .push(operation);
    }
    let mut routes: Vec<RouteGroup<'_>> = groups
        .into_iter()
        .map(|(path, operations)| RouteGroup { path, operations })
        .collect();
    routes.sort_by_key(|group| naming::path_variables(group.path).len());
    routes
}

/// Rejects operations whose parameters or headers cannot cross the wire as text.
fn check_operation(operation: &Operation, ctx: &TypeContext) -> AppResult<()> {
    let label = format!("{} {}", operation.method, operation.path);
    if RESERVED_FUNCTIONS.contains(&operation.fn_name.as_str()) {
        return Err(AppError::Contract(format!(
            "{}: operation `{}` would shadow the generated `{}` function",
            label, operation.operation_id, operation.fn_name
        )));
    }
    for param in &operation.params {
        let supported = match param.location {
            ParamLocation::Header | ParamLocation::Cookie => ctx.parses_from_str(&param.ty),
            ParamLocation::Path => param.ty.is_scalar() || matches!(param.ty, RustType::Named(_)),
            ParamLocation::Query => true,
        };
        if !supported {
            return Err(AppError::Contract(format!(
                "{}: {} parameter `{}` has a type that cannot be read from text",
                label, param.location, param.wire_name
            )));
        }
    }
    for response in &operation.responses {
        for header in &response.headers {
            if !header.ty.is_scalar() {
                return Err(AppError::Contract(format!(
                    "{}: response header `{}` must be a string, number, boolean, uuid or date",
                    label, header.wire_name
                )));
            }
        }
    }
    Ok(())
}

/// Name of the struct holding an operation's query parameters.
pub(crate) fn query_struct_ident(operation: &Operation) -> Option<Ident> {
    operation
        .params_in(ParamLocation::Query)
        .next()
        .map(|_| format_ident!("{}Query", operation.type_name))
}

fn query_struct(operation: &Operation, ctx: &TypeContext) -> Option<TokenStream> {
    let ident = query_struct_ident(operation)?;
    let doc = format!(" Query string of `{}`.", operation.operation_id);
    let fields = operation.params_in(ParamLocation::Query).map(|param| {
        let ty = param.arg_type();
        let docs = doc_attrs(param.description.as_deref());
        let serde = ctx.field_serde(&param.wire_name, &param.name, &ty, !param.required, false);
        let name = naming::ident(&param.name);
        let ty = ctx.tokens(&ty);
        quote! {
            #docs
            #serde
            pub #name: #ty
        }
    });
    Some(quote! {
        #[doc = #doc]
        #[derive(Debug, serde::Deserialize)]
        pub struct #ident {
            #(#fields,)*
        }
    })
}

/// `let name = ...;` reading a header or cookie through `support::parse_parameter`.
pub(crate) fn text_parameter(param: &Param, raw: TokenStream, ctx: &TypeContext) -> TokenStream {
    let name = naming::ident(&param.name);
    let wire = &param.wire_name;
    let ty = ctx.tokens(&param.ty);
    if param.required {
        quote! {
            let #name: #ty = match support::parse_parameter::<#ty>(#raw, #wire) {
                Ok(Some(value)) => value,
                Ok(None) => return support::missing_parameter(#wire),
                Err(response) => return response,
            };
        }
    } else {
        quote! {
            let #name: Option<#ty> = match support::parse_parameter::<#ty>(#raw, #wire) {
                Ok(value) => value,
                Err(response) => return response,
            };
        }
    }
}

/// Arguments passed to the trait method, in signature order.
pub(crate) fn call_arguments(operation: &Operation) -> Vec<TokenStream> {
    let mut args: Vec<TokenStream> = operation
        .params
        .iter()
        .map(|param| {
            let name = naming::ident(&param.name);
            if param.location == ParamLocation::Query {
                quote!(__query.#name)
            } else {
                quote!(#name)
            }
        })
        .collect();
    if operation.body.is_some() {
        args.push(quote!(__body));
    }
    args
}

/// Local holding a header's text before it is parsed.
pub(crate) fn header_local(param: &Param) -> Ident {
    format_ident!("__raw_{}", param.name)
}

/// `let __raw_x = ...;` reading a header as visible ASCII, returning 400 when
/// the header is present but not readable as text.
pub(crate) fn header_text(param: &Param, value: TokenStream) -> TokenStream {
    let local = header_local(param);
    let wire = &param.wire_name;
    quote! {
        let #local = match support::header_text(#value, #wire) {
            Ok(text) => text,
            Err(response) => return response,
        };
    }
}

/// Local holding a cookie before it is parsed.
pub(crate) fn cookie_local(param: &Param) -> Ident {
    format_ident!("__cookie_{}", param.name)
}

/// Doc line placed on each handler.
pub(crate) fn handler_doc(operation: &Operation) -> String {
    format!(
        " `{} {}` -> `{}::{}`",
        operation.method,
        operation.path,
        trait_name(&operation.tag),
        operation.fn_name
    )
}
