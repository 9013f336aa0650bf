//! # Trait Emitter
//!
//! Renders `api.rs`: the handler error type, one response enum per operation,
//! and one async trait per tag.

use crate::codegen::types::{doc_attrs, TypeContext};
use crate::config::GeneratorConfig;
use crate::error::{AppError, AppResult};
use crate::oas::models::{Contract, Operation, Response};
use crate::oas::naming;
use indexmap::IndexMap;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::collections::BTreeMap;

/// Rust name of the trait implementing a tag.
pub(crate) fn trait_name(tag: &str) -> String {
    format!("{}Api", naming::to_type_name(tag))
}

/// Rust name of an operation's response enum.
pub(crate) fn response_name(operation: &Operation) -> String {
    format!("{}Response", operation.type_name)
}

/// Operations grouped by tag, in first-appearance order.
pub(crate) fn operations_by_tag(contract: &Contract) -> IndexMap<&str, Vec<&Operation>> {
    let mut groups: IndexMap<&str, Vec<&Operation>> = IndexMap::new();
    for operation in &contract.operations {
        groups
            .entry(operation.tag.as_str())
            .or_default()
            .push(operation);
    }
    groups
}

/// Rejects contracts whose traits and response enums would share a name.
pub(crate) fn check_names(contract: &Contract) -> AppResult<()> {
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    owners.insert("HandlerError".into(), "the handler error type".into());
    let mut claim = |name: String, owner: String| match owners.get(&name) {
        Some(previous) if *previous != owner => Err(AppError::Contract(format!(
            "{} and {} both need the Rust name `{}`",
            previous, owner, name
        ))),
        _ => {
            owners.insert(name, owner);
            Ok(())
        }
    };
    for (tag, _) in operations_by_tag(contract) {
        claim(trait_name(tag), format!("tag `{}`", tag))?;
    }
    for operation in &contract.operations {
        claim(
            response_name(operation),
            format!("operation `{}`", operation.operation_id),
        )?;
    }
    Ok(())
}

/// Token stream for the whole `api.rs`.
pub(crate) fn api_file(contract: &Contract, config: &GeneratorConfig) -> TokenStream {
    let ctx = TypeContext::qualified(config.date_library);
    let responses = contract
        .operations
        .iter()
        .map(|operation| response_enum(operation, &ctx));
    let traits = operations_by_tag(contract)
        .into_iter()
        .map(|(tag, operations)| api_trait(tag, &operations, config.interface_only, &ctx));

    quote! {
        #[allow(unused_imports)]
        use super::models;

        /// Failure raised by a handler outside of its documented responses.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum HandlerError {
            /// The operation has no implementation.
            NotImplemented,
            /// The implementation failed unexpectedly.
            Internal(String),
        }

        impl std::fmt::Display for HandlerError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    HandlerError::NotImplemented => f.write_str("operation not implemented"),
                    HandlerError::Internal(message) => write!(f, "internal error: {}", message),
                }
            }
        }

        impl std::error::Error for HandlerError {}

        #(#responses)*

        #(#traits)*
    }
}

fn response_enum(operation: &Operation, ctx: &TypeContext) -> TokenStream {
    let ident = format_ident!("{}", response_name(operation));
    let doc = format!(" Responses of `{}`.", operation.operation_id);
    let variants = operation
        .responses
        .iter()
        .map(|response| response_variant(response, ctx));
    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq)]
        pub enum #ident {
            #(#variants,)*
        }
    }
}

fn response_variant(response: &Response, ctx: &TypeContext) -> TokenStream {
    let ident = naming::type_ident(&response.variant);
    let docs = doc_attrs(response.description.as_deref());
    let body = response.body.as_ref().map(|body| ctx.tokens(&body.ty));

    if !response.status.is_dynamic() && response.headers.is_empty() {
        return match body {
            Some(body) => quote!(#docs #ident(#body)),
            None => quote!(#docs #ident),
        };
    }

    let status = response
        .status
        .is_dynamic()
        .then(|| quote!(status: u16,));
    let body = body.map(|body| quote!(body: #body,));
    let headers = response.headers.iter().map(|header| {
        let name = naming::ident(&header.name);
        let ty = ctx.tokens(&header.field_type());
        quote!(#name: #ty)
    });
    quote! {
        #docs
        #ident {
            #status
            #body
            #(#headers,)*
        }
    }
}

fn api_trait(
    tag: &str,
    operations: &[&Operation],
    interface_only: bool,
    ctx: &TypeContext,
) -> TokenStream {
    let ident = format_ident!("{}", trait_name(tag));
    let doc = format!(" Operations tagged `{}`.", tag);
    let methods = operations
        .iter()
        .map(|operation| trait_method(operation, interface_only, ctx));
    quote! {
        #[doc = #doc]
        #[async_trait::async_trait]
        pub trait #ident: Send + Sync + 'static {
            #(#methods)*
        }
    }
}

fn trait_method(operation: &Operation, interface_only: bool, ctx: &TypeContext) -> TokenStream {
    let name = naming::ident(&operation.fn_name);
    let response = format_ident!("{}", response_name(operation));
    let summary = doc_attrs(operation.summary.as_deref());
    let description = doc_attrs(operation.description.as_deref());
    let route = format!(" `{} {}`", operation.method, operation.path);
    let deprecated = operation.deprecated.then(|| quote!(#[deprecated]));

    let params = operation.params.iter().map(|param| {
        let name = naming::ident(&param.name);
        let ty = ctx.tokens(&param.arg_type());
        quote!(#name: #ty)
    });
    let body = operation.body.as_ref().map(|body| {
        let ty = ctx.tokens(&body.arg_type());
        quote!(body: #ty,)
    });
    let signature = quote! {
        async fn #name(&self, #(#params,)* #body) -> Result<#response, HandlerError>
    };

    if interface_only {
        quote! {
            #summary
            #description
            #[doc = #route]
            #deprecated
            #signature;
        }
    } else {
        quote! {
            #summary
            #description
            #[doc = #route]
            #deprecated
            #[allow(unused_variables)]
            #signature {
                Err(HandlerError::NotImplemented)
            }
        }
    }
}
