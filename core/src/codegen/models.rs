//! # Model Emitter
//!
//! Renders `models.rs`: one serde type per named schema.

use crate::codegen::types::{doc_attrs, TypeContext};
use crate::config::GeneratorConfig;
use crate::oas::models::{Contract, Model, ModelAlias, ModelEnum, ModelStruct, ModelUnion};
use crate::oas::naming;
use proc_macro2::TokenStream;
use quote::quote;

/// Token stream for the whole `models.rs`.
pub(crate) fn models_file(contract: &Contract, config: &GeneratorConfig) -> TokenStream {
    let ctx = TypeContext::models(config.date_library);
    let items = contract.models.iter().map(|model| match model {
        Model::Struct(model) => render_struct(model, &ctx),
        Model::Enum(model) => render_enum(model),
        Model::Union(model) => render_union(model, &ctx),
        Model::Alias(model) => render_alias(model, &ctx),
    });
    quote!(#(#items)*)
}

fn render_struct(model: &ModelStruct, ctx: &TypeContext) -> TokenStream {
    let ident = naming::type_ident(&model.name);
    let docs = doc_attrs(model.description.as_deref());
    let deprecated = model.deprecated.then(|| quote!(#[deprecated]));
    let fields = model.fields.iter().map(|field| {
        let docs = doc_attrs(field.description.as_deref());
        let deprecated = field.deprecated.then(|| quote!(#[deprecated]));
        let serde = ctx.field_serde(
            &field.wire_name,
            &field.name,
            &field.ty,
            !field.required,
            true,
        );
        let name = naming::ident(&field.name);
        let ty = ctx.tokens(&field.ty);
        quote! {
            #docs
            #deprecated
            #serde
            pub #name: #ty
        }
    });
    let additional = model.additional.as_ref().map(|value| {
        let value = ctx.tokens(value);
        quote! {
            #[serde(flatten)]
            pub additional_properties: std::collections::BTreeMap<String, #value>
        }
    });
    quote! {
        #docs
        #deprecated
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct #ident {
            #(#fields,)*
            #additional
        }
    }
}

fn render_enum(model: &ModelEnum) -> TokenStream {
    let ident = naming::type_ident(&model.name);
    let docs = doc_attrs(model.description.as_deref());
    let variants = model.variants.iter().map(|variant| {
        let name = naming::type_ident(&variant.name);
        let wire = &variant.wire_value;
        quote! {
            #[serde(rename = #wire)]
            #name
        }
    });
    let displays = model.variants.iter().map(|variant| {
        let name = naming::type_ident(&variant.name);
        let wire = &variant.wire_value;
        quote!(#ident::#name => #wire)
    });
    quote! {
        #docs
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum #ident {
            #(#variants,)*
        }

        impl std::fmt::Display for #ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    #(#displays,)*
                })
            }
        }
    }
}

fn render_union(model: &ModelUnion, ctx: &TypeContext) -> TokenStream {
    let ident = naming::type_ident(&model.name);
    let docs = doc_attrs(model.description.as_deref());
    let variants = model.variants.iter().map(|variant| {
        let name = naming::type_ident(&variant.name);
        let ty = ctx.tokens(&variant.ty);
        quote!(#name(#ty))
    });
    quote! {
        #docs
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(untagged)]
        pub enum #ident {
            #(#variants,)*
        }
    }
}

fn render_alias(model: &ModelAlias, ctx: &TypeContext) -> TokenStream {
    let ident = naming::type_ident(&model.name);
    let docs = doc_attrs(model.description.as_deref());
    let target = ctx.tokens(&model.target);
    quote! {
        #docs
        pub type #ident = #target;
    }
}
