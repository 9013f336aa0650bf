#![deny(missing_docs)]

//! # Type Rendering
//!
//! Turns IR types into token streams and serde attributes. Shared by the model,
//! trait and server emitters so every file spells a type the same way.

use crate::config::DateLibrary;
use crate::oas::models::RustType;
use crate::oas::naming;
use proc_macro2::TokenStream;
use quote::quote;

/// How types are spelled in the file being emitted.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext {
    /// Date/time representation.
    pub date_library: DateLibrary,
    /// Prefix model names with `models::` (files other than `models.rs`).
    pub qualify_models: bool,
}

impl TypeContext {
    /// Context for `models.rs`.
    pub fn models(date_library: DateLibrary) -> Self {
        Self {
            date_library,
            qualify_models: false,
        }
    }

    /// Context for files that import `super::models`.
    pub fn qualified(date_library: DateLibrary) -> Self {
        Self {
            date_library,
            qualify_models: true,
        }
    }

    /// Renders a type.
    pub fn tokens(&self, ty: &RustType) -> TokenStream {
        match ty {
            RustType::Bool => quote!(bool),
            RustType::I32 => quote!(i32),
            RustType::I64 => quote!(i64),
            RustType::F32 => quote!(f32),
            RustType::F64 => quote!(f64),
            RustType::String => quote!(String),
            RustType::Bytes => quote!(Vec<u8>),
            RustType::Uuid => quote!(uuid::Uuid),
            RustType::DateTime => match self.date_library {
                DateLibrary::Chrono => quote!(chrono::DateTime<chrono::Utc>),
                DateLibrary::Time => quote!(time::OffsetDateTime),
                DateLibrary::String => quote!(String),
            },
            RustType::Date => match self.date_library {
                DateLibrary::Chrono => quote!(chrono::NaiveDate),
                DateLibrary::Time => quote!(time::Date),
                DateLibrary::String => quote!(String),
            },
            RustType::Json => quote!(serde_json::Value),
            RustType::Named(name) => {
                let ident = naming::type_ident(name);
                if self.qualify_models {
                    quote!(models::#ident)
                } else {
                    quote!(#ident)
                }
            }
            RustType::Vec(inner) => {
                let inner = self.tokens(inner);
                quote!(Vec<#inner>)
            }
            RustType::Map(inner) => {
                let inner = self.tokens(inner);
                quote!(std::collections::BTreeMap<String, #inner>)
            }
            RustType::Option(inner) => {
                let inner = self.tokens(inner);
                quote!(Option<#inner>)
            }
            RustType::Boxed(inner) => {
                let inner = self.tokens(inner);
                quote!(Box<#inner>)
            }
        }
    }

    /// True when values of this type can be parsed from a header or cookie string.
    pub fn parses_from_str(&self, ty: &RustType) -> bool {
        match ty {
            RustType::DateTime | RustType::Date => self.date_library != DateLibrary::Time,
            other => other.is_scalar(),
        }
    }

    /// `with = ...` module needed to put this type on the wire, if any.
    ///
    /// `time` only ships RFC 3339 adapters for bare and optional values, so
    /// date-times inside a `Vec` or map keep `time`'s own serde format.
    fn serde_with(&self, ty: &RustType) -> Option<&'static str> {
        if self.date_library != DateLibrary::Time {
            return None;
        }
        match ty {
            RustType::DateTime => Some("time::serde::rfc3339"),
            RustType::Option(inner) if **inner == RustType::DateTime => {
                Some("time::serde::rfc3339::option")
            }
            _ => None,
        }
    }

    /// `#[serde(...)]` for a field, or nothing when no option applies.
    ///
    /// `optional` fields default to `None` when absent; `serialize` adds
    /// `skip_serializing_if` so absent values stay absent on the way out.
    pub fn field_serde(
        &self,
        wire_name: &str,
        rust_name: &str,
        ty: &RustType,
        optional: bool,
        serialize: bool,
    ) -> TokenStream {
        let mut args: Vec<TokenStream> = Vec::new();
        if wire_name != rust_name {
            args.push(quote!(rename = #wire_name));
        }
        if optional {
            args.push(quote!(default));
            if serialize {
                args.push(quote!(skip_serializing_if = "Option::is_none"));
            }
        }
        if let Some(module) = self.serde_with(ty) {
            args.push(quote!(with = #module));
        }
        if args.is_empty() {
            quote!()
        } else {
            quote!(#[serde(#(#args),*)])
        }
    }
}

/// `///` lines for a description, or nothing.
pub fn doc_attrs(text: Option<&str>) -> TokenStream {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return quote!();
    };
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                String::new()
            } else {
                format!(" {}", line)
            }
        })
        .collect();
    quote!(#(#[doc = #lines])*)
}
