//! # Axum Strategy
//!
//! Generates axum handlers taking `State<Arc<T>>` and a `router(Arc<T>)`
//! function that wires them up.

use super::{
    call_arguments, cookie_local, handler_doc, header_local, header_text, query_struct_ident,
    text_parameter, BackendStrategy, RouteGroup,
};
use crate::codegen::api::{response_name, trait_name};
use crate::codegen::types::TypeContext;
use crate::error::AppResult;
use crate::oas::models::{
    BodyMedia, HttpMethod, Operation, ParamLocation, Response, ResponseStatus,
};
use crate::oas::naming;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

/// Strategy implementation for axum.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxumStrategy;

fn method_fn(method: HttpMethod) -> Ident {
    format_ident!("{}", method.as_str().to_ascii_lowercase())
}

fn response_arm(enum_ident: &Ident, response: &Response) -> TokenStream {
    let variant = naming::type_ident(&response.variant);
    let status = match response.status {
        ResponseStatus::Code(code) => quote!(support::status_code(#code)),
        _ => quote!(support::status_code(__status)),
    };
    let build = match response.body.as_ref().map(|b| b.media) {
        Some(BodyMedia::Json) => quote!((#status, Json(payload)).into_response()),
        Some(_) => quote!((#status, payload).into_response()),
        None => quote!(#status.into_response()),
    };

    if !response.status.is_dynamic() && response.headers.is_empty() {
        let pattern = match response.body {
            Some(_) => quote!(Ok(api::#enum_ident::#variant(payload))),
            None => quote!(Ok(api::#enum_ident::#variant)),
        };
        return quote!(#pattern => #build,);
    }

    let status_field = response
        .status
        .is_dynamic()
        .then(|| quote!(status: __status,));
    let body_field = response.body.as_ref().map(|_| quote!(body: payload,));
    let mut fields = Vec::new();
    let mut inserts = Vec::new();
    for (index, header) in response.headers.iter().enumerate() {
        let field = naming::ident(&header.name);
        let local = format_ident!("__header_{}", index);
        let wire = header.wire_name.to_ascii_lowercase();
        fields.push(quote!(#field: #local));
        inserts.push(if header.required {
            quote!(support::insert_header(&mut response, #wire, #local.to_string());)
        } else {
            quote! {
                if let Some(value) = #local {
                    support::insert_header(&mut response, #wire, value.to_string());
                }
            }
        });
    }
    quote! {
        Ok(api::#enum_ident::#variant { #status_field #body_field #(#fields,)* }) => {
            let mut response = #build;
            #(#inserts)*
            response
        }
    }
}

impl BackendStrategy for AxumStrategy {
    fn name(&self) -> &'static str {
        "axum"
    }

    fn preamble(&self) -> TokenStream {
        quote! {
            use super::api;
            #[allow(unused_imports)]
            use super::models;
            #[allow(unused_imports)]
            use axum::extract::{Path, Query, State};
            #[allow(unused_imports)]
            use axum::http::HeaderMap;
            #[allow(unused_imports)]
            use axum::response::{IntoResponse, Response};
            #[allow(unused_imports)]
            use axum::{Json, Router};
            use std::sync::Arc;
        }
    }

    fn handler(&self, operation: &Operation, ctx: &TypeContext) -> AppResult<TokenStream> {
        let name = naming::ident(&operation.fn_name);
        let api_trait = format_ident!("{}", trait_name(&operation.tag));
        let enum_ident = format_ident!("{}", response_name(operation));
        let doc = handler_doc(operation);

        let mut args = vec![quote!(State(__service): State<Arc<T>>)];
        let mut prelude = Vec::new();

        let needs_headers = operation
            .params
            .iter()
            .any(|p| matches!(p.location, ParamLocation::Header | ParamLocation::Cookie));
        if needs_headers {
            args.push(quote!(__headers: HeaderMap));
        }

        let path_params: Vec<_> = operation.params_in(ParamLocation::Path).collect();
        match path_params.as_slice() {
            [] => {}
            [single] => {
                let local = naming::ident(&single.name);
                let ty = ctx.tokens(&single.ty);
                args.push(quote!(Path(#local): Path<#ty>));
            }
            many => {
                let locals = many.iter().map(|p| naming::ident(&p.name));
                let types = many.iter().map(|p| ctx.tokens(&p.ty));
                args.push(quote!(Path((#(#locals),*)): Path<(#(#types),*)>));
            }
        }

        if let Some(query) = query_struct_ident(operation) {
            args.push(quote!(Query(__query): Query<#query>));
        }

        for param in operation.params_in(ParamLocation::Header) {
            let wire = param.wire_name.to_ascii_lowercase();
            prelude.push(header_text(param, quote!(__headers.get(#wire))));
            let local = header_local(param);
            prelude.push(text_parameter(param, quote!(#local), ctx));
        }
        for param in operation.params_in(ParamLocation::Cookie) {
            let wire = &param.wire_name;
            let local = cookie_local(param);
            prelude.push(quote!(let #local = support::cookie(&__headers, #wire);));
            prelude.push(text_parameter(param, quote!(#local.as_deref()), ctx));
        }

        // The body extractor consumes the request, so it goes last.
        if let Some(body) = &operation.body {
            let ty = ctx.tokens(&body.ty);
            match (body.media, body.required) {
                (BodyMedia::Json, true) => args.push(quote!(Json(__body): Json<#ty>)),
                (BodyMedia::Json, false) => {
                    args.push(quote!(__body: Option<Json<#ty>>));
                    prelude.push(quote!(let __body = __body.map(|Json(value)| value);));
                }
                (BodyMedia::Text, true) => args.push(quote!(__body: String)),
                (BodyMedia::Text, false) => args.push(quote!(__body: Option<String>)),
                (BodyMedia::Binary, true) => {
                    args.push(quote!(__body: axum::body::Bytes));
                    prelude.push(quote!(let __body = __body.to_vec();));
                }
                (BodyMedia::Binary, false) => {
                    args.push(quote!(__body: Option<axum::body::Bytes>));
                    prelude.push(quote!(let __body = __body.map(|bytes| bytes.to_vec());));
                }
            }
        }

        let call = call_arguments(operation);
        let arms = operation
            .responses
            .iter()
            .map(|response| response_arm(&enum_ident, response));

        Ok(quote! {
            #[doc = #doc]
            async fn #name<T: api::#api_trait>(#(#args),*) -> Response {
                #(#prelude)*
                match __service.#name(#(#call),*).await {
                    #(#arms)*
                    Err(error) => support::handler_error(error),
                }
            }
        })
    }

    fn registration(&self, routes: &[RouteGroup<'_>], bounds: &[TokenStream]) -> TokenStream {
        let routes = routes.iter().map(|group| {
            let path = naming::axum_path(group.path);
            let mut methods = group.operations.iter().map(|operation| {
                let handler = naming::ident(&operation.fn_name);
                let method = method_fn(operation.method);
                (method, handler)
            });
            let first = methods.next().map(|(method, handler)| {
                quote!(axum::routing::#method(#handler::<T>))
            });
            let rest = methods.map(|(method, handler)| quote!(.#method(#handler::<T>)));
            quote!(.route(#path, #first #(#rest)*))
        });
        let where_clause = (!bounds.is_empty()).then(|| quote!(where T: #(#bounds)+*,));
        quote! {
            /// Builds a router serving every operation of the contract.
            pub fn router<T>(service: Arc<T>) -> Router
            #where_clause
            {
                Router::new()
                    #(#routes)*
                    .with_state(service)
            }
        }
    }

    fn support(&self) -> TokenStream {
        quote! {
            #[allow(dead_code)]
            mod support {
                use super::api;
                use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
                use axum::response::{IntoResponse, Response};

                pub(super) fn status_code(code: u16) -> StatusCode {
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                }

                pub(super) fn handler_error(error: api::HandlerError) -> Response {
                    match error {
                        api::HandlerError::NotImplemented => StatusCode::NOT_IMPLEMENTED.into_response(),
                        api::HandlerError::Internal(message) => {
                            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
                        }
                    }
                }

                pub(super) fn missing_parameter(name: &str) -> Response {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("missing required parameter `{}`", name),
                    )
                        .into_response()
                }

                pub(super) fn invalid_parameter(name: &str) -> Response {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("invalid value for parameter `{}`", name),
                    )
                        .into_response()
                }

                pub(super) fn header_text<'a>(
                    value: Option<&'a HeaderValue>,
                    name: &str,
                ) -> Result<Option<&'a str>, Response> {
                    match value {
                        None => Ok(None),
                        Some(value) => value.to_str().map(Some).map_err(|_| invalid_parameter(name)),
                    }
                }

                pub(super) fn parse_parameter<V: std::str::FromStr>(
                    raw: Option<&str>,
                    name: &str,
                ) -> Result<Option<V>, Response> {
                    match raw {
                        None => Ok(None),
                        Some(raw) => raw.parse::<V>().map(Some).map_err(|_| invalid_parameter(name)),
                    }
                }

                pub(super) fn insert_header(response: &mut Response, name: &'static str, value: String) {
                    if let Ok(value) = HeaderValue::from_str(&value) {
                        response.headers_mut().insert(name, value);
                    }
                }

                pub(super) fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
                    headers
                        .get_all(header::COOKIE)
                        .iter()
                        .filter_map(|value| value.to_str().ok())
                        .flat_map(|value| value.split(';'))
                        .filter_map(|pair| pair.trim().split_once('='))
                        .find(|(key, _)| *key == name)
                        .map(|(_, value)| value.to_string())
                }
            }
        }
    }
}
