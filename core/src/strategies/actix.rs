#![deny(missing_docs)]

//! # Actix Strategy
//!
//! Generates actix-web 4 handlers and a `configure::<T>` function that mounts
//! them on a `ServiceConfig`.

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

/// The default strategy implementation for Actix Web.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActixStrategy;

fn method_route(method: HttpMethod) -> TokenStream {
    match method {
        HttpMethod::Get => quote!(web::get()),
        HttpMethod::Put => quote!(web::put()),
        HttpMethod::Post => quote!(web::post()),
        HttpMethod::Delete => quote!(web::delete()),
        HttpMethod::Patch => quote!(web::patch()),
        HttpMethod::Head => quote!(web::head()),
        HttpMethod::Options => quote!(web::method(actix_web::http::Method::OPTIONS)),
        HttpMethod::Trace => quote!(web::method(actix_web::http::Method::TRACE)),
    }
}

fn finish(media: Option<BodyMedia>) -> TokenStream {
    match media {
        Some(BodyMedia::Json) => quote!(.json(payload)),
        Some(BodyMedia::Text) => quote!(.content_type("text/plain; charset=utf-8").body(payload)),
        Some(BodyMedia::Binary) => quote!(.content_type("application/octet-stream").body(payload)),
        None => quote!(.finish()),
    }
}

/// One `match` arm turning a trait response into an `HttpResponse`.
fn response_arm(enum_ident: &Ident, response: &Response) -> TokenStream {
    let variant = naming::type_ident(&response.variant);
    let status = match response.status {
        ResponseStatus::Code(code) => quote!(support::status_code(#code)),
        _ => quote!(support::status_code(__status)),
    };
    let finish = finish(response.body.as_ref().map(|b| b.media));

    if !response.status.is_dynamic() && response.headers.is_empty() {
        let pattern = match response.body {
            Some(_) => quote!(Ok(api::#enum_ident::#variant(payload))),
            None => quote!(Ok(api::#enum_ident::#variant)),
        };
        return quote!(#pattern => HttpResponse::build(#status)#finish,);
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
        let wire = &header.wire_name;
        fields.push(quote!(#field: #local));
        inserts.push(if header.required {
            quote!(builder.insert_header((#wire, #local.to_string()));)
        } else {
            quote! {
                if let Some(value) = #local {
                    builder.insert_header((#wire, value.to_string()));
                }
            }
        });
    }
    quote! {
        Ok(api::#enum_ident::#variant { #status_field #body_field #(#fields,)* }) => {
            let mut builder = HttpResponse::build(#status);
            #(#inserts)*
            builder #finish
        }
    }
}

impl BackendStrategy for ActixStrategy {
    fn name(&self) -> &'static str {
        "actix-web"
    }

    fn preamble(&self) -> TokenStream {
        quote! {
            use super::api;
            #[allow(unused_imports)]
            use super::models;
            #[allow(unused_imports)]
            use actix_web::{web, HttpRequest, HttpResponse};
        }
    }

    fn handler(&self, operation: &Operation, ctx: &TypeContext) -> AppResult<TokenStream> {
        let name = naming::ident(&operation.fn_name);
        let api_trait = format_ident!("{}", trait_name(&operation.tag));
        let enum_ident = format_ident!("{}", response_name(operation));
        let doc = handler_doc(operation);

        let mut args = vec![quote!(__service: web::Data<T>)];
        let mut prelude = Vec::new();

        let needs_request = operation
            .params
            .iter()
            .any(|p| matches!(p.location, ParamLocation::Header | ParamLocation::Cookie));
        if needs_request {
            args.push(quote!(__request: HttpRequest));
        }

        let path_params: Vec<_> = operation.params_in(ParamLocation::Path).collect();
        match path_params.as_slice() {
            [] => {}
            [single] => {
                let local = naming::ident(&single.name);
                let ty = ctx.tokens(&single.ty);
                args.push(quote!(__path: web::Path<#ty>));
                prelude.push(quote!(let #local = __path.into_inner();));
            }
            many => {
                let locals = many.iter().map(|p| naming::ident(&p.name));
                let types = many.iter().map(|p| ctx.tokens(&p.ty));
                args.push(quote!(__path: web::Path<(#(#types),*)>));
                prelude.push(quote!(let (#(#locals),*) = __path.into_inner();));
            }
        }

        if let Some(query) = query_struct_ident(operation) {
            args.push(quote!(__query: web::Query<#query>));
            prelude.push(quote!(let __query = __query.into_inner();));
        }

        for param in operation.params_in(ParamLocation::Header) {
            let wire = &param.wire_name;
            prelude.push(header_text(param, quote!(__request.headers().get(#wire))));
            let local = header_local(param);
            prelude.push(text_parameter(param, quote!(#local), ctx));
        }
        for param in operation.params_in(ParamLocation::Cookie) {
            let wire = &param.wire_name;
            let local = cookie_local(param);
            prelude.push(quote!(let #local = __request.cookie(#wire);));
            let raw = quote!(#local.as_ref().map(|cookie| cookie.value()));
            prelude.push(text_parameter(param, raw, ctx));
        }

        if let Some(body) = &operation.body {
            let ty = ctx.tokens(&body.ty);
            let (extractor, unpack) = match (body.media, body.required) {
                (BodyMedia::Json, true) => (
                    quote!(web::Json<#ty>),
                    Some(quote!(let __body = __body.into_inner();)),
                ),
                (BodyMedia::Json, false) => (
                    quote!(Option<web::Json<#ty>>),
                    Some(quote!(let __body = __body.map(web::Json::into_inner);)),
                ),
                (BodyMedia::Text, true) => (quote!(String), None),
                (BodyMedia::Text, false) => (quote!(Option<String>), None),
                (BodyMedia::Binary, true) => (
                    quote!(web::Bytes),
                    Some(quote!(let __body = __body.to_vec();)),
                ),
                (BodyMedia::Binary, false) => (
                    quote!(Option<web::Bytes>),
                    Some(quote!(let __body = __body.map(|bytes| bytes.to_vec());)),
                ),
            };
            args.push(quote!(__body: #extractor));
            prelude.extend(unpack);
        }

        let call = call_arguments(operation);
        let arms = operation
            .responses
            .iter()
            .map(|response| response_arm(&enum_ident, response));

        Ok(quote! {
            #[doc = #doc]
            async fn #name<T: api::#api_trait>(#(#args),*) -> HttpResponse {
                #(#prelude)*
                match __service.#name(#(#call),*).await {
                    #(#arms)*
                    Err(error) => support::handler_error(error),
                }
            }
        })
    }

    fn registration(&self, routes: &[RouteGroup<'_>], bounds: &[TokenStream]) -> TokenStream {
        let services = routes.iter().map(|group| {
            let path = group.path;
            let methods = group.operations.iter().map(|operation| {
                let handler = naming::ident(&operation.fn_name);
                let route = method_route(operation.method);
                quote!(.route(#route.to(#handler::<T>)))
            });
            quote!(cfg.service(web::resource(#path)#(#methods)*);)
        });
        let where_clause = (!bounds.is_empty()).then(|| quote!(where T: #(#bounds)+*,));
        quote! {
            /// Registers every operation of the contract.
            ///
            /// The implementation must be available as `web::Data<T>` app data.
            pub fn configure<T>(cfg: &mut web::ServiceConfig)
            #where_clause
            {
                #(#services)*
            }
        }
    }

    fn support(&self) -> TokenStream {
        quote! {
            #[allow(dead_code)]
            mod support {
                use super::api;
                use actix_web::http::StatusCode;
                use actix_web::HttpResponse;

                pub(super) fn status_code(code: u16) -> StatusCode {
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                }

                pub(super) fn handler_error(error: api::HandlerError) -> HttpResponse {
                    match error {
                        api::HandlerError::NotImplemented => HttpResponse::NotImplemented().finish(),
                        api::HandlerError::Internal(message) => {
                            HttpResponse::InternalServerError().body(message)
                        }
                    }
                }

                pub(super) fn missing_parameter(name: &str) -> HttpResponse {
                    HttpResponse::BadRequest().body(format!("missing required parameter `{}`", name))
                }

                pub(super) fn invalid_parameter(name: &str) -> HttpResponse {
                    HttpResponse::BadRequest().body(format!("invalid value for parameter `{}`", name))
                }

                pub(super) fn header_text<'a>(
                    value: Option<&'a actix_web::http::header::HeaderValue>,
                    name: &str,
                ) -> Result<Option<&'a str>, HttpResponse> {
                    match value {
                        None => Ok(None),
                        Some(value) => value.to_str().map(Some).map_err(|_| invalid_parameter(name)),
                    }
                }

                pub(super) fn parse_parameter<V: std::str::FromStr>(
                    raw: Option<&str>,
                    name: &str,
                ) -> Result<Option<V>, HttpResponse> {
                    match raw {
                        None => Ok(None),
                        Some(raw) => raw.parse::<V>().map(Some).map_err(|_| invalid_parameter(name)),
                    }
                }
            }
        }
    }
}
