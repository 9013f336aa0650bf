#![deny(missing_docs)]

//! # Route Parsing
//!
//! Lowers `paths` into [`Operation`]s: parameters merged and ordered, request
//! bodies and responses resolved, inline payload schemas hoisted into models.

use crate::error::{AppError, AppResult};
use crate::oas::models::{
    BodyMedia, HttpMethod, Operation, Param, ParamLocation, RequestBody, Response, ResponseBody,
    ResponseHeader, ResponseStatus, RustType,
};
use crate::oas::naming;
use crate::oas::refs;
use crate::oas::resolver::{SchemaLowering, SchemaRef};
use openapiv3::{
    MediaType, OpenAPI, Operation as OasOperation, Parameter, ParameterData,
    ParameterSchemaOrContent, PathItem, ReferenceOr, Schema, StatusCode,
};
use std::collections::BTreeMap;

/// Operations of a path item, in fixed method order.
pub(crate) fn path_operations(item: &PathItem) -> Vec<(HttpMethod, &OasOperation)> {
    [
        (HttpMethod::Get, &item.get),
        (HttpMethod::Put, &item.put),
        (HttpMethod::Post, &item.post),
        (HttpMethod::Delete, &item.delete),
        (HttpMethod::Options, &item.options),
        (HttpMethod::Head, &item.head),
        (HttpMethod::Patch, &item.patch),
        (HttpMethod::Trace, &item.trace),
    ]
    .into_iter()
    .filter_map(|(method, operation)| operation.as_ref().map(|op| (method, op)))
    .collect()
}

/// Parses all operations of a document.
pub fn parse_operations(doc: &OpenAPI) -> AppResult<Vec<Operation>> {
    let mut lowering = SchemaLowering::new(doc)?;
    lowering.lower_components()?;
    lower_operations(doc, &mut lowering)
}

pub(crate) fn lower_operations<'a>(
    doc: &'a OpenAPI,
    lowering: &mut SchemaLowering<'a>,
) -> AppResult<Vec<Operation>> {
    let mut operations = Vec::new();
    for (path, item) in doc.paths.paths.iter() {
        let item = match item {
            ReferenceOr::Item(item) => item,
            ReferenceOr::Reference { reference } => {
                return Err(AppError::Contract(format!(
                    "path `{}` is a reference ({}); path item references are not supported",
                    path, reference
                )))
            }
        };
        for (method, operation) in path_operations(item) {
            let lowered = lower_operation(doc, lowering, path, method, &item.parameters, operation)?;
            operations.push(lowered);
        }
    }
    check_unique_names(&operations)?;
    Ok(operations)
}

fn check_unique_names(operations: &[Operation]) -> AppResult<()> {
    let mut fns: BTreeMap<&str, &str> = BTreeMap::new();
    let mut types: BTreeMap<&str, &str> = BTreeMap::new();
    for op in operations {
        if let Some(previous) = fns.insert(&op.fn_name, &op.operation_id) {
            return Err(AppError::Contract(format!(
                "operations `{}` and `{}` both map to the function `{}`",
                previous, op.operation_id, op.fn_name
            )));
        }
        if let Some(previous) = types.insert(&op.type_name, &op.operation_id) {
            return Err(AppError::Contract(format!(
                "operations `{}` and `{}` both map to the type prefix `{}`",
                previous, op.operation_id, op.type_name
            )));
        }
    }
    Ok(())
}

fn split_parameter(param: &Parameter) -> (&ParameterData, ParamLocation) {
    match param {
        Parameter::Query { parameter_data, .. } => (parameter_data, ParamLocation::Query),
        Parameter::Header { parameter_data, .. } => (parameter_data, ParamLocation::Header),
        Parameter::Path { parameter_data, .. } => (parameter_data, ParamLocation::Path),
        Parameter::Cookie { parameter_data, .. } => (parameter_data, ParamLocation::Cookie),
    }
}

fn lower_operation<'a>(
    doc: &'a OpenAPI,
    lowering: &mut SchemaLowering<'a>,
    path: &str,
    method: HttpMethod,
    path_params: &'a [ReferenceOr<Parameter>],
    op: &'a OasOperation,
) -> AppResult<Operation> {
    let operation_id = op
        .operation_id
        .clone()
        .unwrap_or_else(|| naming::derive_handler_name(method.as_str(), path));
    let fn_name = naming::field_name(&operation_id);
    let type_name = naming::to_type_name(&operation_id);
    let label = format!("{} {}", method, path);

    // Operation-level parameters override path-level ones with the same name and location.
    let mut merged: Vec<(&'a ParameterData, ParamLocation)> = Vec::new();
    for item in path_params.iter().chain(op.parameters.iter()) {
        let (data, location) = split_parameter(refs::resolve_parameter(doc, item)?);
        match merged
            .iter_mut()
            .find(|(d, l)| d.name == data.name && *l == location)
        {
            Some(existing) => *existing = (data, location),
            None => merged.push((data, location)),
        }
    }

    let mut params = Vec::new();
    for variable in naming::path_variables(path) {
        let (data, _) = merged
            .iter()
            .find(|(d, l)| *l == ParamLocation::Path && d.name == variable)
            .ok_or_else(|| {
                AppError::Contract(format!(
                    "{}: path variable `{}` has no path parameter",
                    label, variable
                ))
            })?;
        params.push(lower_param(lowering, &type_name, data, ParamLocation::Path)?);
    }
    for (data, location) in merged.iter().filter(|(_, l)| *l != ParamLocation::Path) {
        params.push(lower_param(lowering, &type_name, data, *location)?);
    }

    let body = match &op.request_body {
        Some(item) => {
            let request_body = refs::resolve_request_body(doc, item)?;
            match pick_media(&request_body.content) {
                Some((media, schema)) => Some(RequestBody {
                    ty: payload_type(lowering, media, schema, &format!("{}Body", type_name))?,
                    required: request_body.required,
                    media,
                }),
                None => None,
            }
        }
        None => None,
    };

    let mut names: BTreeMap<&str, &str> = BTreeMap::new();
    for param in &params {
        if body.is_some() && param.name == "body" {
            return Err(AppError::Contract(format!(
                "{}: parameter `{}` clashes with the request body argument",
                label, param.wire_name
            )));
        }
        if let Some(previous) = names.insert(&param.name, &param.wire_name) {
            return Err(AppError::Contract(format!(
                "{}: parameters `{}` and `{}` both map to `{}`",
                label, previous, param.wire_name, param.name
            )));
        }
    }

    let mut responses = Vec::new();
    for (code, item) in op.responses.responses.iter() {
        let status = match code {
            StatusCode::Code(code) => ResponseStatus::Code(u16::from(*code)),
            StatusCode::Range(range) => ResponseStatus::Range(u16::from(*range)),
        };
        responses.push(lower_response(doc, lowering, &type_name, &label, status, item)?);
    }
    if let Some(item) = &op.responses.default {
        responses.push(lower_response(
            doc,
            lowering,
            &type_name,
            &label,
            ResponseStatus::Default,
            item,
        )?);
    }
    if responses.is_empty() {
        return Err(AppError::Contract(format!("{} declares no responses", label)));
    }

    Ok(Operation {
        fn_name,
        type_name,
        method,
        path: path.to_string(),
        tag: op
            .tags
            .first()
            .cloned()
            .unwrap_or_else(|| "default".to_string()),
        summary: op.summary.clone(),
        description: op.description.clone(),
        deprecated: op.deprecated,
        params,
        body,
        responses,
        operation_id,
    })
}

fn lower_param<'a>(
    lowering: &mut SchemaLowering<'a>,
    type_name: &str,
    data: &'a ParameterData,
    location: ParamLocation,
) -> AppResult<Param> {
    let hint = format!("{}{}", type_name, naming::to_type_name(&data.name));
    let ty = match &data.format {
        ParameterSchemaOrContent::Schema(schema) => lowering.lower(SchemaRef::from(schema), &hint)?,
        ParameterSchemaOrContent::Content(content) => {
            match content.values().next().and_then(|m| m.schema.as_ref()) {
                Some(schema) => lowering.lower(SchemaRef::from(schema), &hint)?,
                None => RustType::String,
            }
        }
    };
    Ok(Param {
        name: naming::field_name(&data.name),
        wire_name: data.name.clone(),
        location,
        ty,
        required: location == ParamLocation::Path || data.required,
        description: data.description.clone(),
    })
}

/// Chooses the representation for a content map: JSON first, then text, then anything.
fn pick_media<'a, I>(content: I) -> Option<(BodyMedia, Option<&'a ReferenceOr<Schema>>)>
where
    I: IntoIterator<Item = (&'a String, &'a MediaType)>,
{
    let entries: Vec<(&String, &MediaType)> = content.into_iter().collect();
    let is_json = |mime: &str| {
        let mime = mime.to_ascii_lowercase();
        mime.starts_with("application/json") || mime.contains("+json")
    };
    if let Some((_, media)) = entries.iter().find(|(mime, _)| is_json(mime.as_str())) {
        return Some((BodyMedia::Json, media.schema.as_ref()));
    }
    if let Some((_, media)) = entries
        .iter()
        .find(|(mime, _)| mime.to_ascii_lowercase().starts_with("text/"))
    {
        return Some((BodyMedia::Text, media.schema.as_ref()));
    }
    entries
        .first()
        .map(|(_, media)| (BodyMedia::Binary, media.schema.as_ref()))
}

fn payload_type<'a>(
    lowering: &mut SchemaLowering<'a>,
    media: BodyMedia,
    schema: Option<&'a ReferenceOr<Schema>>,
    hint: &str,
) -> AppResult<RustType> {
    Ok(match (media, schema) {
        (BodyMedia::Json, Some(schema)) => lowering.lower(SchemaRef::from(schema), hint)?,
        (BodyMedia::Json, None) => RustType::Json,
        (BodyMedia::Text, _) => RustType::String,
        (BodyMedia::Binary, _) => RustType::Bytes,
    })
}

fn lower_response<'a>(
    doc: &'a OpenAPI,
    lowering: &mut SchemaLowering<'a>,
    type_name: &str,
    label: &str,
    status: ResponseStatus,
    item: &'a ReferenceOr<openapiv3::Response>,
) -> AppResult<Response> {
    let response = refs::resolve_response(doc, item)?;
    let variant = match status {
        ResponseStatus::Code(code) => naming::status_variant_name(code),
        ResponseStatus::Range(class) => format!("Status{}XX", class),
        ResponseStatus::Default => "Default".to_string(),
    };

    let body = match pick_media(&response.content) {
        Some((media, schema)) => Some(ResponseBody {
            ty: payload_type(
                lowering,
                media,
                schema,
                &format!("{}{}Body", type_name, variant),
            )?,
            media,
        }),
        None => None,
    };

    let mut headers: Vec<ResponseHeader> = Vec::new();
    for (wire_name, item) in response.headers.iter() {
        if wire_name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        let header = refs::resolve_header(doc, item)?;
        let hint = format!("{}{}{}", type_name, variant, naming::to_type_name(wire_name));
        let ty = match &header.format {
            ParameterSchemaOrContent::Schema(schema) => lowering.lower(SchemaRef::from(schema), &hint)?,
            ParameterSchemaOrContent::Content(_) => RustType::String,
        };
        let name = naming::field_name(wire_name);
        let reserved = name == "body" || (status.is_dynamic() && name == "status");
        if reserved || headers.iter().any(|h| h.name == name) {
            return Err(AppError::Contract(format!(
                "{}: response {} header `{}` clashes with another field of the response",
                label, variant, wire_name
            )));
        }
        headers.push(ResponseHeader {
            name,
            wire_name: wire_name.clone(),
            ty,
            required: header.required,
        });
    }

    Ok(Response {
        status,
        variant,
        description: Some(response.description.clone()).filter(|d| !d.trim().is_empty()),
        body,
        headers,
    })
}
