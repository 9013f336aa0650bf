#![deny(missing_docs)]

//! # Contract Validation
//!
//! Checks a document before any code is generated. All problems are collected
//! and reported together rather than stopping at the first one.

use crate::error::{AppError, AppResult};
use crate::oas::models::HttpMethod;
use crate::oas::naming::path_variables;
use crate::oas::refs;
use crate::oas::routes::path_operations;
use openapiv3::{OpenAPI, Parameter, ReferenceOr};
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Validates a contract held in memory.
pub fn validate_contract(text: &str) -> AppResult<()> {
    let (raw, doc) = super::load_document(text)?;
    validate_document(&raw, &doc)
}

/// Validates an already-parsed document against its raw YAML tree.
///
/// The raw tree is used for reference checking so that references anywhere in
/// the document are seen, including inside schema fragments `openapiv3` keeps opaque.
pub fn validate_document(raw: &Value, doc: &OpenAPI) -> AppResult<()> {
    let mut unresolved = Vec::new();
    let mut found = Vec::new();
    collect_refs(raw, String::from("#"), &mut found);
    for (location, reference) in found {
        if let Err(problem) = check_ref(raw, &reference) {
            unresolved.push(format!("{}: {}", location, problem));
        }
    }

    let mut problems = Vec::new();
    if !doc.openapi.starts_with("3.") {
        problems.push(format!(
            "unsupported OpenAPI version `{}` (expected 3.x)",
            doc.openapi
        ));
    }
    check_operations(doc, &mut problems);

    if !unresolved.is_empty() {
        unresolved.extend(problems);
        return Err(AppError::UnresolvedRef(unresolved.join("; ")));
    }
    if !problems.is_empty() {
        return Err(AppError::Contract(problems.join("; ")));
    }
    Ok(())
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::from("?"),
    }
}

fn collect_refs(value: &Value, pointer: String, out: &mut Vec<(String, String)>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let key = key_text(key);
                if key == "$ref" {
                    if let Value::String(target) = child {
                        out.push((pointer.clone(), target.clone()));
                    }
                } else {
                    let escaped = key.replace('~', "~0").replace('/', "~1");
                    collect_refs(child, format!("{}/{}", pointer, escaped), out);
                }
            }
        }
        Value::Sequence(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_refs(child, format!("{}/{}", pointer, index), out);
            }
        }
        Value::Tagged(tagged) => collect_refs(&tagged.value, pointer, out),
        _ => {}
    }
}

fn check_ref(raw: &Value, reference: &str) -> Result<(), String> {
    let fragment = reference
        .strip_prefix('#')
        .ok_or_else(|| format!("external reference `{}` is not supported", reference))?;
    let mut current = raw;
    for token in fragment.split('/').skip(1) {
        let token = token.replace("~1", "/").replace("~0", "~");
        let next = match current {
            Value::Sequence(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            other => other.get(token.as_str()),
        };
        current = next.ok_or_else(|| format!("`{}` does not resolve", reference))?;
    }
    Ok(())
}

fn check_operations(doc: &OpenAPI, problems: &mut Vec<String>) {
    let mut operation_ids: BTreeMap<&str, (HttpMethod, &str)> = BTreeMap::new();

    for (path, item) in doc.paths.paths.iter() {
        if !path.starts_with('/') {
            problems.push(format!("path `{}` must start with `/`", path));
        }
        let item = match item {
            ReferenceOr::Item(item) => item,
            ReferenceOr::Reference { reference } => {
                problems.push(format!(
                    "path `{}` is a reference ({}); path item references are not supported",
                    path, reference
                ));
                continue;
            }
        };
        let template: BTreeSet<String> = path_variables(path).into_iter().collect();

        for (method, operation) in path_operations(item) {
            let label = format!("{} {}", method, path);

            if let Some(id) = operation.operation_id.as_deref() {
                if let Some((other_method, other_path)) = operation_ids.insert(id, (method, path.as_str())) {
                    problems.push(format!(
                        "operationId `{}` is used by both {} {} and {}",
                        id, other_method, other_path, label
                    ));
                }
            }

            if operation.responses.responses.is_empty() && operation.responses.default.is_none() {
                problems.push(format!("{} declares no responses", label));
            }

            let mut declared = BTreeSet::new();
            for param in item.parameters.iter().chain(operation.parameters.iter()) {
                // Unresolvable references are reported by the reference check.
                if let Ok(Parameter::Path { parameter_data, .. }) =
                    refs::resolve_parameter(doc, param)
                {
                    declared.insert(parameter_data.name.clone());
                }
            }
            for missing in template.difference(&declared) {
                problems.push(format!(
                    "{}: path variable `{}` has no path parameter",
                    label, missing
                ));
            }
            for extra in declared.difference(&template) {
                problems.push(format!(
                    "{}: path parameter `{}` does not appear in the template",
                    label, extra
                ));
            }
        }
    }
}
