#![deny(missing_docs)]

//! # Schema Resolver
//!
//! Lowers OpenAPI schemas into [`RustType`]s, collecting every named shape
//! (component schemas and hoisted inline objects, enums and unions) as a [`Model`].
//!
//! Inline shapes are named after where they appear: a property `status` of
//! `Order` becomes `OrderStatus`, an inline request body of `createOrder`
//! becomes `CreateOrderBody`.

use crate::error::{AppError, AppResult};
use crate::oas::models::{
    EnumVariant, Model, ModelAlias, ModelEnum, ModelField, ModelStruct, ModelUnion, RustType,
    UnionVariant,
};
use crate::oas::naming;
use crate::oas::refs;
use openapiv3::{
    AdditionalProperties, IntegerFormat, NumberFormat, OpenAPI, ReferenceOr, Schema, SchemaKind,
    StringFormat, Type, VariantOrUnknownOrEmpty,
};
use std::collections::{BTreeMap, BTreeSet};

/// A schema position: either a reference or an inline definition.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SchemaRef<'a> {
    /// `$ref` string.
    Ref(&'a str),
    /// Inline schema.
    Item(&'a Schema),
}

impl<'a> SchemaRef<'a> {
    fn nullable(self) -> bool {
        matches!(self, SchemaRef::Item(schema) if schema.schema_data.nullable)
    }

    fn description(self) -> Option<String> {
        match self {
            SchemaRef::Item(schema) => schema.schema_data.description.clone(),
            SchemaRef::Ref(_) => None,
        }
    }

    fn deprecated(self) -> bool {
        matches!(self, SchemaRef::Item(schema) if schema.schema_data.deprecated)
    }
}

impl<'a> From<&'a ReferenceOr<Schema>> for SchemaRef<'a> {
    fn from(value: &'a ReferenceOr<Schema>) -> Self {
        match value {
            ReferenceOr::Reference { reference } => SchemaRef::Ref(reference.as_str()),
            ReferenceOr::Item(schema) => SchemaRef::Item(schema),
        }
    }
}

impl<'a> From<&'a ReferenceOr<Box<Schema>>> for SchemaRef<'a> {
    fn from(value: &'a ReferenceOr<Box<Schema>>) -> Self {
        match value {
            ReferenceOr::Reference { reference } => SchemaRef::Ref(reference.as_str()),
            ReferenceOr::Item(schema) => SchemaRef::Item(schema.as_ref()),
        }
    }
}

/// The properties-bearing part of an object schema, typed or untyped.
struct ObjectView<'a> {
    properties: Vec<(&'a String, &'a ReferenceOr<Box<Schema>>)>,
    required: &'a [String],
    additional: Option<&'a AdditionalProperties>,
}

fn object_view(schema: &Schema) -> Option<ObjectView<'_>> {
    match &schema.schema_kind {
        SchemaKind::Type(Type::Object(object)) => Some(ObjectView {
            properties: object.properties.iter().collect(),
            required: &object.required,
            additional: object.additional_properties.as_ref(),
        }),
        SchemaKind::Any(any)
            if !any.properties.is_empty()
                || any.additional_properties.is_some()
                || any.typ.as_deref() == Some("object") =>
        {
            Some(ObjectView {
                properties: any.properties.iter().collect(),
                required: &any.required,
                additional: any.additional_properties.as_ref(),
            })
        }
        _ => None,
    }
}

/// What a schema becomes when it is given a name.
enum Shape<'a> {
    Struct,
    Enum(Vec<&'a str>),
    Union(&'a [ReferenceOr<Schema>]),
    Inline,
}

fn model_shape(schema: &Schema) -> Shape<'_> {
    match &schema.schema_kind {
        SchemaKind::Type(Type::String(string)) => {
            let values: Vec<&str> = string
                .enumeration
                .iter()
                .flatten()
                .map(String::as_str)
                .collect();
            if values.is_empty() {
                Shape::Inline
            } else {
                Shape::Enum(values)
            }
        }
        SchemaKind::Type(Type::Object(object)) if !object.properties.is_empty() => Shape::Struct,
        SchemaKind::AllOf { all_of } if !is_single_ref(all_of) => Shape::Struct,
        SchemaKind::OneOf { one_of } => Shape::Union(one_of),
        SchemaKind::AnyOf { any_of } => Shape::Union(any_of),
        SchemaKind::Any(any) => {
            if !any.properties.is_empty() || (!any.all_of.is_empty() && !is_single_ref(&any.all_of)) {
                Shape::Struct
            } else if !any.one_of.is_empty() {
                Shape::Union(&any.one_of)
            } else if !any.any_of.is_empty() {
                Shape::Union(&any.any_of)
            } else {
                let values: Vec<&str> = any.enumeration.iter().filter_map(|v| v.as_str()).collect();
                if values.is_empty() {
                    Shape::Inline
                } else {
                    Shape::Enum(values)
                }
            }
        }
        _ => Shape::Inline,
    }
}

fn is_single_ref(parts: &[ReferenceOr<Schema>]) -> bool {
    matches!(parts, [ReferenceOr::Reference { .. }])
}

fn string_type(format: &VariantOrUnknownOrEmpty<StringFormat>) -> RustType {
    match format {
        VariantOrUnknownOrEmpty::Item(StringFormat::DateTime) => RustType::DateTime,
        VariantOrUnknownOrEmpty::Item(StringFormat::Date) => RustType::Date,
        VariantOrUnknownOrEmpty::Unknown(other) => named_string_format(other),
        _ => RustType::String,
    }
}

fn named_string_format(format: &str) -> RustType {
    match format {
        "uuid" => RustType::Uuid,
        "date-time" => RustType::DateTime,
        "date" => RustType::Date,
        _ => RustType::String,
    }
}

/// Label used for a union alternative of the given type.
fn variant_label(ty: &RustType) -> String {
    match ty {
        RustType::Named(name) => name.clone(),
        RustType::Bool => "Boolean".into(),
        RustType::I32 | RustType::I64 => "Integer".into(),
        RustType::F32 | RustType::F64 => "Number".into(),
        RustType::String => "String".into(),
        RustType::Bytes => "Bytes".into(),
        RustType::Uuid => "Uuid".into(),
        RustType::DateTime => "DateTime".into(),
        RustType::Date => "Date".into(),
        RustType::Json => "Value".into(),
        RustType::Vec(_) => "List".into(),
        RustType::Map(_) => "Map".into(),
        RustType::Option(inner) | RustType::Boxed(inner) => variant_label(inner),
    }
}

/// Models a type stores inline. `Vec` and maps already live on the heap.
fn inline_names<'t>(ty: &'t RustType, out: &mut Vec<&'t str>) {
    match ty {
        RustType::Named(name) => out.push(name),
        RustType::Option(inner) | RustType::Boxed(inner) => inline_names(inner, out),
        _ => {}
    }
}

/// Types a model holds by value, one per field or variant.
fn member_types(model: &Model) -> Vec<&RustType> {
    match model {
        Model::Struct(m) => m.fields.iter().map(|f| &f.ty).collect(),
        Model::Union(m) => m.variants.iter().map(|v| &v.ty).collect(),
        Model::Alias(m) => vec![&m.target],
        Model::Enum(_) => Vec::new(),
    }
}

fn reaches(graph: &BTreeMap<&str, Vec<&str>>, from: &str, target: &str) -> bool {
    let mut stack = vec![from];
    let mut seen = BTreeSet::new();
    while let Some(next) = stack.pop() {
        if next == target {
            return true;
        }
        if seen.insert(next) {
            if let Some(edges) = graph.get(next) {
                stack.extend(edges.iter().copied());
            }
        }
    }
    false
}

fn boxed(ty: RustType) -> RustType {
    match ty {
        RustType::Named(_) => RustType::Boxed(Box::new(ty)),
        RustType::Option(inner) => RustType::Option(Box::new(boxed(*inner))),
        other => other,
    }
}

/// Boxes every struct field and union payload that reaches its own model
/// without passing through a `Vec` or map.
fn break_cycles(models: &mut BTreeMap<String, Model>) {
    let recursive: Vec<(String, usize)> = {
        let edges_of: BTreeMap<&str, Vec<&str>> = models
            .iter()
            .map(|(name, model)| {
                let mut edges = Vec::new();
                for ty in member_types(model) {
                    inline_names(ty, &mut edges);
                }
                (name.as_str(), edges)
            })
            .collect();
        let graph = &edges_of;
        models
            .iter()
            .filter(|(_, model)| !matches!(model, Model::Alias(_)))
            .flat_map(move |(name, model)| {
                member_types(model)
                    .into_iter()
                    .enumerate()
                    .filter(move |(_, ty)| {
                        let mut names = Vec::new();
                        inline_names(ty, &mut names);
                        names.iter().any(|n| reaches(graph, n, name))
                    })
                    .map(move |(index, _)| (name.clone(), index))
            })
            .collect()
    };

    for (name, index) in recursive {
        let slot = match models.get_mut(&name) {
            Some(Model::Struct(m)) => &mut m.fields[index].ty,
            Some(Model::Union(m)) => &mut m.variants[index].ty,
            _ => continue,
        };
        *slot = boxed(std::mem::replace(slot, RustType::Json));
    }
}

/// Lowering state shared by the model and operation passes.
pub(crate) struct SchemaLowering<'a> {
    doc: &'a OpenAPI,
    /// Component schema key -> Rust type name.
    component_names: BTreeMap<String, String>,
    /// Every Rust type name handed out so far.
    taken: BTreeSet<String>,
    models: BTreeMap<String, Model>,
}

impl<'a> SchemaLowering<'a> {
    /// Reserves a Rust name for every component schema.
    pub(crate) fn new(doc: &'a OpenAPI) -> AppResult<Self> {
        let mut component_names = BTreeMap::new();
        let mut owners: BTreeMap<String, String> = BTreeMap::new();
        if let Some(components) = &doc.components {
            for key in components.schemas.keys() {
                let name = naming::to_type_name(key);
                if let Some(previous) = owners.insert(name.clone(), key.clone()) {
                    return Err(AppError::Contract(format!(
                        "schemas `{}` and `{}` both map to the Rust type `{}`",
                        previous, key, name
                    )));
                }
                component_names.insert(key.clone(), name);
            }
        }
        Ok(Self {
            doc,
            component_names,
            taken: owners.into_keys().collect(),
            models: BTreeMap::new(),
        })
    }

    /// Lowers every `components/schemas` entry into a model.
    pub(crate) fn lower_components(&mut self) -> AppResult<()> {
        let doc = self.doc;
        let Some(components) = &doc.components else {
            return Ok(());
        };
        for (key, item) in &components.schemas {
            let name = self
                .component_names
                .get(key)
                .cloned()
                .ok_or_else(|| AppError::UnresolvedRef(format!("#/components/schemas/{}", key)))?;
            let model = match item {
                ReferenceOr::Reference { reference } => {
                    let target = self.named(reference)?;
                    Model::Alias(ModelAlias {
                        name,
                        description: None,
                        target,
                    })
                }
                ReferenceOr::Item(schema) => {
                    let shape = model_shape(schema);
                    self.build(name, schema, shape)?
                }
            };
            self.models.insert(model.name().to_string(), model);
        }
        Ok(())
    }

    /// Consumes the lowering, returning models sorted by Rust name.
    pub(crate) fn into_models(mut self) -> Vec<Model> {
        break_cycles(&mut self.models);
        self.models.into_values().collect()
    }

    /// Lowers a schema position. Inline objects, enums and unions are hoisted
    /// into models named from `hint`.
    pub(crate) fn lower(&mut self, schema: SchemaRef<'a>, hint: &str) -> AppResult<RustType> {
        match schema {
            SchemaRef::Ref(reference) => self.named(reference),
            SchemaRef::Item(schema) => match model_shape(schema) {
                Shape::Inline => self.lower_inline(schema, hint),
                shape => {
                    let name = self.claim(hint);
                    let model = self.build(name.clone(), schema, shape)?;
                    self.models.insert(name.clone(), model);
                    Ok(RustType::Named(name))
                }
            },
        }
    }

    fn named(&self, reference: &str) -> AppResult<RustType> {
        let key = refs::component_name(reference, "schemas")?;
        self.component_names
            .get(&key)
            .map(|name| RustType::Named(name.clone()))
            .ok_or_else(|| AppError::UnresolvedRef(reference.to_string()))
    }

    fn claim(&mut self, hint: &str) -> String {
        let base = naming::to_type_name(hint);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{}{}", base, suffix);
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    fn lower_inline(&mut self, schema: &'a Schema, hint: &str) -> AppResult<RustType> {
        match &schema.schema_kind {
            SchemaKind::Type(Type::String(string)) => Ok(string_type(&string.format)),
            SchemaKind::Type(Type::Integer(integer)) => Ok(match &integer.format {
                VariantOrUnknownOrEmpty::Item(IntegerFormat::Int64) => RustType::I64,
                _ => RustType::I32,
            }),
            SchemaKind::Type(Type::Number(number)) => Ok(match &number.format {
                VariantOrUnknownOrEmpty::Item(NumberFormat::Float) => RustType::F32,
                _ => RustType::F64,
            }),
            SchemaKind::Type(Type::Boolean { .. }) => Ok(RustType::Bool),
            SchemaKind::Type(Type::Array(array)) => self.array_type(array.items.as_ref(), hint),
            SchemaKind::Type(Type::Object(object)) => {
                Ok(match self.additional_type(object.additional_properties.as_ref(), hint)? {
                    Some(value) => RustType::Map(Box::new(value)),
                    None => RustType::Json,
                })
            }
            SchemaKind::AllOf { all_of } if all_of.len() == 1 => {
                self.lower(SchemaRef::from(&all_of[0]), hint)
            }
            SchemaKind::Any(any) => {
                if let Some(items) = &any.items {
                    return self.array_type(Some(items), hint);
                }
                if let Some(value) = self.additional_type(any.additional_properties.as_ref(), hint)? {
                    return Ok(RustType::Map(Box::new(value)));
                }
                if let [single] = any.all_of.as_slice() {
                    return self.lower(SchemaRef::from(single), hint);
                }
                Ok(match any.typ.as_deref() {
                    Some("string") => any
                        .format
                        .as_deref()
                        .map(named_string_format)
                        .unwrap_or(RustType::String),
                    Some("integer") if any.format.as_deref() == Some("int64") => RustType::I64,
                    Some("integer") => RustType::I32,
                    Some("number") if any.format.as_deref() == Some("float") => RustType::F32,
                    Some("number") => RustType::F64,
                    Some("boolean") => RustType::Bool,
                    _ => RustType::Json,
                })
            }
            _ => Ok(RustType::Json),
        }
    }

    fn array_type(
        &mut self,
        items: Option<&'a ReferenceOr<Box<Schema>>>,
        hint: &str,
    ) -> AppResult<RustType> {
        let item = match items {
            Some(items) => self.lower(SchemaRef::from(items), &format!("{}Item", hint))?,
            None => RustType::Json,
        };
        Ok(RustType::Vec(Box::new(item)))
    }

    fn additional_type(
        &mut self,
        additional: Option<&'a AdditionalProperties>,
        hint: &str,
    ) -> AppResult<Option<RustType>> {
        match additional {
            Some(AdditionalProperties::Schema(schema)) => {
                let value = self.lower(SchemaRef::from(&**schema), &format!("{}Value", hint))?;
                Ok(Some(value))
            }
            Some(AdditionalProperties::Any(true)) => Ok(Some(RustType::Json)),
            _ => Ok(None),
        }
    }

    fn build(&mut self, name: String, schema: &'a Schema, shape: Shape<'a>) -> AppResult<Model> {
        let description = schema.schema_data.description.clone();
        match shape {
            Shape::Struct => self.build_struct(name, schema),
            Shape::Enum(values) => Ok(Model::Enum(build_enum(name, description, &values))),
            Shape::Union(members) => self.build_union(name, description, members),
            Shape::Inline => {
                let target = self.lower_inline(schema, &name)?;
                Ok(Model::Alias(ModelAlias {
                    name,
                    description,
                    target,
                }))
            }
        }
    }

    fn build_struct(&mut self, name: String, schema: &'a Schema) -> AppResult<Model> {
        let mut fields = Vec::new();
        let mut additional = None;
        let mut visited = BTreeSet::new();
        self.collect_fields(schema, &name, &mut fields, &mut additional, &mut visited)?;

        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for field in &fields {
            if let Some(previous) = seen.insert(&field.name, &field.wire_name) {
                return Err(AppError::Contract(format!(
                    "{}: properties `{}` and `{}` both map to the field `{}`",
                    name, previous, field.wire_name, field.name
                )));
            }
        }
        if additional.is_some() && seen.contains_key("additional_properties") {
            return Err(AppError::Contract(format!(
                "{}: a property named `additional_properties` clashes with additionalProperties",
                name
            )));
        }

        Ok(Model::Struct(ModelStruct {
            description: schema.schema_data.description.clone(),
            deprecated: schema.schema_data.deprecated,
            name,
            fields,
            additional,
        }))
    }

    /// Gathers properties from an object schema, flattening `allOf` parts in
    /// order. A later part redefining a property replaces the earlier one.
    fn collect_fields(
        &mut self,
        schema: &'a Schema,
        owner: &str,
        fields: &mut Vec<ModelField>,
        additional: &mut Option<RustType>,
        visited: &mut BTreeSet<String>,
    ) -> AppResult<()> {
        if let Some(view) = object_view(schema) {
            for (property, property_schema) in view.properties {
                let property_ref = SchemaRef::from(property_schema);
                let required = view.required.iter().any(|r| r == property);
                let hint = format!("{}{}", owner, naming::to_type_name(property));
                let base = self.lower(property_ref, &hint)?;
                let ty = if required && !property_ref.nullable() {
                    base
                } else {
                    base.optional()
                };
                let field = ModelField {
                    name: naming::field_name(property),
                    wire_name: property.clone(),
                    ty,
                    required,
                    description: property_ref.description(),
                    deprecated: property_ref.deprecated(),
                };
                match fields.iter_mut().find(|f| f.wire_name == field.wire_name) {
                    Some(existing) => *existing = field,
                    None => fields.push(field),
                }
            }
            if let Some(value) = self.additional_type(view.additional, owner)? {
                *additional = Some(value);
            }
            return Ok(());
        }

        let parts = match &schema.schema_kind {
            SchemaKind::AllOf { all_of } => all_of,
            SchemaKind::Any(any) if !any.all_of.is_empty() => &any.all_of,
            _ => {
                return Err(AppError::Contract(format!(
                    "{}: allOf members must be object schemas",
                    owner
                )))
            }
        };
        for part in parts {
            match part {
                ReferenceOr::Item(part) => {
                    self.collect_fields(part, owner, fields, additional, visited)?
                }
                ReferenceOr::Reference { reference } => {
                    if !visited.insert(reference.clone()) {
                        return Err(AppError::Contract(format!(
                            "{}: allOf includes {} more than once",
                            owner, reference
                        )));
                    }
                    let target = refs::resolve_schema(self.doc, reference)?;
                    self.collect_fields(target, owner, fields, additional, visited)?;
                }
            }
        }
        Ok(())
    }

    fn build_union(
        &mut self,
        name: String,
        description: Option<String>,
        members: &'a [ReferenceOr<Schema>],
    ) -> AppResult<Model> {
        let mut variants: Vec<UnionVariant> = Vec::new();
        for (index, member) in members.iter().enumerate() {
            let hint = format!("{}Variant{}", name, index + 1);
            let ty = self.lower(SchemaRef::from(member), &hint)?;
            let mut label = variant_label(&ty);
            if variants.iter().any(|v| v.name == label) {
                label = format!("{}{}", label, index + 1);
            }
            variants.push(UnionVariant { name: label, ty });
        }
        Ok(Model::Union(ModelUnion {
            name,
            description,
            variants,
        }))
    }
}

fn build_enum(name: String, description: Option<String>, values: &[&str]) -> ModelEnum {
    let mut variants: Vec<EnumVariant> = Vec::new();
    for (index, value) in values.iter().enumerate() {
        if variants.iter().any(|v| v.wire_value == *value) {
            continue;
        }
        let mut variant = naming::to_variant_name(value);
        if variant.is_empty() || variants.iter().any(|v| v.name == variant) {
            variant = format!("Value{}", index + 1);
        }
        variants.push(EnumVariant {
            name: variant,
            wire_value: value.to_string(),
        });
    }
    ModelEnum {
        name,
        description,
        variants,
    }
}
