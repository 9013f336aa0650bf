#![deny(missing_docs)]

//! # OpenAPI Models
//!
//! Definition of Intermediate Representation (IR) structures for parsed OpenAPI elements.
//!
//! The lowering passes in [`crate::oas`] fill these from an `openapiv3::OpenAPI`
//! document; the emitters in [`crate::codegen`] and [`crate::strategies`] only
//! ever read the IR, never the raw document.

use std::fmt;

/// A fully lowered contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    /// `info.title`.
    pub title: String,
    /// `info.version`.
    pub version: String,
    /// Named types, sorted by Rust name.
    pub models: Vec<Model>,
    /// Operations in document order (path order, then method order).
    pub operations: Vec<Operation>,
}

/// The Rust shape a schema lowers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    /// `bool`
    Bool,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `String`
    String,
    /// Raw bytes (`Vec<u8>`).
    Bytes,
    /// `uuid::Uuid`
    Uuid,
    /// A `date-time` string, rendered per the configured date library.
    DateTime,
    /// A `date` string, rendered per the configured date library.
    Date,
    /// Free-form JSON (`serde_json::Value`).
    Json,
    /// A generated model, by Rust name.
    Named(String),
    /// `Vec<T>`
    Vec(Box<RustType>),
    /// String-keyed map (`BTreeMap<String, T>`).
    Map(Box<RustType>),
    /// `Option<T>`
    Option(Box<RustType>),
    /// `Box<T>`, placed on fields that lead back to their own model.
    Boxed(Box<RustType>),
}

impl RustType {
    /// Wraps in `Option` unless already optional.
    pub fn optional(self) -> Self {
        match self {
            RustType::Option(_) => self,
            other => RustType::Option(Box::new(other)),
        }
    }

    /// Returns the type inside an `Option`, or itself.
    pub fn without_option(&self) -> &RustType {
        match self {
            RustType::Option(inner) => inner,
            other => other,
        }
    }

    /// True for single-value types that round-trip through `FromStr`/`Display`.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            RustType::Bool
                | RustType::I32
                | RustType::I64
                | RustType::F32
                | RustType::F64
                | RustType::String
                | RustType::Uuid
                | RustType::DateTime
                | RustType::Date
        )
    }
}

/// A named type emitted into `models.rs`.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    /// An object schema.
    Struct(ModelStruct),
    /// A string enumeration.
    Enum(ModelEnum),
    /// A `oneOf`/`anyOf` composition.
    Union(ModelUnion),
    /// A named schema that is an array, primitive or free-form value.
    Alias(ModelAlias),
}

impl Model {
    /// Rust name of the model.
    pub fn name(&self) -> &str {
        match self {
            Model::Struct(m) => &m.name,
            Model::Enum(m) => &m.name,
            Model::Union(m) => &m.name,
            Model::Alias(m) => &m.name,
        }
    }
}

/// A record type.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStruct {
    /// Rust type name.
    pub name: String,
    /// Schema description.
    pub description: Option<String>,
    /// Whether the schema is marked deprecated.
    pub deprecated: bool,
    /// Properties in declaration order (allOf parts flattened in order).
    pub fields: Vec<ModelField>,
    /// Value type of `additionalProperties`, when allowed.
    pub additional: Option<RustType>,
}

/// One property of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelField {
    /// snake_case Rust name.
    pub name: String,
    /// Property name on the wire.
    pub wire_name: String,
    /// Field type, already wrapped in `Option` when absent-or-null is allowed.
    pub ty: RustType,
    /// Listed in the schema's `required`.
    pub required: bool,
    /// Property description.
    pub description: Option<String>,
    /// Whether the property is marked deprecated.
    pub deprecated: bool,
}

/// A closed set of string values.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnum {
    /// Rust type name.
    pub name: String,
    /// Schema description.
    pub description: Option<String>,
    /// Variants in declaration order.
    pub variants: Vec<EnumVariant>,
}

/// One value of a string enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    /// PascalCase Rust variant name.
    pub name: String,
    /// Value on the wire.
    pub wire_value: String,
}

/// An untagged union of alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelUnion {
    /// Rust type name.
    pub name: String,
    /// Schema description.
    pub description: Option<String>,
    /// Alternatives in declaration order.
    pub variants: Vec<UnionVariant>,
}

/// One alternative of a union.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionVariant {
    /// PascalCase Rust variant name.
    pub name: String,
    /// Payload type.
    pub ty: RustType,
}

/// `type Name = Target;`
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAlias {
    /// Rust type name.
    pub name: String,
    /// Schema description.
    pub description: Option<String>,
    /// Aliased type.
    pub target: RustType,
}

/// HTTP methods, in the order operations are read from a path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Uppercase method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One HTTP operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// `operationId`, or a name derived from method and path.
    pub operation_id: String,
    /// snake_case handler/trait method name.
    pub fn_name: String,
    /// PascalCase prefix for types owned by this operation.
    pub type_name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template as written (`/urls/{alias}`).
    pub path: String,
    /// First tag, or `default`.
    pub tag: String,
    /// `summary`
    pub summary: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// `deprecated`
    pub deprecated: bool,
    /// Path params in template order, then the rest in declaration order.
    pub params: Vec<Param>,
    /// Request body, if declared.
    pub body: Option<RequestBody>,
    /// Responses in declaration order, `default` last.
    pub responses: Vec<Response>,
}

impl Operation {
    /// Parameters found in one location.
    pub fn params_in(&self, location: ParamLocation) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(move |p| p.location == location)
    }
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// Templated path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        })
    }
}

/// A request parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// snake_case Rust name.
    pub name: String,
    /// Name on the wire.
    pub wire_name: String,
    /// Location.
    pub location: ParamLocation,
    /// Value type (never wrapped in `Option`).
    pub ty: RustType,
    /// Always true for path parameters.
    pub required: bool,
    /// Parameter description.
    pub description: Option<String>,
}

impl Param {
    /// Type handed to the trait method.
    pub fn arg_type(&self) -> RustType {
        if self.required {
            self.ty.clone()
        } else {
            self.ty.clone().optional()
        }
    }
}

/// How a body is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMedia {
    /// `application/json` and `+json` types.
    Json,
    /// `text/*`, carried as `String`.
    Text,
    /// Anything else, carried as raw bytes.
    Binary,
}

/// A request body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    /// Payload type (never wrapped in `Option`).
    pub ty: RustType,
    /// `required`
    pub required: bool,
    /// Wire representation.
    pub media: BodyMedia,
}

impl RequestBody {
    /// Type handed to the trait method.
    pub fn arg_type(&self) -> RustType {
        if self.required {
            self.ty.clone()
        } else {
            self.ty.clone().optional()
        }
    }
}

/// A response status key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// An exact code such as `201`.
    Code(u16),
    /// A class such as `2XX`, holding the leading digit.
    Range(u16),
    /// The `default` response.
    Default,
}

impl ResponseStatus {
    /// True when the concrete status is only known at runtime.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, ResponseStatus::Code(_))
    }
}

/// One declared response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status key.
    pub status: ResponseStatus,
    /// PascalCase variant name in the operation's response enum.
    pub variant: String,
    /// Response description.
    pub description: Option<String>,
    /// Body, when the response declares content.
    pub body: Option<ResponseBody>,
    /// Declared headers, `Content-Type` excluded.
    pub headers: Vec<ResponseHeader>,
}

/// A response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBody {
    /// Payload type.
    pub ty: RustType,
    /// Wire representation.
    pub media: BodyMedia,
}

/// A response header.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHeader {
    /// snake_case field name.
    pub name: String,
    /// Header name on the wire.
    pub wire_name: String,
    /// Value type (never wrapped in `Option`).
    pub ty: RustType,
    /// `required`
    pub required: bool,
}

impl ResponseHeader {
    /// Type of the variant field.
    pub fn field_type(&self) -> RustType {
        if self.required {
            self.ty.clone()
        } else {
            self.ty.clone().optional()
        }
    }
}
