#![deny(missing_docs)]

//! # API Document Model
//!
//! Definition of the Intermediate Representation (IR) structures describing a
//! remote API prior to target-language mapping.
//!
//! These structs are the generator's only input besides [`crate::settings::ClientSettings`]:
//! callers build an [`ApiDocument`] (typically from an OpenAPI description,
//! which is outside this crate's scope) and hand it to [`crate::generate`].
//! The document is read-only for the duration of a run.

use serde::{Deserialize, Serialize};

/// An ordered collection of API operations.
///
/// Operation order is significant: generated declarations follow document
/// order so that regenerated output diffs stay stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    /// All operations of the API, in declaration order.
    pub operations: Vec<Operation>,
}

/// One callable API endpoint with parameters and possible responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Logical client group this operation belongs to (e.g. `"Person"`).
    pub tag: String,
    /// Raw operation name (e.g. `"GetPerson"`); sanitized during compilation.
    pub name: String,
    /// HTTP method: "GET", "POST", etc. Request-construction metadata only.
    pub method: String,
    /// URL path template (e.g. `"/persons/{id}"`).
    pub path: String,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Possible responses keyed by status category.
    pub responses: Vec<ResponseDef>,
    /// Human-readable description, rendered as a `<summary>` doc comment.
    pub description: Option<String>,
    /// Whether the operation is deprecated (`[System.Obsolete]` on output).
    pub deprecated: bool,
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterPosition {
    /// Substituted into the URL path template.
    Path,
    /// Appended to the query string.
    Query,
    /// Sent as an HTTP header.
    Header,
    /// Serialized as the request body.
    Body,
}

/// A single operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Raw parameter name as it appears in the API description.
    pub name: String,
    /// Where the parameter is carried.
    pub position: ParameterPosition,
    /// Abstract type of the parameter.
    #[serde(rename = "type")]
    pub type_ref: TypeReference,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Optional C# default literal (e.g. `"false"`, `"null"`).
    pub default: Option<String>,
}

/// Status classification of a response definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    /// 2xx responses; supplies the method return type.
    Success,
    /// 4xx/5xx responses; surfaced as thrown exceptions in generated code.
    Error,
    /// Fallback response for undeclared status codes.
    Default,
}

/// One declared response of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDef {
    /// Status classification.
    pub category: StatusCategory,
    /// Body type, if the response carries one.
    #[serde(rename = "type")]
    pub type_ref: Option<TypeReference>,
    /// Whether an absent body is legal for this response.
    pub nullable: bool,
}

/// Abstract schema-level type description prior to C# mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeReference {
    /// The structural kind of the type.
    pub kind: TypeKind,
    /// Whether the occurrence admits `null`; kept separate from the kind so
    /// the emitter can render C# `?` syntax explicitly.
    #[serde(default)]
    pub nullable: bool,
    /// Whether the type is eligible for the streaming-element form when the
    /// enclosing operation opts into large-array streaming.
    #[serde(default)]
    pub streamable: bool,
}

impl TypeReference {
    /// Convenience constructor for a non-nullable, non-streamable reference.
    pub fn new(kind: TypeKind) -> Self {
        TypeReference {
            kind,
            nullable: false,
            streamable: false,
        }
    }

    /// Returns a copy with the nullable flag set.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns a copy with the streamable flag set.
    pub fn streamable(mut self) -> Self {
        self.streamable = true;
        self
    }
}

/// Tagged variant over the supported schema shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A scalar type.
    Primitive(PrimitiveKind),
    /// An ordered collection of a single element type.
    Array(Box<TypeReference>),
    /// A named object (DTO) type.
    Object(String),
    /// A named enumeration with its member names.
    Enum {
        /// Enum type name.
        name: String,
        /// Member names, in declaration order.
        members: Vec<String>,
    },
    /// A generic container such as `Page<T>`.
    Generic {
        /// Container type name.
        name: String,
        /// The single type argument.
        arg: Box<TypeReference>,
    },
}

/// The scalar kinds recognized by the type mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// UTF-8 text.
    String,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// True/false.
    Boolean,
    /// Point in time with offset.
    DateTime,
    /// RFC 4122 identifier.
    Uuid,
    /// Raw bytes.
    Binary,
    /// An unrecognized schema kind; the raw kind string is kept for
    /// diagnostics and the mapper degrades it to an opaque value type.
    Unknown(String),
}
