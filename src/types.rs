#![deny(missing_docs)]

//! # Type Mapping
//!
//! Converts abstract [`TypeReference`] values into concrete C# type
//! expressions. Handles primitives, collections, enums, generic containers,
//! and nullability, plus the two streaming forms: the streaming-element
//! producer used for large array responses and the asynchronous producer used
//! for large array request bodies (both `IAsyncEnumerable<T>` in C#).
//!
//! Mapping is total: an unrecognized schema kind degrades to the opaque
//! `object` type with a warning instead of failing the run.

use crate::document::{PrimitiveKind, TypeKind, TypeReference};
use crate::sanitize::{sanitize, IdentifierRole};

/// Fully qualified name of the ordered-collection type.
pub const COLLECTION_TYPE: &str = "System.Collections.Generic.ICollection";

/// Fully qualified name of the streaming-element-producer /
/// asynchronous-producer type.
pub const ASYNC_ENUMERABLE_TYPE: &str = "System.Collections.Generic.IAsyncEnumerable";

/// Whether the mapped occurrence is a response body or a request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// The type appears as a response body.
    Response,
    /// The type appears as a request parameter (including the body).
    RequestParameter,
}

/// Per-occurrence mapping context, set by the operation compiler.
///
/// `streamed` is decided per operation (from the large-array method sets),
/// never globally.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext {
    /// Where the type occurs.
    pub occurrence: Occurrence,
    /// Whether large-array streaming is active for this occurrence.
    pub streamed: bool,
}

impl TypeContext {
    /// A buffered (non-streamed) context for the given occurrence.
    pub fn buffered(occurrence: Occurrence) -> Self {
        TypeContext {
            occurrence,
            streamed: false,
        }
    }

    /// A streamed context for the given occurrence.
    pub fn streamed(occurrence: Occurrence) -> Self {
        TypeContext {
            occurrence,
            streamed: true,
        }
    }
}

/// A resolved C# type expression.
///
/// Nullability is kept separate from the base name so the emitter can render
/// C# `?` syntax explicitly rather than baking it into the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpression {
    /// The base C# type name (e.g. `int`, `Person`, `ICollection<Person>`).
    pub name: String,
    /// Whether the occurrence admits `null`.
    pub nullable: bool,
}

impl TypeExpression {
    /// Builds a non-nullable expression.
    pub fn new(name: impl Into<String>) -> Self {
        TypeExpression {
            name: name.into(),
            nullable: false,
        }
    }

    /// Renders the expression as C# source, appending `?` when nullable.
    pub fn render(&self) -> String {
        if self.nullable {
            format!("{}?", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl std::fmt::Display for TypeExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Maps an abstract type reference to a C# type expression.
pub fn map_type(reference: &TypeReference, context: &TypeContext) -> TypeExpression {
    let name = match &reference.kind {
        TypeKind::Array(element) => map_array(element, context),
        other => {
            let base = map_non_array(other, context);
            if context.streamed {
                // A stream-eligible non-array body streams its mapped type
                // as the element.
                format!("{}<{}>", ASYNC_ENUMERABLE_TYPE, base)
            } else {
                base
            }
        }
    };

    TypeExpression {
        name,
        nullable: reference.nullable,
    }
}

fn map_non_array(kind: &TypeKind, context: &TypeContext) -> String {
    match kind {
        TypeKind::Primitive(kind) => map_primitive(kind).to_string(),
        TypeKind::Object(name) => sanitize(name, IdentifierRole::Type),
        TypeKind::Enum { name, .. } => sanitize(name, IdentifierRole::Type),
        TypeKind::Generic { name, arg } => {
            // The argument is mapped in a buffered context: streaming only
            // applies to the outermost type of the occurrence.
            let inner = map_type(arg, &TypeContext::buffered(context.occurrence));
            format!("{}<{}>", sanitize(name, IdentifierRole::Type), inner.render())
        }
        // Arrays are handled by the caller.
        TypeKind::Array(element) => map_array(element, context),
    }
}

/// Whether the reference is eligible for the streaming-element form.
///
/// Arrays are always eligible; other kinds only when explicitly flagged.
pub fn is_stream_eligible(reference: &TypeReference) -> bool {
    reference.streamable || matches!(reference.kind, TypeKind::Array(_))
}

fn map_array(element: &TypeReference, context: &TypeContext) -> String {
    let inner = map_type(element, &TypeContext::buffered(context.occurrence));
    let container = if context.streamed {
        ASYNC_ENUMERABLE_TYPE
    } else {
        COLLECTION_TYPE
    };
    format!("{}<{}>", container, inner.render())
}

fn map_primitive(kind: &PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "string",
        PrimitiveKind::Integer => "int",
        PrimitiveKind::Long => "long",
        PrimitiveKind::Float => "float",
        PrimitiveKind::Double => "double",
        PrimitiveKind::Boolean => "bool",
        PrimitiveKind::DateTime => "System.DateTimeOffset",
        PrimitiveKind::Uuid => "System.Guid",
        PrimitiveKind::Binary => "byte[]",
        PrimitiveKind::Unknown(raw) => {
            log::warn!("Unknown schema kind '{}', falling back to object", raw);
            "object"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TypeReference;

    fn prim(kind: PrimitiveKind) -> TypeReference {
        TypeReference::new(TypeKind::Primitive(kind))
    }

    #[test]
    fn test_primitive_mapping() {
        let cases = vec![
            (PrimitiveKind::String, "string"),
            (PrimitiveKind::Integer, "int"),
            (PrimitiveKind::Boolean, "bool"),
            (PrimitiveKind::Uuid, "System.Guid"),
            (PrimitiveKind::Binary, "byte[]"),
        ];

        let ctx = TypeContext::buffered(Occurrence::RequestParameter);
        for (kind, expected) in cases {
            assert_eq!(map_type(&prim(kind), &ctx).name, expected);
        }
    }

    #[test]
    fn test_unknown_kind_falls_back_to_object() {
        let ctx = TypeContext::buffered(Occurrence::Response);
        let t = map_type(&prim(PrimitiveKind::Unknown("blob".into())), &ctx);
        assert_eq!(t.name, "object");
    }

    #[test]
    fn test_nullable_renders_question_mark() {
        let ctx = TypeContext::buffered(Occurrence::Response);
        let t = map_type(&prim(PrimitiveKind::Integer).nullable(), &ctx);
        assert_eq!(t.render(), "int?");
    }

    #[test]
    fn test_buffered_array_maps_to_collection() {
        let array = TypeReference::new(TypeKind::Array(Box::new(TypeReference::new(
            TypeKind::Object("Person".into()),
        ))));
        let ctx = TypeContext::buffered(Occurrence::Response);
        assert_eq!(
            map_type(&array, &ctx).name,
            "System.Collections.Generic.ICollection<Person>"
        );
    }

    #[test]
    fn test_streamed_response_array_maps_to_async_enumerable() {
        let array = TypeReference::new(TypeKind::Array(Box::new(TypeReference::new(
            TypeKind::Object("Person".into()),
        ))));
        let ctx = TypeContext::streamed(Occurrence::Response);
        assert_eq!(
            map_type(&array, &ctx).name,
            "System.Collections.Generic.IAsyncEnumerable<Person>"
        );
    }

    #[test]
    fn test_streamed_request_array_maps_to_async_enumerable() {
        let array = TypeReference::new(TypeKind::Array(Box::new(TypeReference::new(
            TypeKind::Primitive(PrimitiveKind::String),
        ))));
        let ctx = TypeContext::streamed(Occurrence::RequestParameter);
        assert_eq!(
            map_type(&array, &ctx).name,
            "System.Collections.Generic.IAsyncEnumerable<string>"
        );
    }

    #[test]
    fn test_nested_array_streams_outermost_only() {
        let inner = TypeReference::new(TypeKind::Array(Box::new(prim(PrimitiveKind::Integer))));
        let outer = TypeReference::new(TypeKind::Array(Box::new(inner)));
        let ctx = TypeContext::streamed(Occurrence::Response);
        assert_eq!(
            map_type(&outer, &ctx).name,
            "System.Collections.Generic.IAsyncEnumerable<System.Collections.Generic.ICollection<int>>"
        );
    }

    #[test]
    fn test_streamed_non_array_wraps_mapped_type_as_element() {
        let feed = TypeReference::new(TypeKind::Object("Feed".into())).streamable();
        let ctx = TypeContext::streamed(Occurrence::Response);
        assert_eq!(
            map_type(&feed, &ctx).name,
            "System.Collections.Generic.IAsyncEnumerable<Feed>"
        );

        let text = prim(PrimitiveKind::String);
        let ctx = TypeContext::streamed(Occurrence::RequestParameter);
        assert_eq!(
            map_type(&text, &ctx).name,
            "System.Collections.Generic.IAsyncEnumerable<string>"
        );
    }

    #[test]
    fn test_generic_container() {
        let t = TypeReference::new(TypeKind::Generic {
            name: "Page".into(),
            arg: Box::new(TypeReference::new(TypeKind::Object("Person".into()))),
        });
        let ctx = TypeContext::buffered(Occurrence::Response);
        assert_eq!(map_type(&t, &ctx).name, "Page<Person>");
    }

    #[test]
    fn test_reserved_type_name_escaped() {
        let t = TypeReference::new(TypeKind::Object("event".into()));
        let ctx = TypeContext::buffered(Occurrence::Response);
        assert_eq!(map_type(&t, &ctx).name, "event_");
    }

    #[test]
    fn test_stream_eligibility() {
        let array = TypeReference::new(TypeKind::Array(Box::new(prim(PrimitiveKind::Integer))));
        assert!(is_stream_eligible(&array));
        assert!(!is_stream_eligible(&prim(PrimitiveKind::Integer)));
        assert!(is_stream_eligible(&prim(PrimitiveKind::Integer).streamable()));
    }
}
