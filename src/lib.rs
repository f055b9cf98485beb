#![deny(missing_docs)]

//! # csclientgen
//!
//! Schema-driven C# client generator: turns a normalized API description
//! ([`ApiDocument`]) plus a [`ClientSettings`] configuration into the source
//! text of a typed C# client library.
//!
//! The crate performs no I/O. Building the document model (e.g. from an
//! OpenAPI description), executing HTTP traffic, and writing files are the
//! caller's concern; the pipeline here is a pure, deterministic
//! transformation: `text = emit(assemble(document, settings))`.

/// Shared error types.
pub mod error;

/// Input API document model (IR).
pub mod document;

/// Generation settings.
pub mod settings;

/// Identifier sanitization.
pub mod sanitize;

/// Abstract-to-C# type mapping.
pub mod types;

/// Operation-to-method compilation.
pub mod compiler;

/// Client surface assembly (tag grouping, constructors, gating).
pub mod assembler;

/// Final source-text rendering.
pub mod emitter;

pub use assembler::{assemble, ClassDescriptor, ConstructorShape};
pub use compiler::{
    compile, AuxiliaryType, MethodDescriptor, ParameterDescriptor, RequestStep, ResponseStrategy,
};
pub use document::{
    ApiDocument, Operation, Parameter, ParameterPosition, PrimitiveKind, ResponseDef,
    StatusCategory, TypeKind, TypeReference,
};
pub use emitter::emit;
pub use error::{GenResult, GeneratorError};
pub use sanitize::{sanitize, IdentifierRole};
pub use settings::{ClientSettings, MethodKey};
pub use types::{map_type, Occurrence, TypeContext, TypeExpression};

/// Runs the whole pipeline: compiles, assembles, and emits the client text.
///
/// Fails on name collisions that survive sanitization (no partial output is
/// produced); unknown schema kinds degrade to `object` and never abort.
pub fn generate(document: &ApiDocument, settings: &ClientSettings) -> GenResult<String> {
    let descriptors = assemble(document, settings)?;
    Ok(emit(&descriptors, settings))
}
