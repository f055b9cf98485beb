#![deny(missing_docs)]

//! # Operation Compiler
//!
//! Converts one [`Operation`] plus the active [`ClientSettings`] into a
//! [`MethodDescriptor`]: the fully resolved method signature, response
//! strategy, and request-construction steps for one generated client method.
//!
//! Compilation is total over the document — an operation is never skipped,
//! and unmappable schema types degrade to `object` in the type mapper — but
//! it is fatal on name collisions that survive sanitization, so an ambiguous
//! client is never emitted silently.

use crate::document::{
    Operation, Parameter, ParameterPosition, StatusCategory, TypeKind, TypeReference,
};
use crate::error::{GenResult, GeneratorError};
use crate::sanitize::{sanitize, IdentifierRole};
use crate::settings::ClientSettings;
use crate::types::{is_stream_eligible, map_type, Occurrence, TypeContext, TypeExpression};
use std::collections::{BTreeSet, HashSet};

/// C# name of the generated response-wrapper type.
pub const RESPONSE_WRAPPER_NAME: &str = "ApiResponse";

/// C# name of the generated disposable response-wrapper type.
pub const DISPOSABLE_WRAPPER_NAME: &str = "DisposableApiResponse";

/// C# name of the generated exception type.
pub const EXCEPTION_NAME: &str = "ApiException";

/// C# name of the streaming transport-content adapter.
pub const STREAMED_CONTENT_NAME: &str = "AsyncEnumerableContent";

/// How a generated method hands the response back to the caller.
///
/// Selected once per operation from the (large-array-response, wrap-responses)
/// decision table and carried on the descriptor; the emitter never
/// re-evaluates settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStrategy {
    /// Return the mapped response type directly.
    Plain,
    /// Return a status/header-carrying wrapper around the mapped value.
    Wrapped,
    /// Return the streaming-element-producer type directly.
    Streamed,
    /// Return a disposable wrapper whose payload is the streaming producer.
    /// The wrapper exposes asynchronous disposal because disposing the
    /// producer may require releasing an open transport stream.
    StreamedWrapped,
}

/// Auxiliary support types a method may require.
///
/// Variant order is emission order; the assembler unions these per run and
/// the emitter renders each exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuxiliaryType {
    /// `ApiException`, thrown on error statuses and unexpected empty bodies.
    Exception,
    /// `ApiResponse` / `ApiResponse<TResult>`.
    ResponseWrapper,
    /// `DisposableApiResponse<TResult>` implementing `IAsyncDisposable`.
    DisposableResponseWrapper,
    /// `AsyncEnumerableContent<T>`, the incremental request-body adapter.
    StreamedContentAdapter,
}

/// One compiled method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Name as it appears in the API description (used on the wire).
    pub raw_name: String,
    /// Sanitized C# identifier.
    pub name: String,
    /// Where the parameter is carried.
    pub position: ParameterPosition,
    /// Resolved C# type.
    pub type_expr: TypeExpression,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Optional C# default literal.
    pub default: Option<String>,
}

/// One request-construction step baked into the generated method body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestStep {
    /// Substitute a path parameter into the URL template.
    PathParameter {
        /// Placeholder name in the path template.
        raw: String,
        /// C# variable holding the value.
        var: String,
    },
    /// Append a query-string pair; optional parameters are skipped when null.
    QueryParameter {
        /// Wire name of the pair.
        raw: String,
        /// C# variable holding the value.
        var: String,
        /// Whether the pair is always appended.
        required: bool,
    },
    /// Add a request header.
    HeaderParameter {
        /// Wire name of the header.
        raw: String,
        /// C# variable holding the value.
        var: String,
    },
    /// Serialize the named parameter as a complete in-memory JSON body.
    BufferedBody {
        /// C# variable holding the body value.
        var: String,
    },
    /// Stream the named parameter through the incremental content adapter,
    /// never buffering the whole collection.
    StreamedBody {
        /// C# variable holding the producer.
        var: String,
        /// Element type of the streamed collection.
        element_type: String,
    },
}

/// The compiled form of one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    /// Raw operation name, kept for method-key matching and diagnostics.
    pub operation_name: String,
    /// Final C# method name (sanitized, `Async`-suffixed).
    pub name: String,
    /// HTTP method of the underlying request.
    pub http_method: String,
    /// URL path template of the underlying request.
    pub path: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterDescriptor>,
    /// The selected response-handling strategy.
    pub response_strategy: ResponseStrategy,
    /// Mapped success payload type, if the operation declares one. Already in
    /// streaming form when the strategy streams.
    pub payload_type: Option<TypeExpression>,
    /// Element type of the streamed response, set when the strategy streams
    /// (the emitter renders the async iterator over it).
    pub stream_element_type: Option<String>,
    /// Fully rendered C# return type of the method.
    pub return_type: String,
    /// Request-construction steps in execution order.
    pub steps: Vec<RequestStep>,
    /// Whether generated code must raise the unexpected-empty-body failure
    /// when a required response body is absent.
    pub ensure_body: bool,
    /// Auxiliary support types this method requires.
    pub required_auxiliaries: BTreeSet<AuxiliaryType>,
    /// Doc comment source.
    pub description: Option<String>,
    /// Whether the operation is deprecated.
    pub deprecated: bool,
}

impl MethodDescriptor {
    /// Renders the C# parameter list (types, names, default literals).
    pub fn render_parameter_list(&self) -> String {
        self.parameters
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("{} {} = {}", p.type_expr.render(), p.name, default),
                None => format!("{} {}", p.type_expr.render(), p.name),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Compiles one operation into a method descriptor.
///
/// Never skips an operation; fails only on parameter-name collisions that
/// survive sanitization. Method-name collisions across an operation's tag
/// group are detected by the assembler, which sees all siblings.
pub fn compile(operation: &Operation, settings: &ClientSettings) -> GenResult<MethodDescriptor> {
    let method_name = format!(
        "{}Async",
        sanitize(&operation.name, IdentifierRole::Method)
    );

    let success = operation
        .responses
        .iter()
        .find(|r| r.category == StatusCategory::Success);
    let success_type = success.and_then(|r| r.type_ref.as_ref());

    // S column of the decision table: listed in the large-array-response set
    // and the success body is actually stream-eligible.
    let wants_streamed_response =
        settings.streams_response(&operation.tag, &operation.name);
    let streamed_response = match (wants_streamed_response, success_type) {
        (true, Some(t)) if is_stream_eligible(t) => true,
        (true, _) => {
            log::warn!(
                "{}.{} is in largeArrayResponseMethods but its success body is not a streamable array; using buffered response",
                operation.tag,
                operation.name
            );
            false
        }
        (false, _) => false,
    };

    let streamed_request = settings.streams_request(&operation.tag, &operation.name);

    let response_strategy = match (streamed_response, settings.wrap_responses) {
        (false, false) => ResponseStrategy::Plain,
        (false, true) => ResponseStrategy::Wrapped,
        (true, false) => ResponseStrategy::Streamed,
        (true, true) => ResponseStrategy::StreamedWrapped,
    };

    let payload_ctx = TypeContext {
        occurrence: Occurrence::Response,
        streamed: streamed_response,
    };
    let payload_type = success_type.map(|t| map_type(t, &payload_ctx));
    let stream_element_type = if streamed_response {
        success_type.map(|t| stream_element(t, Occurrence::Response))
    } else {
        None
    };

    let mut required_auxiliaries = BTreeSet::new();
    // Every method can throw on error statuses and empty bodies.
    required_auxiliaries.insert(AuxiliaryType::Exception);
    match response_strategy {
        ResponseStrategy::Plain | ResponseStrategy::Streamed => {}
        ResponseStrategy::Wrapped => {
            required_auxiliaries.insert(AuxiliaryType::ResponseWrapper);
        }
        ResponseStrategy::StreamedWrapped => {
            required_auxiliaries.insert(AuxiliaryType::ResponseWrapper);
            required_auxiliaries.insert(AuxiliaryType::DisposableResponseWrapper);
        }
    }

    let (parameters, steps) = compile_parameters(
        operation,
        &method_name,
        streamed_request,
        &mut required_auxiliaries,
    )?;

    let return_type = render_return_type(response_strategy, payload_type.as_ref());

    // A required success body that arrives empty must surface a distinct
    // failure, never a default value.
    let ensure_body = match success {
        Some(r) => r.type_ref.is_some() && !r.nullable,
        None => false,
    };

    Ok(MethodDescriptor {
        operation_name: operation.name.clone(),
        name: method_name,
        http_method: operation.method.clone(),
        path: operation.path.clone(),
        parameters,
        response_strategy,
        payload_type,
        stream_element_type,
        return_type,
        steps,
        ensure_body,
        required_auxiliaries,
        description: operation.description.clone(),
        deprecated: operation.deprecated,
    })
}

/// Maps and sanitizes all parameters, producing the request steps alongside.
fn compile_parameters(
    operation: &Operation,
    method_name: &str,
    streamed_request: bool,
    required_auxiliaries: &mut BTreeSet<AuxiliaryType>,
) -> GenResult<(Vec<ParameterDescriptor>, Vec<RequestStep>)> {
    let mut parameters = Vec::with_capacity(operation.parameters.len());
    let mut steps = Vec::new();
    let mut seen = HashSet::new();

    for param in &operation.parameters {
        let name = sanitize(&param.name, IdentifierRole::Parameter);
        if !seen.insert(name.clone()) {
            return Err(GeneratorError::DuplicateParameter {
                method: method_name.to_string(),
                parameter: name,
            });
        }

        let is_streamed_body =
            param.position == ParameterPosition::Body && streamed_request && {
                if is_stream_eligible(&param.type_ref) {
                    true
                } else {
                    log::warn!(
                        "{}.{} is in largeArrayRequestMethods but its body is not a streamable array; using buffered body",
                        operation.tag,
                        operation.name
                    );
                    false
                }
            };

        let ctx = TypeContext {
            occurrence: Occurrence::RequestParameter,
            streamed: is_streamed_body,
        };
        let type_expr = map_type(&param.type_ref, &ctx);

        steps.push(step_for(param, &name, is_streamed_body));
        if is_streamed_body {
            required_auxiliaries.insert(AuxiliaryType::StreamedContentAdapter);
        }

        parameters.push(ParameterDescriptor {
            raw_name: param.name.clone(),
            name,
            position: param.position,
            type_expr,
            required: param.required,
            default: param.default.clone(),
        });
    }

    Ok((parameters, steps))
}

fn step_for(param: &Parameter, var: &str, streamed_body: bool) -> RequestStep {
    match param.position {
        ParameterPosition::Path => RequestStep::PathParameter {
            raw: param.name.clone(),
            var: var.to_string(),
        },
        ParameterPosition::Query => RequestStep::QueryParameter {
            raw: param.name.clone(),
            var: var.to_string(),
            required: param.required,
        },
        ParameterPosition::Header => RequestStep::HeaderParameter {
            raw: param.name.clone(),
            var: var.to_string(),
        },
        ParameterPosition::Body => {
            if streamed_body {
                RequestStep::StreamedBody {
                    var: var.to_string(),
                    element_type: stream_element(&param.type_ref, Occurrence::RequestParameter),
                }
            } else {
                RequestStep::BufferedBody {
                    var: var.to_string(),
                }
            }
        }
    }
}

/// Element type of a streamed occurrence: the array element for arrays, the
/// mapped type itself for stream-eligible non-array bodies. Matches what the
/// streamed [`map_type`] form puts inside the producer.
fn stream_element(reference: &TypeReference, occurrence: Occurrence) -> String {
    match &reference.kind {
        TypeKind::Array(element) => {
            map_type(element, &TypeContext::buffered(occurrence)).render()
        }
        _ => {
            let mut base = reference.clone();
            base.nullable = false;
            map_type(&base, &TypeContext::buffered(occurrence)).render()
        }
    }
}

/// Renders the method return type for the selected strategy.
fn render_return_type(
    strategy: ResponseStrategy,
    payload: Option<&TypeExpression>,
) -> String {
    match strategy {
        ResponseStrategy::Plain => match payload {
            Some(p) => format!("System.Threading.Tasks.Task<{}>", p.render()),
            None => "System.Threading.Tasks.Task".to_string(),
        },
        ResponseStrategy::Wrapped => match payload {
            Some(p) => format!(
                "System.Threading.Tasks.Task<{}<{}>>",
                RESPONSE_WRAPPER_NAME,
                p.render()
            ),
            None => format!("System.Threading.Tasks.Task<{}>", RESPONSE_WRAPPER_NAME),
        },
        // The producer is returned directly: the method itself is the stream.
        ResponseStrategy::Streamed => payload
            .map(|p| p.render())
            .unwrap_or_else(|| "System.Threading.Tasks.Task".to_string()),
        ResponseStrategy::StreamedWrapped => match payload {
            Some(p) => format!(
                "System.Threading.Tasks.Task<{}<{}>>",
                DISPOSABLE_WRAPPER_NAME,
                p.render()
            ),
            None => format!("System.Threading.Tasks.Task<{}>", RESPONSE_WRAPPER_NAME),
        },
    }
}
