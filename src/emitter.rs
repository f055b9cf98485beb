#![deny(missing_docs)]

//! # Template Emitter
//!
//! Renders the final C# source text from assembled [`ClassDescriptor`]s.
//!
//! Emission is a pure rendering step: every policy decision (strategy
//! selection, naming, gating) was made by the compiler and assembler, and the
//! emitter only walks descriptors in document order. Auxiliary support types
//! are collected across all visible declarations and appended exactly once
//! each, after the clients, regardless of how many methods reference them.

use crate::assembler::{ClassDescriptor, ConstructorShape};
use crate::compiler::{
    AuxiliaryType, MethodDescriptor, RequestStep, ResponseStrategy, DISPOSABLE_WRAPPER_NAME,
    EXCEPTION_NAME, RESPONSE_WRAPPER_NAME, STREAMED_CONTENT_NAME,
};
use crate::settings::ClientSettings;
use std::collections::BTreeSet;

const INDENT: &str = "    ";

/// Renders all class/interface declarations plus required auxiliary types.
///
/// Declaration order matches the input slice (document order); for each
/// descriptor the interface precedes the class. Calling this twice with the
/// same input yields byte-identical text.
pub fn emit(descriptors: &[ClassDescriptor], settings: &ClientSettings) -> String {
    let mut code = String::new();

    code.push_str("//----------------------\n");
    code.push_str("// <auto-generated>\n");
    code.push_str("//     Generated by csclientgen. Do not edit manually.\n");
    code.push_str("// </auto-generated>\n");
    code.push_str("//----------------------\n\n");

    if let Some(namespace) = &settings.namespace {
        code.push_str(&format!("namespace {};\n\n", namespace));
    }

    let mut first = true;
    for descriptor in descriptors {
        if descriptor.interface_visible() {
            if !first {
                code.push('\n');
            }
            first = false;
            code.push_str(&render_interface(descriptor));
        }
        if descriptor.class_visible() {
            if !first {
                code.push('\n');
            }
            first = false;
            code.push_str(&render_class(descriptor));
        }
    }

    // Auxiliary types are only needed when at least one declaration that can
    // reference them was built.
    let auxiliaries: BTreeSet<AuxiliaryType> = descriptors
        .iter()
        .filter(|d| d.emit_class || d.emit_interface)
        .flat_map(|d| d.auxiliaries.iter().copied())
        .collect();

    for auxiliary in auxiliaries {
        if !first {
            code.push('\n');
        }
        first = false;
        code.push_str(render_auxiliary(auxiliary));
    }

    code
}

fn render_interface(descriptor: &ClassDescriptor) -> String {
    let mut code = String::new();

    let inheritance = descriptor
        .base_interface
        .as_ref()
        .map(|base| format!(" : {}", base))
        .unwrap_or_default();

    code.push_str(&format!(
        "public partial interface {}{}\n{{\n",
        descriptor.interface_name, inheritance
    ));

    for (i, method) in descriptor.methods.iter().enumerate() {
        if i > 0 {
            code.push('\n');
        }
        push_method_docs(&mut code, method, INDENT);
        code.push_str(&format!(
            "{}{} {}({});\n",
            INDENT,
            method.return_type,
            method.name,
            method.render_parameter_list()
        ));
    }

    code.push_str("}\n");
    code
}

fn render_class(descriptor: &ClassDescriptor) -> String {
    let mut code = String::new();

    // The interface reference survives even when the interface text itself is
    // suppressed; only generate=false drops it.
    let mut bases = Vec::new();
    if let Some(base) = &descriptor.base_class {
        bases.push(base.clone());
    }
    if descriptor.emit_interface {
        bases.push(descriptor.interface_name.clone());
    }
    let inheritance = if bases.is_empty() {
        String::new()
    } else {
        format!(" : {}", bases.join(", "))
    };

    code.push_str(&format!(
        "public partial class {}{}\n{{\n",
        descriptor.class_name, inheritance
    ));

    code.push_str(&format!(
        "{}private readonly System.Net.Http.HttpClient _httpClient;\n",
        INDENT
    ));
    // Without a base class to forward it to, the configuration is kept on
    // the client itself.
    if let ConstructorShape::Configuration { class_name, .. } = &descriptor.constructor {
        if descriptor.base_class.is_none() {
            code.push_str(&format!(
                "{}private readonly {} _configuration;\n",
                INDENT, class_name
            ));
        }
    }
    code.push('\n');
    push_constructor(&mut code, descriptor);

    if descriptor.uses_request_factory {
        code.push('\n');
        push_request_factory(&mut code);
    }

    for method in &descriptor.methods {
        code.push('\n');
        push_method_docs(&mut code, method, INDENT);
        push_method(&mut code, method, descriptor.uses_request_factory);
    }

    code.push_str("}\n");
    code
}

fn push_method_docs(code: &mut String, method: &MethodDescriptor, indent: &str) {
    if let Some(description) = &method.description {
        code.push_str(&format!("{}/// <summary>\n", indent));
        for line in description.lines() {
            code.push_str(&format!("{}/// {}\n", indent, line));
        }
        code.push_str(&format!("{}/// </summary>\n", indent));
    }
    if method.deprecated {
        code.push_str(&format!("{}[System.Obsolete]\n", indent));
    }
}

fn push_constructor(code: &mut String, descriptor: &ClassDescriptor) {
    let name = &descriptor.class_name;
    match &descriptor.constructor {
        ConstructorShape::Configuration {
            class_name,
            owned_transport,
        } => {
            let forward = if descriptor.base_class.is_some() {
                " : base(configuration)"
            } else {
                ""
            };
            let store = if descriptor.base_class.is_none() {
                format!("{i}{i}_configuration = configuration;\n", i = INDENT)
            } else {
                String::new()
            };
            match owned_transport {
                None => {
                    code.push_str(&format!(
                        "{i}public {n}({c} configuration, System.Net.Http.HttpClient httpClient){f}\n{i}{{\n{s}{i}{i}_httpClient = httpClient;\n{i}}}\n",
                        i = INDENT, n = name, c = class_name, f = forward, s = store
                    ));
                }
                Some(transport) => {
                    code.push_str(&format!(
                        "{i}public {n}({c} configuration){f}\n{i}{{\n{s}{i}{i}_httpClient = new {t}();\n{i}}}\n",
                        i = INDENT, n = name, c = class_name, f = forward, s = store, t = transport
                    ));
                }
            }
        }
        ConstructorShape::InjectedTransport => {
            code.push_str(&format!(
                "{i}public {n}(System.Net.Http.HttpClient httpClient)\n{i}{{\n{i}{i}_httpClient = httpClient;\n{i}}}\n",
                i = INDENT, n = name
            ));
        }
        ConstructorShape::OwnedTransport { transport_type } => {
            code.push_str(&format!(
                "{i}public {n}()\n{i}{{\n{i}{i}_httpClient = new {t}();\n{i}}}\n",
                i = INDENT, n = name, t = transport_type
            ));
        }
    }
}

fn push_request_factory(code: &mut String) {
    code.push_str(&format!(
        "{i}protected virtual System.Threading.Tasks.Task<System.Net.Http.HttpRequestMessage> CreateHttpRequestMessageAsync()\n{i}{{\n{i}{i}return System.Threading.Tasks.Task.FromResult(new System.Net.Http.HttpRequestMessage());\n{i}}}\n",
        i = INDENT
    ));
}

fn push_method(code: &mut String, method: &MethodDescriptor, uses_request_factory: bool) {
    code.push_str(&format!(
        "{}public virtual async {} {}({})\n{}{{\n",
        INDENT,
        method.return_type,
        method.name,
        method.render_parameter_list(),
        INDENT
    ));

    let body = INDENT.repeat(2);
    push_url_construction(code, method, &body);
    push_request_construction(code, method, uses_request_factory, &body);
    match method.response_strategy {
        ResponseStrategy::Plain | ResponseStrategy::Wrapped => {
            push_buffered_response(code, method, &body)
        }
        ResponseStrategy::Streamed => push_streamed_response(code, method, &body),
        ResponseStrategy::StreamedWrapped => push_streamed_wrapped_response(code, method, &body),
    }

    code.push_str(&format!("{}}}\n", INDENT));
}

/// `System.Convert.ToString` invocation with invariant culture.
fn convert(var: &str) -> String {
    format!(
        "System.Convert.ToString({}, System.Globalization.CultureInfo.InvariantCulture)",
        var
    )
}

fn push_url_construction(code: &mut String, method: &MethodDescriptor, body: &str) {
    code.push_str(&format!(
        "{}var urlBuilder_ = new System.Text.StringBuilder();\n",
        body
    ));
    code.push_str(&format!(
        "{}urlBuilder_.Append(\"{}\");\n",
        body, method.path
    ));

    for step in &method.steps {
        if let RequestStep::PathParameter { raw, var } = step {
            code.push_str(&format!(
                "{}urlBuilder_.Replace(\"{{{}}}\", System.Uri.EscapeDataString({}));\n",
                body,
                raw,
                convert(var)
            ));
        }
    }

    let query_steps: Vec<_> = method
        .steps
        .iter()
        .filter_map(|s| match s {
            RequestStep::QueryParameter { raw, var, required } => Some((raw, var, *required)),
            _ => None,
        })
        .collect();

    if !query_steps.is_empty() {
        code.push_str(&format!("{}urlBuilder_.Append('?');\n", body));
        for (raw, var, required) in query_steps {
            let append = format!(
                "urlBuilder_.Append(\"{}=\").Append(System.Uri.EscapeDataString({})).Append('&');",
                raw,
                convert(var)
            );
            if required {
                code.push_str(&format!("{}{}\n", body, append));
            } else {
                code.push_str(&format!("{}if ((object){} != null)\n", body, var));
                code.push_str(&format!("{}{{\n", body));
                code.push_str(&format!("{}{}{}\n", body, INDENT, append));
                code.push_str(&format!("{}}}\n", body));
            }
        }
        // Removes the trailing separator ('&' or a bare '?').
        code.push_str(&format!("{}urlBuilder_.Length--;\n", body));
    }
}

fn push_request_construction(
    code: &mut String,
    method: &MethodDescriptor,
    uses_request_factory: bool,
    body: &str,
) {
    if uses_request_factory {
        code.push_str(&format!(
            "{}var request_ = await CreateHttpRequestMessageAsync().ConfigureAwait(false);\n",
            body
        ));
    } else {
        code.push_str(&format!(
            "{}var request_ = new System.Net.Http.HttpRequestMessage();\n",
            body
        ));
    }
    code.push_str(&format!(
        "{}request_.Method = new System.Net.Http.HttpMethod(\"{}\");\n",
        body, method.http_method
    ));
    code.push_str(&format!(
        "{}request_.RequestUri = new System.Uri(urlBuilder_.ToString(), System.UriKind.RelativeOrAbsolute);\n",
        body
    ));

    for step in &method.steps {
        match step {
            RequestStep::HeaderParameter { raw, var } => {
                code.push_str(&format!(
                    "{}request_.Headers.TryAddWithoutValidation(\"{}\", {});\n",
                    body,
                    raw,
                    convert(var)
                ));
            }
            RequestStep::BufferedBody { var } => {
                code.push_str(&format!(
                    "{}var content_ = new System.Net.Http.StringContent(System.Text.Json.JsonSerializer.Serialize({}));\n",
                    body, var
                ));
                code.push_str(&format!(
                    "{}content_.Headers.ContentType = System.Net.Http.Headers.MediaTypeHeaderValue.Parse(\"application/json\");\n",
                    body
                ));
                code.push_str(&format!("{}request_.Content = content_;\n", body));
            }
            RequestStep::StreamedBody { var, element_type } => {
                code.push_str(&format!(
                    "{}request_.Content = new {}<{}>({});\n",
                    body, STREAMED_CONTENT_NAME, element_type, var
                ));
            }
            _ => {}
        }
    }

    code.push_str(&format!(
        "{}var response_ = await _httpClient.SendAsync(request_, System.Net.Http.HttpCompletionOption.ResponseHeadersRead).ConfigureAwait(false);\n",
        body
    ));
}

fn push_status_check(code: &mut String, indent: &str) {
    code.push_str(&format!(
        "{}var status_ = (int)response_.StatusCode;\n",
        indent
    ));
    code.push_str(&format!(
        "{}if (status_ < 200 || status_ >= 300)\n{}{{\n",
        indent, indent
    ));
    code.push_str(&format!(
        "{}{}var error_ = await response_.Content.ReadAsStringAsync().ConfigureAwait(false);\n",
        indent, INDENT
    ));
    code.push_str(&format!(
        "{}{}throw new {}(\"The HTTP status code of the response was not expected (\" + status_ + \").\", status_, error_);\n",
        indent, INDENT, EXCEPTION_NAME
    ));
    code.push_str(&format!("{}}}\n", indent));
}

fn push_buffered_response(code: &mut String, method: &MethodDescriptor, body: &str) {
    let inner = format!("{}{}", body, INDENT);
    code.push_str(&format!("{}try\n{}{{\n", body, body));
    push_status_check(code, &inner);

    let wrapped = method.response_strategy == ResponseStrategy::Wrapped;
    match &method.payload_type {
        Some(payload) => {
            code.push_str(&format!(
                "{}var data_ = await response_.Content.ReadAsStringAsync().ConfigureAwait(false);\n",
                inner
            ));
            code.push_str(&format!(
                "{}var result_ = System.Text.Json.JsonSerializer.Deserialize<{}>(data_);\n",
                inner,
                payload.render()
            ));
            if method.ensure_body {
                code.push_str(&format!("{}if (result_ == null)\n", inner));
                code.push_str(&format!(
                    "{}{}throw new {}(\"Response was null which was not expected.\", status_, data_);\n",
                    inner, INDENT, EXCEPTION_NAME
                ));
            }
            if wrapped {
                code.push_str(&format!(
                    "{}return new {}<{}>(status_, response_.Headers, result_);\n",
                    inner,
                    RESPONSE_WRAPPER_NAME,
                    payload.render()
                ));
            } else {
                code.push_str(&format!("{}return result_;\n", inner));
            }
        }
        None => {
            if wrapped {
                code.push_str(&format!(
                    "{}return new {}(status_, response_.Headers);\n",
                    inner, RESPONSE_WRAPPER_NAME
                ));
            }
        }
    }

    code.push_str(&format!("{}}}\n{}finally\n{}{{\n", body, body, body));
    code.push_str(&format!("{}response_.Dispose();\n", inner));
    code.push_str(&format!("{}}}\n", body));
}

fn push_streamed_response(code: &mut String, method: &MethodDescriptor, body: &str) {
    let inner = format!("{}{}", body, INDENT);
    let element = method.stream_element_type.as_deref().unwrap_or("object");

    code.push_str(&format!("{}try\n{}{{\n", body, body));
    push_status_check(code, &inner);
    code.push_str(&format!(
        "{}var stream_ = await response_.Content.ReadAsStreamAsync().ConfigureAwait(false);\n",
        inner
    ));
    if method.ensure_body {
        code.push_str(&format!("{}if (stream_ == null)\n", inner));
        code.push_str(&format!(
            "{}{}throw new {}(\"Response was null which was not expected.\", status_, null);\n",
            inner, INDENT, EXCEPTION_NAME
        ));
    }
    code.push_str(&format!(
        "{}await foreach (var item_ in System.Text.Json.JsonSerializer.DeserializeAsyncEnumerable<{}>(stream_))\n{}{{\n",
        inner, element, inner
    ));
    code.push_str(&format!("{}{}yield return item_;\n", inner, INDENT));
    code.push_str(&format!("{}}}\n", inner));
    code.push_str(&format!("{}}}\n{}finally\n{}{{\n", body, body, body));
    code.push_str(&format!("{}response_.Dispose();\n", inner));
    code.push_str(&format!("{}}}\n", body));
}

fn push_streamed_wrapped_response(code: &mut String, method: &MethodDescriptor, body: &str) {
    let inner = format!("{}{}", body, INDENT);
    let element = method.stream_element_type.as_deref().unwrap_or("object");
    let payload = method
        .payload_type
        .as_ref()
        .map(|p| p.render())
        .unwrap_or_else(|| "object".to_string());

    code.push_str(&format!(
        "{}var status_ = (int)response_.StatusCode;\n",
        body
    ));
    code.push_str(&format!(
        "{}if (status_ < 200 || status_ >= 300)\n{}{{\n",
        body, body
    ));
    code.push_str(&format!("{}try\n{}{{\n", inner, inner));
    code.push_str(&format!(
        "{}{}var error_ = await response_.Content.ReadAsStringAsync().ConfigureAwait(false);\n",
        inner, INDENT
    ));
    code.push_str(&format!(
        "{}{}throw new {}(\"The HTTP status code of the response was not expected (\" + status_ + \").\", status_, error_);\n",
        inner, INDENT, EXCEPTION_NAME
    ));
    code.push_str(&format!(
        "{}}}\n{}finally\n{}{{\n{}{}response_.Dispose();\n{}}}\n",
        inner, inner, inner, inner, INDENT, inner
    ));
    code.push_str(&format!("{}}}\n", body));

    // Until the wrapper adopts the response message, any failure here must
    // release it.
    code.push_str(&format!("{}try\n{}{{\n", body, body));
    code.push_str(&format!(
        "{}var stream_ = await response_.Content.ReadAsStreamAsync().ConfigureAwait(false);\n",
        inner
    ));
    if method.ensure_body {
        code.push_str(&format!("{}if (stream_ == null)\n", inner));
        code.push_str(&format!(
            "{}{}throw new {}(\"Response was null which was not expected.\", status_, null);\n",
            inner, INDENT, EXCEPTION_NAME
        ));
    }
    code.push_str(&format!(
        "{}var items_ = System.Text.Json.JsonSerializer.DeserializeAsyncEnumerable<{}>(stream_);\n",
        inner, element
    ));
    // The wrapper adopts the response message so disposing the wrapper
    // releases the open transport stream.
    code.push_str(&format!(
        "{}return new {}<{}>(status_, response_.Headers, items_, response_);\n",
        inner, DISPOSABLE_WRAPPER_NAME, payload
    ));
    code.push_str(&format!("{}}}\n{}catch\n{}{{\n", body, body, body));
    code.push_str(&format!("{}response_.Dispose();\n", inner));
    code.push_str(&format!("{}throw;\n", inner));
    code.push_str(&format!("{}}}\n", body));
}

fn render_auxiliary(auxiliary: AuxiliaryType) -> &'static str {
    match auxiliary {
        AuxiliaryType::Exception => AUXILIARY_EXCEPTION,
        AuxiliaryType::ResponseWrapper => AUXILIARY_RESPONSE_WRAPPER,
        AuxiliaryType::DisposableResponseWrapper => AUXILIARY_DISPOSABLE_WRAPPER,
        AuxiliaryType::StreamedContentAdapter => AUXILIARY_STREAMED_CONTENT,
    }
}

const AUXILIARY_EXCEPTION: &str = r#"public partial class ApiException : System.Exception
{
    public int StatusCode { get; }

    public string Response { get; }

    public ApiException(string message, int statusCode, string response)
        : base(message + "\n\nStatus: " + statusCode)
    {
        StatusCode = statusCode;
        Response = response;
    }
}
"#;

const AUXILIARY_RESPONSE_WRAPPER: &str = r#"public partial class ApiResponse
{
    public int StatusCode { get; }

    public System.Net.Http.Headers.HttpResponseHeaders Headers { get; }

    public ApiResponse(int statusCode, System.Net.Http.Headers.HttpResponseHeaders headers)
    {
        StatusCode = statusCode;
        Headers = headers;
    }
}

public partial class ApiResponse<TResult> : ApiResponse
{
    public TResult Result { get; }

    public ApiResponse(int statusCode, System.Net.Http.Headers.HttpResponseHeaders headers, TResult result)
        : base(statusCode, headers)
    {
        Result = result;
    }
}
"#;

const AUXILIARY_DISPOSABLE_WRAPPER: &str = r#"public partial class DisposableApiResponse<TResult> : ApiResponse<TResult>, System.IAsyncDisposable
{
    private readonly System.Net.Http.HttpResponseMessage _response;

    public DisposableApiResponse(int statusCode, System.Net.Http.Headers.HttpResponseHeaders headers, TResult result, System.Net.Http.HttpResponseMessage response)
        : base(statusCode, headers, result)
    {
        _response = response;
    }

    public System.Threading.Tasks.ValueTask DisposeAsync()
    {
        _response.Dispose();
        return default;
    }
}
"#;

const AUXILIARY_STREAMED_CONTENT: &str = r#"public partial class AsyncEnumerableContent<T> : System.Net.Http.HttpContent
{
    private readonly System.Collections.Generic.IAsyncEnumerable<T> _items;

    public AsyncEnumerableContent(System.Collections.Generic.IAsyncEnumerable<T> items)
    {
        _items = items;
        Headers.ContentType = System.Net.Http.Headers.MediaTypeHeaderValue.Parse("application/json");
    }

    protected override async System.Threading.Tasks.Task SerializeToStreamAsync(System.IO.Stream stream, System.Net.TransportContext context)
    {
        var writer_ = new System.Text.Json.Utf8JsonWriter(stream);
        writer_.WriteStartArray();
        await foreach (var item_ in _items.ConfigureAwait(false))
        {
            System.Text.Json.JsonSerializer.Serialize(writer_, item_);
            await writer_.FlushAsync().ConfigureAwait(false);
        }
        writer_.WriteEndArray();
        await writer_.FlushAsync().ConfigureAwait(false);
        await writer_.DisposeAsync().ConfigureAwait(false);
    }

    protected override bool TryComputeLength(out long length)
    {
        length = -1;
        return false;
    }
}
"#;
