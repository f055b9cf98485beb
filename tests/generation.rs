//! End-to-end generation scenarios.

use csclientgen::{
    generate, ApiDocument, ClientSettings, GeneratorError, MethodKey, Operation, Parameter,
    ParameterPosition, PrimitiveKind, ResponseDef, StatusCategory, TypeKind, TypeReference,
};
use pretty_assertions::assert_eq;

fn person() -> TypeReference {
    TypeReference::new(TypeKind::Object("Person".into()))
}

fn person_array() -> TypeReference {
    TypeReference::new(TypeKind::Array(Box::new(person())))
}

fn success(type_ref: TypeReference) -> ResponseDef {
    ResponseDef {
        category: StatusCategory::Success,
        type_ref: Some(type_ref),
        nullable: false,
    }
}

/// `GetPerson(bool override = false)` on tag `Foo`.
fn get_person() -> Operation {
    Operation {
        tag: "Foo".into(),
        name: "GetPerson".into(),
        method: "GET".into(),
        path: "/person".into(),
        parameters: vec![Parameter {
            name: "override".into(),
            position: ParameterPosition::Query,
            type_ref: TypeReference::new(TypeKind::Primitive(PrimitiveKind::Boolean)),
            required: false,
            default: Some("false".into()),
        }],
        responses: vec![success(person())],
        description: None,
        deprecated: false,
    }
}

/// `GetPeople(names: array<string>)` on tag `Bar`, returning `array<Person>`.
fn get_people() -> Operation {
    Operation {
        tag: "Bar".into(),
        name: "GetPeople".into(),
        method: "POST".into(),
        path: "/people".into(),
        parameters: vec![Parameter {
            name: "names".into(),
            position: ParameterPosition::Body,
            type_ref: TypeReference::new(TypeKind::Array(Box::new(TypeReference::new(
                TypeKind::Primitive(PrimitiveKind::String),
            )))),
            required: true,
            default: None,
        }],
        responses: vec![success(person_array())],
        description: None,
        deprecated: false,
    }
}

fn document(operations: Vec<Operation>) -> ApiDocument {
    ApiDocument { operations }
}

#[test]
fn reserved_word_parameter_is_escaped() {
    let text = generate(&document(vec![get_person()]), &ClientSettings::default()).unwrap();

    assert!(text.contains("GetPersonAsync(bool @override = false)"));
    assert!(text.contains("public partial class FooClient"));
    // The wire name stays unescaped in the query string.
    assert!(text.contains("urlBuilder_.Append(\"override=\")"));
}

#[test]
fn streamed_response_declares_producer_on_class_and_interface() {
    let mut settings = ClientSettings::default();
    settings.generate_interfaces = true;
    settings
        .large_array_response_methods
        .insert(MethodKey::new("Bar", "GetPeople"));

    let text = generate(&document(vec![get_people()]), &settings).unwrap();

    let producer = "System.Collections.Generic.IAsyncEnumerable<Person> GetPeopleAsync";
    assert!(text.contains("public partial interface IBarClient"));
    // Once in the interface, once in the class.
    assert_eq!(text.matches(producer).count(), 2);
    // Null-body condition raises the unexpected-empty-body failure.
    assert!(text.contains("if (stream_ == null)"));
    assert!(text.contains("throw new ApiException(\"Response was null which was not expected.\""));
}

#[test]
fn streamable_non_array_response_streams_its_mapped_type() {
    let mut settings = ClientSettings::default();
    settings
        .large_array_response_methods
        .insert(MethodKey::new("Bar", "GetFeed"));

    let op = Operation {
        tag: "Bar".into(),
        name: "GetFeed".into(),
        method: "GET".into(),
        path: "/feed".into(),
        parameters: vec![],
        responses: vec![success(
            TypeReference::new(TypeKind::Object("Feed".into())).streamable(),
        )],
        description: None,
        deprecated: false,
    };

    let text = generate(&document(vec![op]), &settings).unwrap();
    // The signature is the producer form, matching the yield-based body.
    assert!(text.contains(
        "public virtual async System.Collections.Generic.IAsyncEnumerable<Feed> GetFeedAsync()"
    ));
    assert!(text.contains("DeserializeAsyncEnumerable<Feed>(stream_)"));
    assert!(text.contains("yield return item_;"));
}

#[test]
fn streamed_and_wrapped_response_uses_disposable_wrapper() {
    let mut settings = ClientSettings::default();
    settings.wrap_responses = true;
    settings
        .large_array_response_methods
        .insert(MethodKey::new("Bar", "GetPeople"));

    let text = generate(&document(vec![get_people()]), &settings).unwrap();

    assert!(text.contains(
        "System.Threading.Tasks.Task<DisposableApiResponse<System.Collections.Generic.IAsyncEnumerable<Person>>> GetPeopleAsync"
    ));
    // The wrapper supports asynchronous disposal.
    assert!(text.contains("public partial class DisposableApiResponse<TResult> : ApiResponse<TResult>, System.IAsyncDisposable"));
    assert!(text.contains("public System.Threading.Tasks.ValueTask DisposeAsync()"));
}

#[test]
fn streamed_request_uses_producer_parameter_and_content_adapter() {
    let mut settings = ClientSettings::default();
    settings
        .large_array_request_methods
        .insert(MethodKey::new("Bar", "GetPeople"));

    let text = generate(&document(vec![get_people()]), &settings).unwrap();

    assert!(text.contains("GetPeopleAsync(System.Collections.Generic.IAsyncEnumerable<string> names)"));
    assert!(text.contains("request_.Content = new AsyncEnumerableContent<string>(names);"));
    assert!(text.contains("public partial class AsyncEnumerableContent<T> : System.Net.Http.HttpContent"));
}

#[test]
fn all_four_response_strategies_match_the_decision_table() {
    let doc = document(vec![get_people()]);
    let streamed_key = MethodKey::new("Bar", "GetPeople");

    // (S=no, W=no) -> plain buffered collection.
    let text = generate(&doc, &ClientSettings::default()).unwrap();
    assert!(text.contains(
        "System.Threading.Tasks.Task<System.Collections.Generic.ICollection<Person>> GetPeopleAsync"
    ));

    // (S=no, W=yes) -> wrapper around the buffered collection.
    let mut settings = ClientSettings::default();
    settings.wrap_responses = true;
    let text = generate(&doc, &settings).unwrap();
    assert!(text.contains(
        "System.Threading.Tasks.Task<ApiResponse<System.Collections.Generic.ICollection<Person>>> GetPeopleAsync"
    ));

    // (S=yes, W=no) -> the producer directly, no Task wrapper.
    let mut settings = ClientSettings::default();
    settings.large_array_response_methods.insert(streamed_key.clone());
    let text = generate(&doc, &settings).unwrap();
    assert!(text.contains("System.Collections.Generic.IAsyncEnumerable<Person> GetPeopleAsync"));
    assert!(!text.contains("Task<System.Collections.Generic.IAsyncEnumerable<Person>>"));

    // (S=yes, W=yes) -> disposable wrapper around the producer.
    let mut settings = ClientSettings::default();
    settings.wrap_responses = true;
    settings.large_array_response_methods.insert(streamed_key);
    let text = generate(&doc, &settings).unwrap();
    assert!(text.contains(
        "Task<DisposableApiResponse<System.Collections.Generic.IAsyncEnumerable<Person>>> GetPeopleAsync"
    ));
}

#[test]
fn generation_is_deterministic() {
    let mut settings = ClientSettings::default();
    settings.generate_interfaces = true;
    settings.wrap_responses = true;
    let doc = document(vec![get_person(), get_people()]);

    let first = generate(&doc, &settings).unwrap();
    let second = generate(&doc, &settings).unwrap();
    assert_eq!(first, second);
}

#[test]
fn auxiliary_types_appear_exactly_once() {
    let mut settings = ClientSettings::default();
    settings.wrap_responses = true;

    // Two tags, three operations, all triggering the same auxiliary types.
    let mut other = get_person();
    other.tag = "Baz".into();
    other.name = "GetOther".into();
    let doc = document(vec![get_person(), get_people(), other]);

    let text = generate(&doc, &settings).unwrap();
    assert_eq!(text.matches("public partial class ApiException").count(), 1);
    assert_eq!(text.matches("public partial class ApiResponse\n").count(), 1);
    assert_eq!(
        text.matches("public partial class ApiResponse<TResult>").count(),
        1
    );
}

#[test]
fn emission_gating_matrix() {
    let doc = document(vec![get_person()]);
    let class_decl = "public partial class FooClient";
    let interface_decl = "public partial interface IFooClient";

    let cases = [
        // (generate, suppress) for classes and interfaces independently.
        (true, false, true, false, true, true),
        (true, true, true, false, false, true),
        (false, false, true, false, false, true),
        (true, false, true, true, true, false),
        (true, false, false, false, true, false),
        (true, true, true, true, false, false),
        (false, false, false, false, false, false),
    ];

    for (gen_c, sup_c, gen_i, sup_i, want_class, want_interface) in cases {
        let mut settings = ClientSettings::default();
        settings.generate_classes = gen_c;
        settings.suppress_class_output = sup_c;
        settings.generate_interfaces = gen_i;
        settings.suppress_interface_output = sup_i;

        let text = generate(&doc, &settings).unwrap();
        assert_eq!(
            text.contains(class_decl),
            want_class,
            "class gating failed for {:?}",
            (gen_c, sup_c, gen_i, sup_i)
        );
        assert_eq!(
            text.contains(interface_decl),
            want_interface,
            "interface gating failed for {:?}",
            (gen_c, sup_c, gen_i, sup_i)
        );
    }
}

#[test]
fn suppressed_class_with_visible_interface() {
    let mut settings = ClientSettings::default();
    settings.generate_classes = true;
    settings.suppress_class_output = true;
    settings.generate_interfaces = true;

    let text = generate(&document(vec![get_person()]), &settings).unwrap();
    assert!(text.contains("public partial interface IFooClient"));
    assert!(!text.contains("public partial class FooClient"));
}

#[test]
fn colliding_methods_abort_the_whole_run() {
    let mut duplicate = get_person();
    duplicate.path = "/person/other".into();
    let doc = document(vec![get_person(), duplicate]);

    let err = generate(&doc, &ClientSettings::default()).unwrap_err();
    assert!(matches!(err, GeneratorError::DuplicateMethod { .. }));
}

#[test]
fn unknown_schema_kind_degrades_to_object() {
    let mut op = get_person();
    op.responses = vec![success(TypeReference::new(TypeKind::Primitive(
        PrimitiveKind::Unknown("mystery".into()),
    )))];

    let text = generate(&document(vec![op]), &ClientSettings::default()).unwrap();
    assert!(text.contains("System.Threading.Tasks.Task<object> GetPersonAsync"));
}

#[test]
fn base_types_and_configuration_constructor() {
    let mut settings = ClientSettings::default();
    settings.generate_interfaces = true;
    settings.base_class_name = Some("ClientBase".into());
    settings.base_interface_name = Some("IClientBase".into());
    settings.configuration_class_name = Some("AppConfig".into());

    let text = generate(&document(vec![get_person()]), &settings).unwrap();
    assert!(text.contains("public partial interface IFooClient : IClientBase"));
    assert!(text.contains("public partial class FooClient : ClientBase, IFooClient"));
    assert!(text.contains(
        "public FooClient(AppConfig configuration, System.Net.Http.HttpClient httpClient) : base(configuration)"
    ));
}

#[test]
fn configuration_without_base_class_is_kept_on_the_client() {
    let mut settings = ClientSettings::default();
    settings.configuration_class_name = Some("AppConfig".into());

    let text = generate(&document(vec![get_person()]), &settings).unwrap();
    assert!(text.contains("private readonly AppConfig _configuration;"));
    assert!(text.contains("_configuration = configuration;"));
    assert!(!text.contains(": base(configuration)"));
}
