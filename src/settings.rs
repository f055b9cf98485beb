#![deny(missing_docs)]

//! # Client Settings
//!
//! The immutable configuration describing the desired output shape.
//!
//! Settings are supplied once per generation run and passed by reference
//! through the whole pipeline; there is no ambient/global state. String-keyed
//! method sets (`"ClassName.MethodName"`) are parsed eagerly into structured
//! [`MethodKey`] values when the settings are deserialized, so compilation
//! only ever compares structured keys.

use crate::error::{GenResult, GeneratorError};
use heck::ToUpperCamelCase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// A structured `"ClassName.MethodName"` key.
///
/// `class` is the tag-derived client base name without the `Client` suffix
/// (e.g. `"Bar"` for tag `bar`), `method` the raw operation name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MethodKey {
    /// Client base name part.
    pub class: String,
    /// Operation name part.
    pub method: String,
}

impl MethodKey {
    /// Creates a key from its two parts.
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        MethodKey {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Whether this key selects the given operation.
    ///
    /// The class part matches either the raw tag or its UpperCamelCase form,
    /// so `"Bar.GetPeople"` selects operations tagged `bar` or `Bar`.
    pub fn matches(&self, tag: &str, operation_name: &str) -> bool {
        if self.method != operation_name {
            return false;
        }
        self.class == tag || self.class == tag.to_upper_camel_case()
    }
}

impl FromStr for MethodKey {
    type Err = GeneratorError;

    fn from_str(s: &str) -> GenResult<Self> {
        match s.split_once('.') {
            Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                Ok(MethodKey::new(class, method))
            }
            _ => Err(GeneratorError::InvalidMethodKey(s.to_string())),
        }
    }
}

impl TryFrom<String> for MethodKey {
    type Error = GeneratorError;

    fn try_from(s: String) -> GenResult<Self> {
        s.parse()
    }
}

impl From<MethodKey> for String {
    fn from(key: MethodKey) -> String {
        format!("{}.{}", key.class, key.method)
    }
}

impl std::fmt::Display for MethodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.class, self.method)
    }
}

/// Configuration for one generation run.
///
/// All fields have sensible defaults; see [`ClientSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientSettings {
    /// C# namespace to wrap the output in (file-scoped); none if unset.
    pub namespace: Option<String>,

    /// If set, client constructors accept one instance of this type and
    /// forward it to the base class.
    pub configuration_class_name: Option<String>,

    /// Base class attached verbatim to every generated client class.
    pub base_class_name: Option<String>,

    /// Base interface attached verbatim to every generated client interface.
    pub base_interface_name: Option<String>,

    /// Whether the constructor accepts an externally supplied `HttpClient`.
    /// When `false` the client owns a default transport instance.
    pub inject_transport: bool,

    /// Transport type constructed internally when injection is disabled.
    /// Defaults to `System.Net.Http.HttpClient`.
    pub custom_transport_type_name: Option<String>,

    /// Generated methods call an overridable request-construction hook
    /// instead of building the `HttpRequestMessage` inline.
    pub use_request_factory_method: bool,

    /// Operations whose array response is consumed as a stream.
    pub large_array_response_methods: BTreeSet<MethodKey>,

    /// Operations whose array request body is supplied as a stream.
    pub large_array_request_methods: BTreeSet<MethodKey>,

    /// Return a status/header-carrying wrapper instead of the bare payload.
    pub wrap_responses: bool,

    /// Whether client classes are built at all.
    pub generate_classes: bool,
    /// Whether built client classes are omitted from the final text.
    pub suppress_class_output: bool,
    /// Whether client interfaces are built at all.
    pub generate_interfaces: bool,
    /// Whether built client interfaces are omitted from the final text.
    pub suppress_interface_output: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            namespace: None,
            configuration_class_name: None,
            base_class_name: None,
            base_interface_name: None,
            inject_transport: true,
            custom_transport_type_name: None,
            use_request_factory_method: false,
            large_array_response_methods: BTreeSet::new(),
            large_array_request_methods: BTreeSet::new(),
            wrap_responses: false,
            generate_classes: true,
            suppress_class_output: false,
            generate_interfaces: false,
            suppress_interface_output: false,
        }
    }
}

impl ClientSettings {
    /// Parses settings from a JSON string.
    pub fn from_json(json: &str) -> GenResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| GeneratorError::General(format!("Failed to parse settings JSON: {}", e)))
    }

    /// Parses settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> GenResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| GeneratorError::General(format!("Failed to parse settings YAML: {}", e)))
    }

    /// Whether the given operation is in the large-array-response set.
    pub fn streams_response(&self, tag: &str, operation_name: &str) -> bool {
        self.large_array_response_methods
            .iter()
            .any(|k| k.matches(tag, operation_name))
    }

    /// Whether the given operation is in the large-array-request set.
    pub fn streams_request(&self, tag: &str, operation_name: &str) -> bool {
        self.large_array_request_methods
            .iter()
            .any(|k| k.matches(tag, operation_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_key_parse() {
        let key: MethodKey = "Bar.GetPeople".parse().unwrap();
        assert_eq!(key.class, "Bar");
        assert_eq!(key.method, "GetPeople");
        assert_eq!(key.to_string(), "Bar.GetPeople");
    }

    #[test]
    fn test_method_key_rejects_malformed() {
        assert!("NoDot".parse::<MethodKey>().is_err());
        assert!(".Leading".parse::<MethodKey>().is_err());
        assert!("Trailing.".parse::<MethodKey>().is_err());
    }

    #[test]
    fn test_method_key_matches_camelized_tag() {
        let key = MethodKey::new("Bar", "GetPeople");
        assert!(key.matches("Bar", "GetPeople"));
        assert!(key.matches("bar", "GetPeople"));
        assert!(!key.matches("bar", "GetPerson"));
        assert!(!key.matches("Baz", "GetPeople"));
    }

    #[test]
    fn test_defaults() {
        let s = ClientSettings::default();
        assert!(s.inject_transport);
        assert!(s.generate_classes);
        assert!(!s.generate_interfaces);
        assert!(!s.wrap_responses);
        assert!(s.large_array_response_methods.is_empty());
    }

    #[test]
    fn test_from_json_parses_keys_eagerly() {
        let s = ClientSettings::from_json(
            r#"{
                "wrapResponses": true,
                "largeArrayResponseMethods": ["Bar.GetPeople", "Foo.List"]
            }"#,
        )
        .unwrap();
        assert!(s.wrap_responses);
        assert!(s.streams_response("Bar", "GetPeople"));
        assert!(s.streams_response("Foo", "List"));
        assert!(!s.streams_response("Bar", "List"));
    }

    #[test]
    fn test_from_json_rejects_malformed_key() {
        let res = ClientSettings::from_json(r#"{"largeArrayRequestMethods": ["NotAKey"]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_from_yaml() {
        let s = ClientSettings::from_yaml(
            "injectTransport: false\ncustomTransportTypeName: MyHttpClient\n",
        )
        .unwrap();
        assert!(!s.inject_transport);
        assert_eq!(s.custom_transport_type_name.as_deref(), Some("MyHttpClient"));
    }
}
