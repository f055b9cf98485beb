#![deny(missing_docs)]

//! # Client Surface Assembler
//!
//! Groups compiled methods by tag into one [`ClassDescriptor`] per logical
//! client, computes constructor shape and base-type references from the
//! settings, applies class/interface generation gating, and records which
//! auxiliary support types the run requires.
//!
//! Grouping preserves document order (first appearance of a tag fixes its
//! position) so regenerated output stays diff-stable.

use crate::compiler::{compile, AuxiliaryType, MethodDescriptor};
use crate::document::ApiDocument;
use crate::error::{GenResult, GeneratorError};
use crate::sanitize::{sanitize, IdentifierRole};
use crate::settings::ClientSettings;
use heck::ToUpperCamelCase;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};

/// Default transport type when none is configured.
pub const DEFAULT_TRANSPORT_TYPE: &str = "System.Net.Http.HttpClient";

/// How a generated client obtains its configuration and transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructorShape {
    /// Constructor accepts one instance of the named configuration type and
    /// forwards it to the base class (when one is configured). The transport
    /// follows as a second parameter when injection is enabled, otherwise the
    /// client constructs the named owned transport itself.
    Configuration {
        /// The configured configuration-class name.
        class_name: String,
        /// Owned transport type to instantiate; `None` when injected.
        owned_transport: Option<String>,
    },
    /// Constructor accepts an externally supplied transport object.
    InjectedTransport,
    /// The client constructs and owns a default transport instance.
    OwnedTransport {
        /// Concrete transport type to instantiate.
        transport_type: String,
    },
}

/// The assembled surface of one logical client (one tag).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    /// The originating tag.
    pub tag: String,
    /// Generated class name (e.g. `BarClient`).
    pub class_name: String,
    /// Generated interface name (e.g. `IBarClient`).
    pub interface_name: String,
    /// Compiled methods in document order.
    pub methods: Vec<MethodDescriptor>,
    /// Base class reference, attached verbatim if configured.
    pub base_class: Option<String>,
    /// Base interface reference, attached verbatim if configured.
    pub base_interface: Option<String>,
    /// Constructor shape for the class declaration.
    pub constructor: ConstructorShape,
    /// Whether the class declaration is built at all.
    pub emit_class: bool,
    /// Whether a built class declaration is omitted from final text.
    pub suppress_class: bool,
    /// Whether the interface declaration is built at all.
    pub emit_interface: bool,
    /// Whether a built interface declaration is omitted from final text.
    pub suppress_interface: bool,
    /// Whether methods call the overridable request-construction hook.
    pub uses_request_factory: bool,
    /// Union of the auxiliary types required by this client's methods.
    pub auxiliaries: BTreeSet<AuxiliaryType>,
}

impl ClassDescriptor {
    /// Whether the class text reaches the final output.
    pub fn class_visible(&self) -> bool {
        self.emit_class && !self.suppress_class
    }

    /// Whether the interface text reaches the final output.
    pub fn interface_visible(&self) -> bool {
        self.emit_interface && !self.suppress_interface
    }
}

/// Assembles the whole document into class descriptors, one per tag.
///
/// Fails on method-name collisions within a tag group; the compiler already
/// guards parameter collisions per operation.
pub fn assemble(
    document: &ApiDocument,
    settings: &ClientSettings,
) -> GenResult<Vec<ClassDescriptor>> {
    let mut groups: IndexMap<String, Vec<MethodDescriptor>> = IndexMap::new();
    for operation in &document.operations {
        let method = compile(operation, settings)?;
        groups.entry(operation.tag.clone()).or_default().push(method);
    }

    let constructor = constructor_shape(settings);
    let mut descriptors = Vec::with_capacity(groups.len());

    for (tag, methods) in groups {
        let class_name = sanitize(
            &format!("{}Client", tag.to_upper_camel_case()),
            IdentifierRole::Type,
        );

        let mut seen = HashSet::new();
        for method in &methods {
            if !seen.insert(method.name.clone()) {
                return Err(GeneratorError::DuplicateMethod {
                    class: class_name,
                    method: method.name.clone(),
                });
            }
        }

        let auxiliaries = methods
            .iter()
            .flat_map(|m| m.required_auxiliaries.iter().copied())
            .collect();

        descriptors.push(ClassDescriptor {
            interface_name: format!("I{}", class_name),
            tag,
            class_name,
            methods,
            base_class: settings.base_class_name.clone(),
            base_interface: settings.base_interface_name.clone(),
            constructor: constructor.clone(),
            emit_class: settings.generate_classes,
            suppress_class: settings.suppress_class_output,
            emit_interface: settings.generate_interfaces,
            suppress_interface: settings.suppress_interface_output,
            uses_request_factory: settings.use_request_factory_method,
            auxiliaries,
        });
    }

    log::debug!("Assembled {} client descriptor(s)", descriptors.len());
    Ok(descriptors)
}

fn constructor_shape(settings: &ClientSettings) -> ConstructorShape {
    let owned_transport = || {
        settings
            .custom_transport_type_name
            .clone()
            .unwrap_or_else(|| DEFAULT_TRANSPORT_TYPE.to_string())
    };

    if let Some(class_name) = &settings.configuration_class_name {
        return ConstructorShape::Configuration {
            class_name: class_name.clone(),
            owned_transport: (!settings.inject_transport).then(owned_transport),
        };
    }
    if settings.inject_transport {
        return ConstructorShape::InjectedTransport;
    }
    ConstructorShape::OwnedTransport {
        transport_type: owned_transport(),
    }
}
