//! JSON-LD `@context` / `@type` emission for serde beans.
//!
//! Declarations (vocabulary, terms, exposed names) are kept in a
//! [`MetadataRegistry`] that is populated at startup, either by hand or from
//! code generated by `hydra_emit_build`. Serializing a bean resolves its
//! package, class and mixin declarations and writes
//!
//! ```text
//! { "@context": { "@vocab": .., terms.., exposed members.. }, "@type": .., fields.. }
//! ```
//!
//! where the fields are whatever the bean's own `Serialize` impl produces.

pub use serde;
pub use serde_json;

mod context;
mod error;
mod fields;
mod metadata;
mod registry;
mod resolver;
mod serializer;
mod terms;
mod type_name;

pub use context::{DEFAULT_VOCAB, SerializationContext};
pub use error::{ConfigurationError, HydraError, HydraResult};
pub use metadata::*;
pub use registry::{BeanInfo, MetadataRegistry, PropertyFilter, global, install};
pub use resolver::{AnnotationKind, ScopeChain, ScopeRef};
pub use serializer::{BeanFeatures, Bound, Hydra, HydraSerializer, ObjectIdWriter, Phase, Shape};
pub use terms::TermTable;

/// Resolve the `@type` value for `T` against `registry`.
pub fn type_name_of<T: ?Sized + 'static>(registry: &MetadataRegistry) -> &str {
    let bean = BeanType::of::<T>();
    type_name::resolve(&registry.scope_chain(bean), bean)
}

pub fn to_string<T: serde::Serialize + 'static>(registry: &MetadataRegistry, bean: &T) -> HydraResult<String> {
    HydraSerializer::new(registry).to_string(bean)
}

pub fn to_string_pretty<T: serde::Serialize + 'static>(
    registry: &MetadataRegistry,
    bean: &T,
) -> HydraResult<String> {
    HydraSerializer::new(registry).to_string_pretty(bean)
}

/// Serialize into a [`serde_json::Value`].
///
/// Fails with [`HydraError::MetadataKeyCollision`] for beans with a flattened
/// [`Hydra`] field, since a `Value` object cannot keep both `@context` entries.
pub fn to_value<T: serde::Serialize + 'static>(
    registry: &MetadataRegistry,
    bean: &T,
) -> HydraResult<serde_json::Value> {
    HydraSerializer::new(registry).to_value(bean)
}

/// Include a registry module generated by `hydra_emit_build` from `OUT_DIR`.
///
/// The argument must match the `@registry_name` used in `hydra_metadata!`.
///
/// ```ignore
/// mod generated {
///     hydra_emit::include_hydra!("event_metadata");
/// }
///
/// let mut registry = hydra_emit::MetadataRegistry::new();
/// generated::register(&mut registry);
/// ```
#[macro_export]
macro_rules! include_hydra {
    ($name: tt) => {
        include!(concat!(env!("OUT_DIR"), concat!("/", $name, ".rs")));
    };
}
