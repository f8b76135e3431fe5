//! The bean serializer that wraps serde field output with `@context` and `@type`.

use std::ops::{Deref, DerefMut};

use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;
use serde_json::value::RawValue;

use crate::context::SerializationContext;
use crate::error::HydraError;
use crate::fields::{self, FieldEntries};
use crate::metadata::BeanType;
use crate::registry::{self, MetadataRegistry};
use crate::type_name;

/// Marks a bean as carrying an object identity property.
///
/// Writing the identity is left to the bean's own `Serialize` impl; here the
/// writer only rules out array output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdWriter {
    pub property: String,
}

impl ObjectIdWriter {
    pub fn new(property: impl Into<String>) -> Self {
        ObjectIdWriter {
            property: property.into(),
        }
    }
}

/// Capabilities of the underlying bean serializer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeanFeatures {
    pub object_id_writer: Option<ObjectIdWriter>,
    /// A catch-all property writer spreads extra entries into the object.
    pub any_getter: bool,
    pub filter_id: Option<String>,
    pub ignored: Vec<String>,
}

impl BeanFeatures {
    /// Array output is only possible for beans without identity, catch-all or filter.
    pub fn supports_array(&self) -> bool {
        self.object_id_writer.is_none() && !self.any_getter && self.filter_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shape {
    /// `{ "@context": .., "@type": .., fields.. }`
    #[default]
    Object,
    /// `[ value, value, .. ]`, without context or type.
    Array,
    /// Context, type and fields written into an enclosing object.
    Unwrapped,
}

/// Progress of one serialize call. Phases are visited strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    NotStarted,
    ContextWritten,
    TypeWritten,
    FieldsWritten,
    Closed,
}

impl Phase {
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::NotStarted => Some(Phase::ContextWritten),
            Phase::ContextWritten => Some(Phase::TypeWritten),
            Phase::TypeWritten => Some(Phase::FieldsWritten),
            Phase::FieldsWritten => Some(Phase::Closed),
            Phase::Closed => None,
        }
    }
}

struct Progress {
    bean: &'static str,
    phase: Phase,
}

impl Progress {
    fn new(bean: BeanType) -> Self {
        Progress {
            bean: bean.type_name(),
            phase: Phase::NotStarted,
        }
    }

    fn advance(&mut self, to: Phase) {
        debug_assert_eq!(self.phase.next(), Some(to), "phase skipped for {}", self.bean);
        tracing::trace!(bean = self.bean, from = ?self.phase, to = ?to, "hydra serializer phase");
        self.phase = to;
    }
}

/// Everything an object-shaped bean writes, resolved before the first byte goes out.
struct PreparedObject<'r> {
    bean: BeanType,
    context: SerializationContext,
    type_name: &'r str,
    fields: FieldEntries,
}

impl PreparedObject<'_> {
    fn write_entries<M: SerializeMap>(&self, progress: &mut Progress, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("@context", &self.context)?;
        progress.advance(Phase::ContextWritten);
        map.serialize_entry("@type", self.type_name)?;
        progress.advance(Phase::TypeWritten);
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        progress.advance(Phase::FieldsWritten);
        Ok(())
    }
}

enum Prepared<'r> {
    Object(PreparedObject<'r>),
    Array(Vec<Box<RawValue>>),
}

impl Serialize for Prepared<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Prepared::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Prepared::Object(object) => {
                // An unwrapping serializer still opens a map here; under
                // `#[serde(flatten)]` the enclosing object owns the braces.
                let mut progress = Progress::new(object.bean);
                let mut map = serializer.serialize_map(None)?;
                object.write_entries(&mut progress, &mut map)?;
                progress.advance(Phase::Closed);
                map.end()
            }
        }
    }
}

/// JSON-LD aware bean serializer.
///
/// Field output is delegated to the bean's own [`Serialize`] impl; this type
/// only adds `@context` and `@type` in front of it and decides the brackets.
#[derive(Debug, Clone)]
pub struct HydraSerializer<'r> {
    registry: &'r MetadataRegistry,
    features: BeanFeatures,
    shape: Shape,
}

impl<'r> HydraSerializer<'r> {
    pub fn new(registry: &'r MetadataRegistry) -> Self {
        HydraSerializer {
            registry,
            features: BeanFeatures::default(),
            shape: Shape::Object,
        }
    }

    pub fn with_features(mut self, features: BeanFeatures) -> Self {
        self.features = features;
        self.settle_shape()
    }

    pub fn with_object_id_writer(mut self, writer: ObjectIdWriter) -> Self {
        self.features.object_id_writer = Some(writer);
        self.settle_shape()
    }

    pub fn with_any_getter(mut self) -> Self {
        self.features.any_getter = true;
        self.settle_shape()
    }

    pub fn with_filter_id(mut self, id: impl Into<String>) -> Self {
        self.features.filter_id = Some(id.into());
        self.settle_shape()
    }

    pub fn with_ignorals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.ignored.extend(names.into_iter().map(Into::into));
        self
    }

    /// Switch to array output, or stay an object serializer when the bean's
    /// features rule arrays out.
    pub fn as_array_serializer(mut self) -> Self {
        self.shape = Shape::Array;
        self.settle_shape()
    }

    /// Drop back to object form once a feature rules arrays out.
    fn settle_shape(mut self) -> Self {
        if self.shape == Shape::Array && !self.features.supports_array() {
            tracing::debug!(features = ?self.features, "array form not supported, using object form");
            self.shape = Shape::Object;
        }
        self
    }

    pub fn unwrapping_serializer(mut self) -> Self {
        self.shape = Shape::Unwrapped;
        self
    }

    pub fn is_unwrapping(&self) -> bool {
        self.shape == Shape::Unwrapped
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn features(&self) -> &BeanFeatures {
        &self.features
    }

    pub fn registry(&self) -> &'r MetadataRegistry {
        self.registry
    }

    pub fn serialize<T, S>(&self, bean: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize + 'static,
        S: Serializer,
    {
        self.prepare(bean).map_err(S::Error::custom)?.serialize(serializer)
    }

    /// Write context, type and fields of `bean` into an object the caller owns.
    pub fn serialize_unwrapped<T, M>(&self, bean: &T, map: &mut M) -> Result<(), M::Error>
    where
        T: Serialize + 'static,
        M: SerializeMap,
    {
        let object = self.prepare_object(bean).map_err(M::Error::custom)?;
        let mut progress = Progress::new(object.bean);
        object.write_entries(&mut progress, map)?;
        progress.advance(Phase::Closed);
        Ok(())
    }

    pub fn bind<'s, T>(&'s self, bean: &'s T) -> Bound<'s, 'r, T> {
        Bound {
            serializer: self,
            bean,
        }
    }

    /// Like [`to_string`](Self::to_string), but into a [`Value`].
    ///
    /// A `Value` object cannot hold duplicate keys, so a bean whose fields
    /// carry their own `@context` or `@type` (a flattened [`Hydra`] field) is
    /// rejected instead of losing its metadata.
    pub fn to_value<T: Serialize + 'static>(&self, bean: &T) -> Result<Value, HydraError> {
        let prepared = self.prepare(bean)?;
        if let Prepared::Object(object) = &prepared
            && let Some((key, _)) = object.fields.iter().find(|(name, _)| name == "@context" || name == "@type")
        {
            return Err(HydraError::MetadataKeyCollision {
                type_name: object.bean.type_name().to_string(),
                key: key.clone(),
            });
        }
        Ok(serde_json::to_value(prepared)?)
    }

    pub fn to_string<T: Serialize + 'static>(&self, bean: &T) -> Result<String, HydraError> {
        Ok(serde_json::to_string(&self.prepare(bean)?)?)
    }

    pub fn to_string_pretty<T: Serialize + 'static>(&self, bean: &T) -> Result<String, HydraError> {
        Ok(serde_json::to_string_pretty(&self.prepare(bean)?)?)
    }

    fn prepare<T: Serialize + 'static>(&self, bean: &T) -> Result<Prepared<'r>, HydraError> {
        match self.shape {
            Shape::Array => {
                let fields = self.fields(BeanType::of::<T>(), bean)?;
                Ok(Prepared::Array(fields.into_iter().map(|(_, v)| v).collect()))
            }
            Shape::Object | Shape::Unwrapped => Ok(Prepared::Object(self.prepare_object(bean)?)),
        }
    }

    fn prepare_object<T: Serialize + 'static>(&self, bean: &T) -> Result<PreparedObject<'r>, HydraError> {
        let bean_type = BeanType::of::<T>();
        let chain = self.registry.scope_chain(bean_type);
        let context = SerializationContext::from_chain(self.registry, bean_type, &chain)?;
        let type_name = type_name::resolve(&chain, bean_type);
        let fields = self.fields(bean_type, bean)?;
        Ok(PreparedObject {
            bean: bean_type,
            context,
            type_name,
            fields,
        })
    }

    fn fields<T: Serialize>(&self, bean_type: BeanType, bean: &T) -> Result<FieldEntries, HydraError> {
        let mut fields = fields::collect(bean).map_err(|e| e.into_hydra(bean_type))?;
        if !self.features.ignored.is_empty() {
            fields.retain(|(name, _)| !self.features.ignored.iter().any(|i| i == name));
        }
        if let Some(id) = &self.features.filter_id {
            let filter = self.registry.filter(id)?;
            fields.retain(|(name, _)| filter.include(name));
        }
        Ok(fields)
    }
}

/// A bean paired with the serializer that writes it.
pub struct Bound<'s, 'r, T> {
    serializer: &'s HydraSerializer<'r>,
    bean: &'s T,
}

impl<T: Serialize + 'static> Serialize for Bound<'_, '_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.serializer.serialize(self.bean, serializer)
    }
}

/// Serializes the wrapped bean as JSON-LD through the installed registry.
///
/// Use it for nested beans; with `#[serde(flatten)]` the bean's context, type
/// and fields are merged into the enclosing object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hydra<T>(pub T);

impl<T> Hydra<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Hydra<T> {
    fn from(bean: T) -> Self {
        Hydra(bean)
    }
}

impl<T> Deref for Hydra<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Hydra<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Serialize + 'static> Serialize for Hydra<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        HydraSerializer::new(registry::global()).serialize(&self.0, serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ClassMetadata, ScopeMetadata, TermDefinition};
    use pretty_assertions::assert_eq;

    #[derive(serde::Serialize)]
    struct Event {
        name: String,
    }

    #[derive(serde::Serialize)]
    struct Ticket {
        code: String,
        seat: u32,
        holder: String,
    }

    #[derive(serde::Serialize)]
    struct Marker;

    struct TicketMixin;

    fn launch() -> Event {
        Event {
            name: "Launch".to_string(),
        }
    }

    fn ticket() -> Ticket {
        Ticket {
            code: "A-7".to_string(),
            seat: 12,
            holder: "Ada".to_string(),
        }
    }

    fn event_registry() -> MetadataRegistry {
        let mut registry = MetadataRegistry::new();
        registry
            .register_package("events", ScopeMetadata::new().with_vocab("http://example.org/"))
            .register_class::<Event>(
                ClassMetadata::new()
                    .in_package("events")
                    .with_term("startDate", "http://schema.org/startDate")
                    .with_field("name", Some("eventName")),
            );
        registry
    }

    // === Object Form Tests ===

    #[test]
    fn event_round_trip_matches_expected_document() {
        let registry = event_registry();
        let json = HydraSerializer::new(&registry).to_string(&launch()).unwrap();
        assert_eq!(
            json,
            r#"{"@context":{"@vocab":"http://example.org/","startDate":"http://schema.org/startDate","name":"eventName"},"@type":"Event","name":"Launch"}"#
        );
    }

    #[test]
    fn unannotated_bean_gets_schema_org_and_simple_name() {
        let registry = MetadataRegistry::new();
        let value = HydraSerializer::new(&registry).to_value(&ticket()).unwrap();
        assert_eq!(value["@context"], serde_json::json!({"@vocab": "http://schema.org/"}));
        assert_eq!(value["@type"], serde_json::json!("Ticket"));
        assert_eq!(value["seat"], serde_json::json!(12));
    }

    #[test]
    fn context_and_type_precede_fields() {
        let registry = MetadataRegistry::new();
        let value = HydraSerializer::new(&registry).to_value(&ticket()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["@context", "@type", "code", "seat", "holder"]);
    }

    #[test]
    fn mixin_exposure_names_the_type() {
        let mut registry = MetadataRegistry::new();
        registry
            .register_class::<Ticket>(ClassMetadata::new().with_expose("Reservation"))
            .register_mixin::<Ticket, TicketMixin>(ScopeMetadata::new().with_expose("EventReservation"));
        let value = HydraSerializer::new(&registry).to_value(&ticket()).unwrap();
        assert_eq!(value["@type"], serde_json::json!("EventReservation"));
    }

    #[test]
    fn unit_bean_has_no_fields() {
        let registry = MetadataRegistry::new();
        let json = HydraSerializer::new(&registry).to_string(&Marker).unwrap();
        assert_eq!(json, r#"{"@context":{"@vocab":"http://schema.org/"},"@type":"Marker"}"#);
    }

    #[derive(serde::Serialize)]
    struct Counter {
        id: u128,
        delta: i128,
    }

    #[test]
    fn wide_integers_match_plain_serde_json() {
        let registry = MetadataRegistry::new();
        let counter = Counter {
            id: u64::MAX as u128 + 1,
            delta: i64::MIN as i128 - 1,
        };
        let plain = serde_json::to_string(&counter).unwrap();
        assert_eq!(plain, r#"{"id":18446744073709551616,"delta":-9223372036854775809}"#);

        let json = HydraSerializer::new(&registry).to_string(&counter).unwrap();
        assert_eq!(
            json,
            r#"{"@context":{"@vocab":"http://schema.org/"},"@type":"Counter","id":18446744073709551616,"delta":-9223372036854775809}"#
        );
    }

    #[test]
    fn non_object_bean_is_rejected() {
        let registry = MetadataRegistry::new();
        let err = HydraSerializer::new(&registry).to_string(&42u32).unwrap_err();
        assert!(matches!(err, HydraError::NotAnObject { .. }));
    }

    // === Configuration Error Tests ===

    #[test]
    fn conflicting_terms_abort_with_configuration_error() {
        let mut registry = MetadataRegistry::new();
        registry.register_class::<Event>(
            ClassMetadata::new()
                .with_terms(vec![TermDefinition::new("a", "X")])
                .with_term("b", "Y"),
        );
        let err = HydraSerializer::new(&registry).to_string(&launch()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn duplicate_terms_abort_with_configuration_error() {
        let mut registry = MetadataRegistry::new();
        registry.register_class::<Event>(ClassMetadata::new().with_terms(vec![
            TermDefinition::new("n", "http://a/"),
            TermDefinition::new("n", "http://b/"),
        ]));
        let err = HydraSerializer::new(&registry).to_value(&launch()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn failing_bean_writes_nothing_through_serde() {
        let mut registry = MetadataRegistry::new();
        registry.register_class::<Event>(
            ClassMetadata::new()
                .with_terms(vec![TermDefinition::new("a", "X")])
                .with_term("b", "Y"),
        );
        let serializer = HydraSerializer::new(&registry);
        let bean = launch();
        let mut out = Vec::new();
        let result = serde_json::to_writer(&mut out, &serializer.bind(&bean));
        assert!(result.is_err());
        assert!(out.is_empty());
        assert!(result.unwrap_err().to_string().contains("either one or the other"));
    }

    // === Array Form Tests ===

    #[test]
    fn plain_bean_serializes_as_array_of_values() {
        let registry = MetadataRegistry::new();
        let serializer = HydraSerializer::new(&registry).as_array_serializer();
        assert_eq!(serializer.shape(), Shape::Array);
        assert_eq!(serializer.to_string(&ticket()).unwrap(), r#"["A-7",12,"Ada"]"#);
    }

    #[test]
    fn object_identity_refuses_array_form() {
        let registry = MetadataRegistry::new();
        let serializer = HydraSerializer::new(&registry)
            .with_object_id_writer(ObjectIdWriter::new("@id"))
            .as_array_serializer();
        assert_eq!(serializer.shape(), Shape::Object);

        let json = serializer.to_string(&ticket()).unwrap();
        assert!(json.starts_with(r#"{"@context":{"@vocab":"http://schema.org/"},"@type":"Ticket","#));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn any_getter_and_filter_refuse_array_form() {
        let registry = MetadataRegistry::new();
        let with_any = HydraSerializer::new(&registry).with_any_getter().as_array_serializer();
        assert_eq!(with_any.shape(), Shape::Object);

        let filtered = HydraSerializer::new(&registry).with_filter_id("public").as_array_serializer();
        assert_eq!(filtered.shape(), Shape::Object);
    }

    #[test]
    fn features_added_after_array_form_restore_object_form() {
        let registry = MetadataRegistry::new();
        let serializer = HydraSerializer::new(&registry)
            .as_array_serializer()
            .with_object_id_writer(ObjectIdWriter::new("@id"));
        assert_eq!(serializer.shape(), Shape::Object);
        let json = serializer.to_string(&ticket()).unwrap();
        assert!(json.starts_with(r#"{"@context":"#));

        let with_any = HydraSerializer::new(&registry).as_array_serializer().with_any_getter();
        assert_eq!(with_any.shape(), Shape::Object);

        let filtered = HydraSerializer::new(&registry).as_array_serializer().with_filter_id("public");
        assert_eq!(filtered.shape(), Shape::Object);

        let features = BeanFeatures {
            any_getter: true,
            ..BeanFeatures::default()
        };
        let replaced = HydraSerializer::new(&registry).as_array_serializer().with_features(features);
        assert_eq!(replaced.shape(), Shape::Object);
    }

    #[test]
    fn object_id_writer_leaves_fields_to_the_bean() {
        let registry = MetadataRegistry::new();
        let plain = HydraSerializer::new(&registry).to_string(&ticket()).unwrap();
        let with_id = HydraSerializer::new(&registry)
            .with_object_id_writer(ObjectIdWriter::new("code"))
            .to_string(&ticket())
            .unwrap();
        assert_eq!(plain, with_id);
    }

    #[test]
    fn ignorals_keep_array_form() {
        let registry = MetadataRegistry::new();
        let serializer = HydraSerializer::new(&registry)
            .as_array_serializer()
            .with_ignorals(["seat"]);
        assert_eq!(serializer.shape(), Shape::Array);
    }

    #[test]
    fn array_form_honours_ignorals() {
        let registry = MetadataRegistry::new();
        let serializer = HydraSerializer::new(&registry)
            .with_ignorals(["holder"])
            .as_array_serializer();
        assert_eq!(serializer.to_string(&ticket()).unwrap(), r#"["A-7",12]"#);
    }

    // === Ignorals and Filter Tests ===

    #[test]
    fn ignored_properties_are_dropped() {
        let registry = MetadataRegistry::new();
        let value = HydraSerializer::new(&registry)
            .with_ignorals(["holder", "seat"])
            .to_value(&ticket())
            .unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["@context", "@type", "code"]);
    }

    #[test]
    fn registered_filter_drops_properties() {
        let mut registry = MetadataRegistry::new();
        registry.register_filter("public", |name: &str| name != "holder");
        let value = HydraSerializer::new(&registry)
            .with_filter_id("public")
            .to_value(&ticket())
            .unwrap();
        assert!(value.get("holder").is_none());
        assert_eq!(value["code"], serde_json::json!("A-7"));
    }

    #[test]
    fn unknown_filter_id_fails() {
        let registry = MetadataRegistry::new();
        let err = HydraSerializer::new(&registry)
            .with_filter_id("missing")
            .to_value(&ticket())
            .unwrap_err();
        assert!(matches!(err, HydraError::UnknownFilter(_)));
    }

    // === Unwrapping Tests ===

    struct Envelope<'a> {
        serializer: &'a HydraSerializer<'a>,
        event: &'a Event,
    }

    impl Serialize for Envelope<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(None)?;
            map.serialize_entry("id", "urn:event:1")?;
            self.serializer.serialize_unwrapped(self.event, &mut map)?;
            map.end()
        }
    }

    #[test]
    fn unwrapped_bean_merges_into_enclosing_object() {
        let registry = event_registry();
        let serializer = HydraSerializer::new(&registry).unwrapping_serializer();
        assert!(serializer.is_unwrapping());

        let event = launch();
        let json = serde_json::to_string(&Envelope {
            serializer: &serializer,
            event: &event,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"id":"urn:event:1","@context":{"@vocab":"http://example.org/","startDate":"http://schema.org/startDate","name":"eventName"},"@type":"Event","name":"Launch"}"#
        );
    }

    // === Phase Tests ===

    #[test]
    fn phases_advance_strictly_in_order() {
        let mut phase = Phase::NotStarted;
        let mut visited = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            visited.push(next);
            phase = next;
        }
        assert_eq!(
            visited,
            vec![
                Phase::NotStarted,
                Phase::ContextWritten,
                Phase::TypeWritten,
                Phase::FieldsWritten,
                Phase::Closed
            ]
        );
    }

    #[test]
    fn bean_features_array_support() {
        assert!(BeanFeatures::default().supports_array());
        let features = BeanFeatures {
            object_id_writer: Some(ObjectIdWriter::new("@id")),
            ..BeanFeatures::default()
        };
        assert!(!features.supports_array());
    }
}
