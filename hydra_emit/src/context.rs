use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ConfigurationError;
use crate::metadata::{BeanType, ExposedName, MemberKind};
use crate::registry::MetadataRegistry;
use crate::resolver::{AnnotationKind, ScopeChain};
use crate::terms::{self, TermTable};

/// Vocabulary used when no package, class or mixin declares one.
pub const DEFAULT_VOCAB: &str = "http://schema.org/";

/// The `@context` object of one bean, resolved fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationContext {
    vocab: String,
    terms: TermTable,
    exposed: Vec<ExposedName>,
}

impl SerializationContext {
    pub fn resolve(registry: &MetadataRegistry, bean: BeanType) -> Result<Self, ConfigurationError> {
        let chain = registry.scope_chain(bean);
        Self::from_chain(registry, bean, &chain)
    }

    pub(crate) fn from_chain(
        registry: &MetadataRegistry,
        bean: BeanType,
        chain: &ScopeChain<'_>,
    ) -> Result<Self, ConfigurationError> {
        let vocab = chain
            .resolve(AnnotationKind::Vocab)
            .unwrap_or(DEFAULT_VOCAB)
            .to_string();
        let terms = terms::build(chain)?;

        let info = registry.introspect(bean);
        let fields = info.fields().iter().map(|m| (MemberKind::Field, m));
        let accessors = info.accessors().into_iter().map(|m| (MemberKind::Accessor, m));
        let exposed = fields
            .chain(accessors)
            .filter_map(|(member, m)| {
                m.expose.as_ref().map(|name| ExposedName {
                    member,
                    property: m.name.clone(),
                    name: name.clone(),
                })
            })
            .collect();

        tracing::debug!(
            bean = bean.type_name(),
            vocab = %vocab,
            terms = terms.len(),
            "resolved JSON-LD context"
        );

        Ok(SerializationContext {
            vocab,
            terms,
            exposed,
        })
    }

    pub fn vocab(&self) -> &str {
        &self.vocab
    }

    pub fn terms(&self) -> &TermTable {
        &self.terms
    }

    /// Field exposures in declaration order, then accessor exposures.
    pub fn exposed_names(&self) -> &[ExposedName] {
        &self.exposed
    }
}

impl Serialize for SerializationContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.terms.len() + self.exposed.len()))?;
        map.serialize_entry("@vocab", &self.vocab)?;
        for (name, target) in self.terms.iter() {
            map.serialize_entry(name, target)?;
        }
        for exposed in &self.exposed {
            map.serialize_entry(&exposed.property, &exposed.name)?;
        }
        map.end()
    }
}
