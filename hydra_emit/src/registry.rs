use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::HydraError;
use crate::metadata::*;
use crate::resolver::{ScopeChain, ScopeRef};

/// Decides whether a bean property reaches the output.
pub trait PropertyFilter: Send + Sync {
    fn include(&self, property: &str) -> bool;
}

impl<F> PropertyFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn include(&self, property: &str) -> bool {
        self(property)
    }
}

struct MixinEntry {
    mixin: BeanType,
    scope: ScopeMetadata,
}

/// Declared members of a bean, as seen by the context emitter.
#[derive(Debug, Clone, Copy)]
pub struct BeanInfo<'a> {
    fields: &'a [MemberMetadata],
    accessors: &'a [MemberMetadata],
}

impl<'a> BeanInfo<'a> {
    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &'a [MemberMetadata] {
        self.fields
    }

    /// Read accessors, ordered by property name.
    pub fn accessors(&self) -> Vec<&'a MemberMetadata> {
        let mut accessors: Vec<&MemberMetadata> = self.accessors.iter().collect();
        accessors.sort_by(|a, b| a.name.cmp(&b.name));
        accessors
    }
}

/// Process-wide, read-only JSON-LD metadata, assembled at startup.
#[derive(Default)]
pub struct MetadataRegistry {
    packages: HashMap<String, ScopeMetadata>,
    classes: HashMap<TypeId, ClassMetadata>,
    mixins: HashMap<TypeId, MixinEntry>,
    filters: HashMap<String, Arc<dyn PropertyFilter>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_package(&mut self, name: impl Into<String>, scope: ScopeMetadata) -> &mut Self {
        self.packages.insert(name.into(), scope);
        self
    }

    pub fn register_class<T: ?Sized + 'static>(&mut self, metadata: ClassMetadata) -> &mut Self {
        self.classes.insert(TypeId::of::<T>(), metadata);
        self
    }

    /// Attach `M` as the mixin of `T`; its declarations take precedence over `T`'s own.
    pub fn register_mixin<T: ?Sized + 'static, M: ?Sized + 'static>(
        &mut self,
        scope: ScopeMetadata,
    ) -> &mut Self {
        self.mixins.insert(
            TypeId::of::<T>(),
            MixinEntry {
                mixin: BeanType::of::<M>(),
                scope,
            },
        );
        self
    }

    pub fn register_filter(
        &mut self,
        id: impl Into<String>,
        filter: impl PropertyFilter + 'static,
    ) -> &mut Self {
        self.filters.insert(id.into(), Arc::new(filter));
        self
    }

    pub fn class(&self, bean: BeanType) -> Option<&ClassMetadata> {
        self.classes.get(&bean.id())
    }

    pub fn package(&self, name: &str) -> Option<&ScopeMetadata> {
        self.packages.get(name)
    }

    pub fn find_mixin_for(&self, bean: BeanType) -> Option<BeanType> {
        self.mixins.get(&bean.id()).map(|entry| entry.mixin)
    }

    pub fn filter(&self, id: &str) -> Result<&dyn PropertyFilter, HydraError> {
        self.filters
            .get(id)
            .map(|f| f.as_ref())
            .ok_or_else(|| HydraError::UnknownFilter(id.to_string()))
    }

    /// Package name that applies to `bean`.
    pub fn package_of(&self, bean: BeanType) -> &str {
        self.class(bean)
            .and_then(|c| c.package.as_deref())
            .unwrap_or(bean.module_path())
    }

    pub fn introspect(&self, bean: BeanType) -> BeanInfo<'_> {
        match self.class(bean) {
            Some(class) => BeanInfo {
                fields: &class.fields,
                accessors: &class.accessors,
            },
            None => BeanInfo {
                fields: &[],
                accessors: &[],
            },
        }
    }

    /// Package, class and mixin scopes of `bean`, lowest precedence first.
    pub fn scope_chain(&self, bean: BeanType) -> ScopeChain<'_> {
        let package = self
            .packages
            .get_key_value(self.package_of(bean))
            .map(|(name, scope)| ScopeRef::new(ScopeKind::Package, name, scope));
        let class = self
            .class(bean)
            .map(|c| ScopeRef::new(ScopeKind::Class, bean.type_name(), &c.scope));
        let mixin = self
            .mixins
            .get(&bean.id())
            .map(|entry| ScopeRef::new(ScopeKind::Mixin, entry.mixin.type_name(), &entry.scope));
        ScopeChain::new(package, class, mixin)
    }
}

impl fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataRegistry")
            .field("packages", &self.packages.len())
            .field("classes", &self.classes.len())
            .field("mixins", &self.mixins.len())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

static GLOBAL: OnceLock<MetadataRegistry> = OnceLock::new();

/// Install the process-wide registry used by [`Hydra`](crate::Hydra).
pub fn install(registry: MetadataRegistry) -> Result<&'static MetadataRegistry, HydraError> {
    let mut pending = Some(registry);
    let installed = GLOBAL.get_or_init(|| pending.take().unwrap_or_default());
    if pending.is_some() {
        tracing::warn!("metadata registry already installed, keeping the first one");
        return Err(HydraError::AlreadyInstalled);
    }
    tracing::debug!(registry = ?installed, "installed JSON-LD metadata registry");
    Ok(installed)
}

/// The installed registry. Falls back to an empty one, which freezes the global.
pub fn global() -> &'static MetadataRegistry {
    GLOBAL.get_or_init(|| {
        tracing::warn!("no metadata registry installed, serializing with defaults only");
        MetadataRegistry::new()
    })
}
