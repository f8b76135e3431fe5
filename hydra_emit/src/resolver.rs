//! Precedence resolution over the package / class / mixin scope chain.

use crate::metadata::{ScopeKind, ScopeMetadata};

/// Single-valued declarations that resolve to the highest-precedence scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Vocab,
    TypeExposure,
}

impl AnnotationKind {
    fn applies_to(self, kind: ScopeKind) -> bool {
        match self {
            AnnotationKind::Vocab => true,
            AnnotationKind::TypeExposure => kind != ScopeKind::Package,
        }
    }

    fn read(self, scope: &ScopeMetadata) -> Option<&str> {
        match self {
            AnnotationKind::Vocab => scope.vocab.as_deref(),
            AnnotationKind::TypeExposure => scope.expose.as_deref(),
        }
    }
}

/// One scope of the chain with the name it is reported under.
#[derive(Debug, Clone, Copy)]
pub struct ScopeRef<'a> {
    kind: ScopeKind,
    name: &'a str,
    metadata: &'a ScopeMetadata,
}

impl<'a> ScopeRef<'a> {
    pub fn new(kind: ScopeKind, name: &'a str, metadata: &'a ScopeMetadata) -> Self {
        ScopeRef {
            kind,
            name,
            metadata,
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn metadata(&self) -> &'a ScopeMetadata {
        self.metadata
    }

    /// Human-readable identity used in error messages, e.g. `class demo::Event`.
    pub fn describe(&self) -> String {
        format!("{} {}", self.kind, self.name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeChain<'a> {
    package: Option<ScopeRef<'a>>,
    class: Option<ScopeRef<'a>>,
    mixin: Option<ScopeRef<'a>>,
}

impl<'a> ScopeChain<'a> {
    pub fn new(
        package: Option<ScopeRef<'a>>,
        class: Option<ScopeRef<'a>>,
        mixin: Option<ScopeRef<'a>>,
    ) -> Self {
        ScopeChain {
            package,
            class,
            mixin,
        }
    }

    /// Present scopes, lowest precedence first.
    pub fn scopes(&self) -> impl DoubleEndedIterator<Item = ScopeRef<'a>> + use<'a> {
        [self.package, self.class, self.mixin].into_iter().flatten()
    }

    pub fn resolve(&self, kind: AnnotationKind) -> Option<&'a str> {
        self.scopes()
            .rev()
            .filter(|scope| kind.applies_to(scope.kind))
            .find_map(|scope| kind.read(scope.metadata))
    }
}
