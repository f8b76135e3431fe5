//! Declarative JSON-LD metadata attached to packages, classes, mixins and members.
//!
//! These values are the registry's stand-in for annotations: they are built once
//! at startup and only read during serialization.

use std::any::TypeId;
use std::fmt;

/// A single `name -> target` mapping published in `@context`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDefinition {
    pub name: String,
    pub target: String,
}

impl TermDefinition {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        TermDefinition {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// Declarations carried by one scope (a package, a class or a mixin).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeMetadata {
    pub vocab: Option<String>,
    /// Overrides the emitted `@type`. Only read on class and mixin scopes.
    pub expose: Option<String>,
    pub term: Option<TermDefinition>,
    pub terms: Option<Vec<TermDefinition>>,
}

impl ScopeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocab(mut self, uri: impl Into<String>) -> Self {
        self.vocab = Some(uri.into());
        self
    }

    pub fn with_expose(mut self, name: impl Into<String>) -> Self {
        self.expose = Some(name.into());
        self
    }

    pub fn with_term(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.term = Some(TermDefinition::new(name, target));
        self
    }

    pub fn with_terms<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = TermDefinition>,
    {
        self.terms = Some(terms.into_iter().collect());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Package,
    Class,
    Mixin,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Package => f.write_str("package"),
            ScopeKind::Class => f.write_str("class"),
            ScopeKind::Mixin => f.write_str("mixin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Accessor,
}

/// A declared field or read accessor of a bean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMetadata {
    pub name: String,
    pub expose: Option<String>,
}

impl MemberMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        MemberMetadata {
            name: name.into(),
            expose: None,
        }
    }

    pub fn exposed(name: impl Into<String>, expose: impl Into<String>) -> Self {
        MemberMetadata {
            name: name.into(),
            expose: Some(expose.into()),
        }
    }
}

/// An explicit context label for one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedName {
    pub member: MemberKind,
    pub property: String,
    pub name: String,
}

/// Registry entry for a bean type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMetadata {
    /// Package whose declarations apply; defaults to the type's module path.
    pub package: Option<String>,
    pub scope: ScopeMetadata,
    /// Declared fields, in declaration order.
    pub fields: Vec<MemberMetadata>,
    pub accessors: Vec<MemberMetadata>,
}

impl ClassMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_scope(mut self, scope: ScopeMetadata) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_vocab(mut self, uri: impl Into<String>) -> Self {
        self.scope = self.scope.with_vocab(uri);
        self
    }

    pub fn with_expose(mut self, name: impl Into<String>) -> Self {
        self.scope = self.scope.with_expose(name);
        self
    }

    pub fn with_term(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.scope = self.scope.with_term(name, target);
        self
    }

    pub fn with_terms<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = TermDefinition>,
    {
        self.scope = self.scope.with_terms(terms);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, expose: Option<&str>) -> Self {
        self.fields.push(MemberMetadata {
            name: name.into(),
            expose: expose.map(str::to_string),
        });
        self
    }

    pub fn with_accessor(mut self, name: impl Into<String>, expose: Option<&str>) -> Self {
        self.accessors.push(MemberMetadata {
            name: name.into(),
            expose: expose.map(str::to_string),
        });
        self
    }
}

/// Runtime identity of a bean type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeanType {
    id: TypeId,
    name: &'static str,
}

impl BeanType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        BeanType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `demo::events::Event`.
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// Last path segment without generic arguments, e.g. `Event`.
    pub fn simple_name(&self) -> &'static str {
        let path = self.path();
        match path.rsplit_once("::") {
            Some((_, simple)) => simple,
            None => path,
        }
    }

    /// Module path of the type, e.g. `demo::events`. Empty for root-level types.
    pub fn module_path(&self) -> &'static str {
        match self.path().rsplit_once("::") {
            Some((module, _)) => module,
            None => "",
        }
    }

    fn path(&self) -> &'static str {
        match self.name.find('<') {
            Some(idx) => &self.name[..idx],
            None => self.name,
        }
    }
}
