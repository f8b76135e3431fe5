use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::error::ConfigurationError;
use crate::resolver::{ScopeChain, ScopeRef};

/// Term name to target mapping published inside `@context`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermTable {
    entries: IndexMap<String, String>,
}

impl TermTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terms declared by a single scope, validated in isolation.
    pub fn from_scope(scope: &ScopeRef<'_>) -> Result<Self, ConfigurationError> {
        let metadata = scope.metadata();
        let mut table = TermTable::new();

        match (&metadata.terms, &metadata.term) {
            (Some(_), Some(_)) => {
                return Err(ConfigurationError::ConflictingTermDeclarations {
                    scope: scope.describe(),
                });
            }
            (Some(terms), None) => {
                for term in terms {
                    match table.entries.entry(term.name.clone()) {
                        Entry::Occupied(_) => {
                            return Err(ConfigurationError::DuplicateTerm {
                                scope: scope.describe(),
                                term: term.name.clone(),
                            });
                        }
                        Entry::Vacant(slot) => {
                            slot.insert(term.target.clone());
                        }
                    }
                }
            }
            (None, Some(term)) => {
                table.insert(&term.name, &term.target);
            }
            (None, None) => {}
        }

        Ok(table)
    }

    pub fn insert(&mut self, name: &str, target: &str) {
        self.entries.insert(name.to_string(), target.to_string());
    }

    /// Overlay `other` on top of `self`; `other` wins on name collisions.
    pub fn merge(&mut self, other: TermTable) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Merge package, class and mixin terms, later scopes overriding earlier ones.
pub fn build(chain: &ScopeChain<'_>) -> Result<TermTable, ConfigurationError> {
    let mut merged = TermTable::new();
    for scope in chain.scopes() {
        merged.merge(TermTable::from_scope(&scope)?);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ScopeKind, ScopeMetadata, TermDefinition};

    fn terms(pairs: &[(&str, &str)]) -> ScopeMetadata {
        ScopeMetadata::new().with_terms(pairs.iter().map(|(n, t)| TermDefinition::new(*n, *t)))
    }

    // === from_scope Tests ===

    #[test]
    fn single_term_yields_one_entry() {
        let meta = ScopeMetadata::new().with_term("startDate", "http://schema.org/startDate");
        let table = TermTable::from_scope(&ScopeRef::new(ScopeKind::Class, "e::Event", &meta)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("startDate"), Some("http://schema.org/startDate"));
    }

    #[test]
    fn term_and_terms_on_one_scope_conflict() {
        let meta = terms(&[("a", "X")]).with_term("b", "Y");
        let err = TermTable::from_scope(&ScopeRef::new(ScopeKind::Class, "e::Event", &meta)).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::ConflictingTermDeclarations {
                scope: "class e::Event".to_string()
            }
        );
    }

    #[test]
    fn duplicate_name_within_list_is_rejected() {
        let meta = terms(&[("n", "http://a/"), ("n", "http://b/")]);
        let err = TermTable::from_scope(&ScopeRef::new(ScopeKind::Package, "events", &meta)).unwrap_err();
        match err {
            ConfigurationError::DuplicateTerm { scope, term } => {
                assert_eq!(scope, "package events");
                assert_eq!(term, "n");
            }
            other => panic!("Expected DuplicateTerm, got: {:?}", other),
        }
    }

    #[test]
    fn same_target_under_different_names_is_allowed() {
        let meta = terms(&[("a", "http://same/"), ("b", "http://same/")]);
        let table = TermTable::from_scope(&ScopeRef::new(ScopeKind::Mixin, "e::M", &meta)).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn scope_without_terms_is_empty() {
        let meta = ScopeMetadata::new().with_vocab("http://example.org/");
        let table = TermTable::from_scope(&ScopeRef::new(ScopeKind::Class, "e::Event", &meta)).unwrap();
        assert!(table.is_empty());
    }

    // === build Tests ===

    #[test]
    fn class_terms_override_package_terms() {
        let package = terms(&[("a", "X"), ("b", "Y")]);
        let class = terms(&[("b", "Z")]);
        let chain = ScopeChain::new(
            Some(ScopeRef::new(ScopeKind::Package, "p", &package)),
            Some(ScopeRef::new(ScopeKind::Class, "p::C", &class)),
            None,
        );
        let table = build(&chain).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some("X"));
        assert_eq!(table.get("b"), Some("Z"));
    }

    #[test]
    fn mixin_terms_override_class_terms() {
        let class = ScopeMetadata::new().with_term("b", "Z");
        let mixin = terms(&[("b", "W"), ("c", "V")]);
        let chain = ScopeChain::new(
            None,
            Some(ScopeRef::new(ScopeKind::Class, "p::C", &class)),
            Some(ScopeRef::new(ScopeKind::Mixin, "p::M", &mixin)),
        );
        let table = build(&chain).unwrap();
        assert_eq!(table.get("b"), Some("W"));
        assert_eq!(table.get("c"), Some("V"));
    }

    #[test]
    fn collisions_across_scopes_are_not_errors() {
        let package = terms(&[("n", "A")]);
        let class = terms(&[("n", "B")]);
        let mixin = terms(&[("n", "C")]);
        let chain = ScopeChain::new(
            Some(ScopeRef::new(ScopeKind::Package, "p", &package)),
            Some(ScopeRef::new(ScopeKind::Class, "p::C", &class)),
            Some(ScopeRef::new(ScopeKind::Mixin, "p::M", &mixin)),
        );
        assert_eq!(build(&chain).unwrap().get("n"), Some("C"));
    }

    #[test]
    fn invalid_scope_fails_the_whole_build() {
        let package = terms(&[("a", "X")]);
        let class = terms(&[("d", "1"), ("d", "2")]);
        let chain = ScopeChain::new(
            Some(ScopeRef::new(ScopeKind::Package, "p", &package)),
            Some(ScopeRef::new(ScopeKind::Class, "p::C", &class)),
            None,
        );
        assert!(build(&chain).is_err());
    }
}
