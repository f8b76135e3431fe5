use serde_json::{Map, Value};

use crate::error::HydraBuildError;
use crate::models::*;

/// Turns one manifest block into a [`ParsedScope`].
///
/// Accepted keys depend on the scope kind: packages take `@vocab`, `@term` and
/// `@terms`; mixins add `@expose`; classes add `@package`, `@fields` and
/// `@accessors` on top of that.
pub struct ManifestParser;

impl ManifestParser {
    pub fn parse(source: &ScopeSource, body: &Value) -> Result<ParsedScope, HydraBuildError> {
        let map = body
            .as_object()
            .ok_or_else(|| Self::error(source, "manifest body must be a JSON object"))?;

        let mut scope = ParsedScope::empty(source.clone());
        for (key, value) in map {
            match key.as_str() {
                "@vocab" => scope.vocab = Some(Self::string(source, key, value)?),
                "@expose" => {
                    Self::require_not_package(source, key)?;
                    scope.expose = Some(Self::string(source, key, value)?);
                }
                "@term" => scope.term = Some(Self::term(source, value)?),
                "@terms" => {
                    let items = value
                        .as_array()
                        .ok_or_else(|| Self::error(source, "'@terms' must be an array of term objects"))?;
                    let terms = items
                        .iter()
                        .map(|item| Self::term(source, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    scope.terms = Some(terms);
                }
                "@package" => {
                    Self::require_class(source, key)?;
                    scope.package = Some(Self::string(source, key, value)?);
                }
                "@fields" => {
                    Self::require_class(source, key)?;
                    scope.fields = Self::members(source, key, value)?;
                }
                "@accessors" => {
                    Self::require_class(source, key)?;
                    scope.accessors = Self::members(source, key, value)?;
                }
                other => {
                    return Err(Self::error(source, &format!("unknown key '{}'", other)));
                }
            }
        }
        Ok(scope)
    }

    fn term(source: &ScopeSource, value: &Value) -> Result<TermDeclaration, HydraBuildError> {
        let map = value
            .as_object()
            .ok_or_else(|| Self::error(source, "a term must be an object with 'define' and 'as'"))?;
        if let Some(extra) = map.keys().find(|k| *k != "define" && *k != "as") {
            return Err(Self::error(source, &format!("unknown term key '{}'", extra)));
        }
        Ok(TermDeclaration {
            define: Self::required_string(source, map, "define")?,
            target: Self::required_string(source, map, "as")?,
        })
    }

    fn members(
        source: &ScopeSource,
        key: &str,
        value: &Value,
    ) -> Result<Vec<MemberDeclaration>, HydraBuildError> {
        let map = value.as_object().ok_or_else(|| {
            Self::error(source, &format!("'{}' must map member names to a string or null", key))
        })?;
        map.iter()
            .map(|(name, expose)| {
                let expose = match expose {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    _ => {
                        return Err(Self::error(
                            source,
                            &format!("exposure of '{}' in '{}' must be a string or null", name, key),
                        ));
                    }
                };
                Ok(MemberDeclaration {
                    name: name.clone(),
                    expose,
                })
            })
            .collect()
    }

    fn required_string(
        source: &ScopeSource,
        map: &Map<String, Value>,
        key: &str,
    ) -> Result<String, HydraBuildError> {
        match map.get(key) {
            Some(value) => Self::string(source, key, value),
            None => Err(Self::error(source, &format!("term is missing '{}'", key))),
        }
    }

    fn string(source: &ScopeSource, key: &str, value: &Value) -> Result<String, HydraBuildError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Self::error(source, &format!("'{}' must be a string", key)))
    }

    fn require_class(source: &ScopeSource, key: &str) -> Result<(), HydraBuildError> {
        match source {
            ScopeSource::Class { .. } => Ok(()),
            _ => Err(Self::error(source, &format!("'{}' is only allowed on classes", key))),
        }
    }

    fn require_not_package(source: &ScopeSource, key: &str) -> Result<(), HydraBuildError> {
        match source {
            ScopeSource::Package { .. } => {
                Err(Self::error(source, &format!("'{}' is not allowed on packages", key)))
            }
            _ => Ok(()),
        }
    }

    fn error(source: &ScopeSource, message: &str) -> HydraBuildError {
        HydraBuildError::Parse {
            scope: source.describe(),
            message: message.to_string(),
        }
    }
}
