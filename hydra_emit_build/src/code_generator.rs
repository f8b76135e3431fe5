use proc_macro2::TokenStream;
use quote::quote;

use crate::error::HydraBuildError;
use crate::models::*;

/// Emits the registration code for a list of parsed manifest blocks.
///
/// The output defines `register(&mut MetadataRegistry)` and a convenience
/// `registry()` constructor. Type paths are resolved at the `include_hydra!`
/// site, so `crate::`-rooted paths are the safest choice.
pub struct CodeGenerator;

impl CodeGenerator {
    pub fn generate(registry_name: &str, scopes: &[ParsedScope]) -> Result<TokenStream, HydraBuildError> {
        let statements = scopes
            .iter()
            .map(Self::generate_registration)
            .collect::<Result<Vec<_>, _>>()?;

        let doc = format!(" Registers the `{}` JSON-LD metadata.", registry_name);
        let tokens = quote! {
            #[doc = #doc]
            #[allow(clippy::all)]
            pub fn register(registry: &mut ::hydra_emit::MetadataRegistry) {
                #(#statements)*
            }

            #[allow(dead_code)]
            pub fn registry() -> ::hydra_emit::MetadataRegistry {
                let mut registry = ::hydra_emit::MetadataRegistry::new();
                register(&mut registry);
                registry
            }
        };

        Ok(tokens)
    }

    // === Registrations ===

    fn generate_registration(scope: &ParsedScope) -> Result<TokenStream, HydraBuildError> {
        let calls = Self::generate_scope_calls(scope);
        let tokens = match &scope.source {
            ScopeSource::Package { name } => quote! {
                registry.register_package(#name, ::hydra_emit::ScopeMetadata::new() #calls);
            },
            ScopeSource::Class { path } => {
                let ty = Self::parse_type(scope, path)?;
                let package = scope.package.as_ref().map(|p| quote! { .in_package(#p) });
                let fields = scope.fields.iter().map(|m| Self::generate_member("with_field", m));
                let accessors = scope.accessors.iter().map(|m| Self::generate_member("with_accessor", m));
                quote! {
                    registry.register_class::<#ty>(
                        ::hydra_emit::ClassMetadata::new()
                            #package
                            #calls
                            #(#fields)*
                            #(#accessors)*
                    );
                }
            }
            ScopeSource::Mixin { path, target } => {
                let mixin = Self::parse_type(scope, path)?;
                let target = Self::parse_type(scope, target)?;
                quote! {
                    registry.register_mixin::<#target, #mixin>(::hydra_emit::ScopeMetadata::new() #calls);
                }
            }
        };
        Ok(tokens)
    }

    /// Builder calls shared by `ScopeMetadata` and `ClassMetadata`.
    fn generate_scope_calls(scope: &ParsedScope) -> TokenStream {
        let vocab = scope.vocab.as_ref().map(|v| quote! { .with_vocab(#v) });
        let expose = scope.expose.as_ref().map(|e| quote! { .with_expose(#e) });
        let term = scope.term.as_ref().map(|t| {
            let (define, target) = (&t.define, &t.target);
            quote! { .with_term(#define, #target) }
        });
        let terms = scope.terms.as_ref().map(|terms| {
            let items = terms.iter().map(|t| {
                let (define, target) = (&t.define, &t.target);
                quote! { ::hydra_emit::TermDefinition::new(#define, #target) }
            });
            quote! { .with_terms(vec![#(#items),*]) }
        });
        quote! { #vocab #expose #term #terms }
    }

    fn generate_member(method: &str, member: &MemberDeclaration) -> TokenStream {
        let method = quote::format_ident!("{}", method);
        let name = &member.name;
        match &member.expose {
            Some(expose) => quote! { .#method(#name, Some(#expose)) },
            None => quote! { .#method(#name, None) },
        }
    }

    fn parse_type(scope: &ParsedScope, path: &str) -> Result<syn::Type, HydraBuildError> {
        syn::parse_str::<syn::Type>(path).map_err(|e| HydraBuildError::CodeGen {
            item: scope.source.describe(),
            message: format!("'{}' is not a valid Rust type path: {}", path, e),
        })
    }
}
