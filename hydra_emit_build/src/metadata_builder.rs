use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::code_generator::CodeGenerator;
use crate::error::HydraBuildError;
use crate::manifest_parser::ManifestParser;
use crate::models::*;

/// Collects manifest blocks and writes the generated registry module.
pub struct MetadataBuilder {
    out_dir: PathBuf,
    scopes: Vec<(ScopeSource, Value)>,
    registry_name: Option<String>,
    export_dir: Option<PathBuf>,
}

impl MetadataBuilder {
    pub fn new(out_dir: &OsStr) -> Self {
        MetadataBuilder {
            out_dir: PathBuf::from(out_dir),
            scopes: Vec::new(),
            registry_name: None,
            export_dir: None,
        }
    }

    pub fn add_package(&mut self, name: &str, body: Value) -> &mut Self {
        self.scopes.push((
            ScopeSource::Package {
                name: name.to_string(),
            },
            body,
        ));
        self
    }

    pub fn add_class(&mut self, path: &str, body: Value) -> &mut Self {
        self.scopes.push((
            ScopeSource::Class {
                path: path.to_string(),
            },
            body,
        ));
        self
    }

    pub fn add_mixin(&mut self, path: &str, target: &str, body: Value) -> &mut Self {
        self.scopes.push((
            ScopeSource::Mixin {
                path: path.to_string(),
                target: target.to_string(),
            },
            body,
        ));
        self
    }

    /// Set the `@registry_name`: the output file is `{registry_name}.rs` in `OUT_DIR`.
    ///
    /// Required. `generate()` fails if it is not set.
    pub fn set_registry_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.registry_name = Some(name.into());
        self
    }

    /// Also write the generated file to `{CARGO_MANIFEST_DIR}/{export_dir}/`.
    pub fn set_export_dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.export_dir = Some(path.into());
        self
    }

    pub fn generate(&self) -> Result<(), HydraBuildError> {
        let registry_name = self.registry_name.as_ref().ok_or_else(|| HydraBuildError::CodeGen {
            item: "MetadataBuilder".to_string(),
            message: "@registry_name is required but was not set".to_string(),
        })?;

        let parsed = self.parse_scopes()?;
        let source = Self::render(registry_name, &parsed)?;
        let file_name = format!("{}.rs", registry_name);

        let output_path = self.out_dir.join(&file_name);
        fs::write(&output_path, &source)?;
        println!("cargo::rerun-if-changed={}", output_path.display());

        if let Some(export_path) = self.export_path(&file_name)? {
            if let Some(parent) = export_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&export_path, &source)?;
        }
        Ok(())
    }

    fn parse_scopes(&self) -> Result<Vec<ParsedScope>, HydraBuildError> {
        let parsed = self
            .scopes
            .iter()
            .map(|(source, body)| ManifestParser::parse(source, body))
            .collect::<Result<Vec<_>, _>>()?;

        // Left to resolution so hand-built registries fail the same way.
        for scope in parsed.iter().filter(|s| s.term.is_some() && s.terms.is_some()) {
            eprintln!(
                "hydra_emit_build: warning: {} declares both '@term' and '@terms', serializing it will fail",
                scope.source.describe()
            );
        }
        Ok(parsed)
    }

    /// Generated registration module, formatted for reading.
    fn render(registry_name: &str, parsed: &[ParsedScope]) -> Result<String, HydraBuildError> {
        let tokens = CodeGenerator::generate(registry_name, parsed)?;
        let file = syn::parse2::<syn::File>(tokens).map_err(|e| HydraBuildError::CodeGen {
            item: format!("registry '{}'", registry_name),
            message: format!("generated code does not parse: {}", e),
        })?;
        Ok(prettyplease::unparse(&file))
    }

    /// `{CARGO_MANIFEST_DIR}/{export_dir}/{file_name}`, when an export dir is set.
    fn export_path(&self, file_name: &str) -> Result<Option<PathBuf>, HydraBuildError> {
        let Some(export_dir) = &self.export_dir else {
            return Ok(None);
        };
        let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR").ok_or_else(|| HydraBuildError::CodeGen {
            item: "@export_dir".to_string(),
            message: "CARGO_MANIFEST_DIR not set".to_string(),
        })?;
        Ok(Some(PathBuf::from(manifest_dir).join(export_dir).join(file_name)))
    }
}
