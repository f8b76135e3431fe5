mod code_generator;
mod error;
mod manifest_parser;
mod metadata_builder;
mod models;

pub use code_generator::CodeGenerator;
pub use error::HydraBuildError;
pub use manifest_parser::ManifestParser;
pub use metadata_builder::MetadataBuilder;
pub use models::*;

// Re-export serde_json for use in hydra_metadata! macro
pub use serde_json;

/// Macro to declare JSON-LD metadata and generate a registration module.
///
/// # Basic Usage
///
/// In `build.rs`:
/// ```ignore
/// hydra_emit_build::hydra_metadata! {
///     @registry_name "event_metadata",
///     package "events": {
///         "@vocab": "http://example.org/events/",
///     },
///     class "crate::events::Event": {
///         "@package": "events",
///         "@term": {"define": "startDate", "as": "http://schema.org/startDate"},
///         "@fields": {"name": "eventName", "location": null},
///     },
///     mixin "crate::events::FestivalMixin" for "crate::events::Event": {
///         "@expose": "Festival",
///     },
/// }
/// ```
///
/// In your crate's source:
/// ```ignore
/// mod generated {
///     hydra_emit::include_hydra!("event_metadata");
/// }
///
/// let registry = generated::registry();
/// ```
///
/// # Items
///
/// | Item | Description |
/// |------|-------------|
/// | `@registry_name "name"` | **Required.** Output filename stem (`{name}.rs` in `OUT_DIR`) |
/// | `@export_dir "dir"` | Also write the generated file below `CARGO_MANIFEST_DIR` |
/// | `package "name": { ... }` | Package-level `@vocab` and terms |
/// | `class "path": { ... }` | Class metadata for a bean type |
/// | `mixin "path" for "target": { ... }` | Mixin metadata attached to `target` |
///
/// # Manifest Keys
///
/// | Key | Scopes | Value |
/// |-----|--------|-------|
/// | `@vocab` | all | vocabulary IRI |
/// | `@expose` | class, mixin | `@type` value |
/// | `@term` | all | `{"define": name, "as": iri}` |
/// | `@terms` | all | array of term objects |
/// | `@package` | class | package name |
/// | `@fields` | class | field name to exposed name or `null`, in declaration order |
/// | `@accessors` | class | accessor name to exposed name or `null` |
///
/// Type paths are resolved where `include_hydra!` is expanded, so prefer
/// `crate::`-rooted paths. Declaring both `@term` and `@terms` in one block is
/// accepted here and reported when a bean of that scope is serialized.
#[macro_export]
macro_rules! hydra_metadata {
    ( $( $item:tt )* ) => {{
        let out_dir = ::std::env::var_os("OUT_DIR").expect("hydra_metadata! must run from a build script");
        let mut builder = $crate::MetadataBuilder::new(&out_dir);
        $crate::__process_metadata_items!(builder, $($item)*);
        builder.generate().expect("hydra_emit_build: code generation failed");
    }};
}

/// Internal helper macro to process individual items in hydra_metadata!.
/// Not part of the public API.
#[macro_export]
#[doc(hidden)]
macro_rules! __process_metadata_items {
    // Base case: no more items
    ($builder:ident,) => {};

    ($builder:ident, @registry_name $name:literal , $( $rest:tt )*) => {
        $builder.set_registry_name($name);
        $crate::__process_metadata_items!($builder, $($rest)*);
    };

    ($builder:ident, @registry_name $name:literal) => {
        $builder.set_registry_name($name);
    };

    ($builder:ident, @export_dir $path:literal , $( $rest:tt )*) => {
        $builder.set_export_dir($path);
        $crate::__process_metadata_items!($builder, $($rest)*);
    };

    ($builder:ident, @export_dir $path:literal) => {
        $builder.set_export_dir($path);
    };

    ($builder:ident, package $name:literal : { $( $json:tt )* } , $( $rest:tt )*) => {
        $builder.add_package($name, $crate::serde_json::json!({ $($json)* }));
        $crate::__process_metadata_items!($builder, $($rest)*);
    };

    ($builder:ident, package $name:literal : { $( $json:tt )* }) => {
        $builder.add_package($name, $crate::serde_json::json!({ $($json)* }));
    };

    ($builder:ident, class $path:literal : { $( $json:tt )* } , $( $rest:tt )*) => {
        $builder.add_class($path, $crate::serde_json::json!({ $($json)* }));
        $crate::__process_metadata_items!($builder, $($rest)*);
    };

    ($builder:ident, class $path:literal : { $( $json:tt )* }) => {
        $builder.add_class($path, $crate::serde_json::json!({ $($json)* }));
    };

    ($builder:ident, mixin $path:literal for $target:literal : { $( $json:tt )* } , $( $rest:tt )*) => {
        $builder.add_mixin($path, $target, $crate::serde_json::json!({ $($json)* }));
        $crate::__process_metadata_items!($builder, $($rest)*);
    };

    ($builder:ident, mixin $path:literal for $target:literal : { $( $json:tt )* }) => {
        $builder.add_mixin($path, $target, $crate::serde_json::json!({ $($json)* }));
    };
}
