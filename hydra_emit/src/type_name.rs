use crate::metadata::BeanType;
use crate::resolver::{AnnotationKind, ScopeChain};

/// The `@type` value: mixin exposure, then class exposure, then the simple type name.
pub fn resolve<'a>(chain: &ScopeChain<'a>, bean: BeanType) -> &'a str {
    chain
        .resolve(AnnotationKind::TypeExposure)
        .unwrap_or(bean.simple_name())
}
