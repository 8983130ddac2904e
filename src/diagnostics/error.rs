use crate::ast::span::{SourcePos, Span};
use thiserror::Error;

/// Everything that can abort generation of a module.
///
/// Each variant carries the span of the offending declaration so the build
/// driver can report `path:line:column`. Collisions carry both sides.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WrapError {
    #[error("{pos}: syntax error at '{found}': {message}")]
    Syntax {
        span: Span,
        pos: SourcePos,
        found: String,
        message: String,
    },

    #[error("unresolved type '{name}' in declaration '{context}'")]
    UnresolvedType {
        span: Span,
        name: String,
        context: String,
    },

    #[error("cannot expand template '{entity}': {reason}")]
    TemplateExpansion {
        span: Span,
        entity: String,
        reason: String,
    },

    #[error("overload collision on '{name}' in {scope}: `{first_signature}` conflicts with `{second_signature}`")]
    OverloadCollision {
        name: String,
        scope: String,
        first: Span,
        first_signature: String,
        second: Span,
        second_signature: String,
    },

    #[error("{backend} backend cannot register {construct} in '{context}'")]
    UnsupportedConstruct {
        span: Span,
        construct: String,
        context: String,
        backend: String,
    },
}

impl WrapError {
    pub fn syntax(
        source: &str,
        span: Span,
        found: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        WrapError::Syntax {
            span,
            pos: span.start_pos(source),
            found: found.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WrapError::Syntax { .. } => "SyntaxError",
            WrapError::UnresolvedType { .. } => "UnresolvedTypeError",
            WrapError::TemplateExpansion { .. } => "TemplateExpansionError",
            WrapError::OverloadCollision { .. } => "OverloadCollisionError",
            WrapError::UnsupportedConstruct { .. } => "UnsupportedConstructError",
        }
    }

    /// Primary location; for collisions this is the later declaration.
    pub fn span(&self) -> Span {
        match self {
            WrapError::Syntax { span, .. }
            | WrapError::UnresolvedType { span, .. }
            | WrapError::TemplateExpansion { span, .. }
            | WrapError::UnsupportedConstruct { span, .. } => *span,
            WrapError::OverloadCollision { second, .. } => *second,
        }
    }

    /// The earlier declaration of a collision.
    pub fn related_span(&self) -> Option<Span> {
        match self {
            WrapError::OverloadCollision { first, .. } => Some(*first),
            _ => None,
        }
    }
}
