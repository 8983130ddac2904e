//! Typed AST shared by the resolver, expander, planner and emitter.

pub mod decl;
pub mod module;
pub mod span;
pub mod types;

pub use decl::*;
pub use module::{Item, Module};
pub use span::{SourcePos, Span, Spanned};
pub use types::{
    ContainerKind, NumericShape, Ownership, Placeholder, PrimitiveKind, QualifiedName, TypeRef,
    TypeUse,
};
