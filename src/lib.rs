//! IDL to pybind11 binding generator
//!
//! Reads a restricted C++-flavoured interface description and emits one
//! self-registering pybind11 module per input. The pipeline:
//! 1. Logos-based lexer, comments discarded
//! 2. Hand-written recursive-descent parser producing a raw declaration tree
//! 3. Type resolution against a layered, read-only symbol table
//! 4. Template expansion over explicit instantiation lists
//! 5. Overload planning driven by the backend capability descriptor
//! 6. Code emission

pub mod ast;
pub mod build;
pub mod codegen;
pub mod cst;
pub mod diagnostics;
pub mod expand;
pub mod interner;
pub mod lexer;
pub mod overload;
pub mod parser;
pub mod resolve;

// Re-export main types
pub use build::{generate_source, WrapOptions};
pub use codegen::{Backend, DefaultArgs};
pub use diagnostics::WrapError;
pub use lexer::{lex, Token};
pub use parser::parse;
pub use resolve::SymbolTable;
