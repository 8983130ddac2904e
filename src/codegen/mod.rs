//! Code emission.
//!
//! `Backend` describes what the target framework supports; `pybind` turns
//! a planned module into one C++ translation unit.

pub mod backend;
pub mod printer;
pub mod pybind;

pub use backend::{Backend, DefaultArgs};

use crate::ast::Module;

/// Emit the binding source for a planned, fully concrete module.
pub fn emit(module: &Module, backend: &Backend) -> String {
    let start = std::time::Instant::now();
    let out = pybind::emit_module(module, backend);
    log::debug!(
        "emitted {} ({} bytes) in {:.2?}",
        module.name,
        out.len(),
        start.elapsed()
    );
    out
}
