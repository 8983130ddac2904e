//! Backend capability descriptor.
//!
//! Everything the planner and emitter need to know about a target binding
//! framework lives here, so backend policy is decided in one place.

use crate::ast::TypeRef;
use crate::expand::naming::camel_suffix;

/// How parameters with default values reach the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultArgs {
    /// One registration carrying `py::arg("x") = expr`
    Inline,
    /// One registration per trailing-default omission, defaults stripped
    Expand,
}

#[derive(Debug, Clone)]
pub struct Backend {
    pub name: String,
    pub default_args: DefaultArgs,
    /// Operator symbols the host can register; unary forms are listed
    /// with a `u` prefix (`u-`, `u!`)
    pub operators: Vec<String>,
    /// Protocol methods the host can register, with their parameter count
    pub dunder_methods: Vec<(String, usize)>,
    /// Host identifiers a native name must not be exported as
    pub reserved_names: Vec<String>,
    pub rename_suffix: String,
    pub preamble: Vec<String>,
    pub serialization_preamble: Vec<String>,
    pub trailer: String,
    /// Type whose lifetime captures printed output
    pub capture_type: String,
    pub serializer_namespace: String,
    /// Defaults used by the representation hook, keyed by native type
    pub repr_defaults: Vec<(String, String)>,
    pub naming: fn(&TypeRef) -> String,
}

const PYBIND11_BINARY_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "^", "&", "|", "+=", "-=", "*=", "/=", "%=", "^=", "&=", "|=", "<<",
    "<<=", ">>", ">>=", "==", "!=", "<", ">", "<=", ">=", "()", "[]",
];

const PYBIND11_UNARY_OPERATORS: &[&str] = &["-", "+", "~", "!"];

/// Container protocols implemented over the native `begin()`/`end()` pair.
const PYBIND11_DUNDER_METHODS: &[(&str, usize)] = &[("len", 0), ("contains", 1), ("iter", 0)];

/// Python keywords plus builtins the fixtures rename.
const PYTHON_RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "exec", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "print", "raise", "return",
    "try", "while", "with", "yield",
];

impl Backend {
    pub fn pybind11() -> Self {
        let operators = PYBIND11_BINARY_OPERATORS
            .iter()
            .map(|s| s.to_string())
            .chain(PYBIND11_UNARY_OPERATORS.iter().map(|s| format!("u{s}")))
            .collect();
        Backend {
            name: "pybind11".to_string(),
            default_args: DefaultArgs::Inline,
            operators,
            dunder_methods: PYBIND11_DUNDER_METHODS
                .iter()
                .map(|(name, arity)| (name.to_string(), *arity))
                .collect(),
            reserved_names: PYTHON_RESERVED.iter().map(|s| s.to_string()).collect(),
            rename_suffix: "_".to_string(),
            preamble: vec![
                "#include <pybind11/eigen.h>".to_string(),
                "#include <pybind11/stl_bind.h>".to_string(),
                "#include <pybind11/pybind11.h>".to_string(),
                "#include <pybind11/operators.h>".to_string(),
                "#include \"gtsam/nonlinear/utilities.h\"  // for RedirectCout.".to_string(),
            ],
            serialization_preamble: vec![
                "#include \"wrap/serialization.h\"".to_string(),
                "#include <boost/serialization/export.hpp>".to_string(),
            ],
            trailer: "#include \"python/specializations.h\"".to_string(),
            capture_type: "gtsam::RedirectCout".to_string(),
            serializer_namespace: "gtsam".to_string(),
            repr_defaults: vec![(
                "gtsam::KeyFormatter".to_string(),
                "gtsam::DefaultKeyFormatter".to_string(),
            )],
            naming: camel_suffix,
        }
    }

    /// Select a backend by name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "pybind11" | "pybind" | "python" => Some(Self::pybind11()),
            _ => None,
        }
    }

    pub fn with_default_args(mut self, default_args: DefaultArgs) -> Self {
        self.default_args = default_args;
        self
    }

    pub fn supports_operator(&self, symbol: &str, unary: bool) -> bool {
        let key = if unary { format!("u{symbol}") } else { symbol.to_string() };
        self.operators.iter().any(|op| *op == key)
    }

    /// Parameter count of a supported protocol method.
    pub fn dunder_arity(&self, name: &str) -> Option<usize> {
        self.dunder_methods
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, arity)| *arity)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|r| r == name)
    }

    /// Host-visible name for a native identifier.
    pub fn export_name(&self, name: &str) -> String {
        if self.is_reserved(name) {
            format!("{name}{}", self.rename_suffix)
        } else {
            name.to_string()
        }
    }

    pub fn repr_default(&self, cpp_type: &str) -> Option<&str> {
        self.repr_defaults
            .iter()
            .find(|(ty, _)| ty == cpp_type)
            .map(|(_, value)| value.as_str())
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::pybind11()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_get_suffix() {
        let backend = Backend::pybind11();
        assert_eq!(backend.export_name("print"), "print_");
        assert_eq!(backend.export_name("lambda"), "lambda_");
        assert_eq!(backend.export_name("range"), "range");
    }

    #[test]
    fn test_operator_support() {
        let backend = Backend::pybind11();
        assert!(backend.supports_operator("*", false));
        assert!(backend.supports_operator("-", true));
        assert!(backend.supports_operator("[]", false));
        assert!(!backend.supports_operator("&&", false));
        assert!(!backend.supports_operator("*", true));
    }

    #[test]
    fn test_dunder_support() {
        let backend = Backend::pybind11();
        assert_eq!(backend.dunder_arity("len"), Some(0));
        assert_eq!(backend.dunder_arity("contains"), Some(1));
        assert_eq!(backend.dunder_arity("getitem"), None);
    }

    #[test]
    fn test_named_selector() {
        assert!(Backend::named("pybind11").is_some());
        assert!(Backend::named("matlab").is_none());
        let expand = Backend::pybind11().with_default_args(DefaultArgs::Expand);
        assert_eq!(expand.default_args, DefaultArgs::Expand);
    }
}
