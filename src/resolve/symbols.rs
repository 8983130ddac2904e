use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::QualifiedName;
use crate::cst;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Class {
        /// Number of template parameters when known
        template_arity: Option<usize>,
    },
    Enum,
}

/// Declared classes and enums, keyed by fully qualified name.
///
/// Supports layering: `with_base()` shares an immutable base via `Arc`
/// (the declarations of other modules and configured externs) and stores
/// this module's declarations in a local overlay. Lookups check the
/// overlay first, then the base.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolKind>,
    base: Option<Arc<SymbolTable>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: Arc<SymbolTable>) -> Self {
        Self {
            symbols: HashMap::new(),
            base: Some(base),
        }
    }

    /// Table of known extern class names such as `gtsam::Pose3`.
    pub fn from_externs<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut table = Self::new();
        for name in names {
            table.insert(
                name.as_ref().trim_start_matches("::"),
                SymbolKind::Class { template_arity: None },
            );
        }
        table
    }

    pub fn insert(&mut self, qualified: &str, kind: SymbolKind) {
        self.symbols.insert(qualified.to_string(), kind);
    }

    pub fn get(&self, qualified: &str) -> Option<&SymbolKind> {
        self.symbols
            .get(qualified)
            .or_else(|| self.base.as_ref().and_then(|b| b.get(qualified)))
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.get(qualified).is_some()
    }

    /// Number of symbols in the local overlay.
    pub fn local_len(&self) -> usize {
        self.symbols.len()
    }

    /// Publish `module`'s declarations into this table.
    pub fn register_module(&mut self, module: &cst::Module) {
        for (name, kind) in declared_symbols(module) {
            self.insert(&name.to_string(), kind);
        }
    }
}

/// Classes (with their nested enums), enums and forward declarations of a
/// parsed module, in declaration order.
pub fn declared_symbols(module: &cst::Module) -> Vec<(QualifiedName, SymbolKind)> {
    let mut out = Vec::new();
    collect(&module.items, &[], &mut out);
    out
}

fn collect(items: &[cst::Item], namespaces: &[String], out: &mut Vec<(QualifiedName, SymbolKind)>) {
    let scoped = |name: &str| {
        let mut segments = namespaces.to_vec();
        segments.push(name.to_string());
        QualifiedName::from_segments(&segments)
    };
    for item in items {
        match item {
            cst::Item::Namespace(ns) => {
                let mut inner = namespaces.to_vec();
                inner.push(ns.name.node.clone());
                collect(&ns.items, &inner, out);
            }
            cst::Item::Class(class) => {
                let path = scoped(&class.name.node);
                for member in &class.members {
                    if let cst::Member::Enum(e) = member {
                        out.push((path.child(&e.name.node), SymbolKind::Enum));
                    }
                }
                out.push((
                    path,
                    SymbolKind::Class {
                        template_arity: class.template.as_ref().map(|t| t.params.len()),
                    },
                ));
            }
            cst::Item::ForwardDecl(fwd) => {
                let mut segments = namespaces.to_vec();
                segments.extend(fwd.path.iter().cloned());
                out.push((
                    QualifiedName::from_segments(&segments),
                    SymbolKind::Class { template_arity: None },
                ));
            }
            cst::Item::Enum(e) => out.push((scoped(&e.name.node), SymbolKind::Enum)),
            cst::Item::Include(_)
            | cst::Item::Typedef(_)
            | cst::Item::Function(_)
            | cst::Item::Variable(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn layered_lookup_prefers_overlay() {
        let base = Arc::new(SymbolTable::from_externs(["gtsam::Pose3", "::gtsam::Point3"]));
        let mut table = SymbolTable::with_base(base.clone());
        table.insert("gtsam::Pose3", SymbolKind::Enum);
        assert_eq!(table.get("gtsam::Pose3"), Some(&SymbolKind::Enum));
        assert!(table.contains("gtsam::Point3"));
        assert!(!table.contains("gtsam::Rot3"));
        assert_eq!(table.local_len(), 1);
        assert!(matches!(base.get("gtsam::Pose3"), Some(SymbolKind::Class { .. })));
    }

    #[test]
    fn nested_enums_and_namespaces_are_collected() {
        let module = parse(
            "namespace gtsam {
               template<T = {double}> class Fun { enum Kind { A }; };
               enum Color { Red };
             }
             class ns::Forward;",
        )
        .unwrap();
        let names: Vec<String> = declared_symbols(&module)
            .into_iter()
            .map(|(n, _)| n.to_string())
            .collect();
        assert_eq!(names, ["gtsam::Fun::Kind", "gtsam::Fun", "gtsam::Color", "ns::Forward"]);
    }
}
