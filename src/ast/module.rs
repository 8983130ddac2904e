use super::decl::{ClassDecl, EnumDecl, FunctionDecl, VariableDecl};
use super::span::Span;

/// One module or submodule of the typed AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub span: Span,
    pub name: String,
    /// Namespace chain from the root module; empty for the root
    pub namespace: Vec<String>,
    /// `#include` paths in declaration order, collected on the root only
    pub includes: Vec<String>,
    pub items: Vec<Item>,
}

/// Closed set of declaration kinds; consumers match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Class(ClassDecl),
    Enum(EnumDecl),
    Function(FunctionDecl),
    Variable(VariableDecl),
    Submodule(Module),
}

impl Module {
    pub fn new(name: &str, namespace: Vec<String>, span: Span) -> Self {
        Module {
            span,
            name: name.to_string(),
            namespace,
            includes: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Enum(e) => Some(e),
            _ => None,
        })
    }

    pub fn submodules(&self) -> impl Iterator<Item = &Module> {
        self.items.iter().filter_map(|item| match item {
            Item::Submodule(m) => Some(m),
            _ => None,
        })
    }

    pub fn submodule(&self, name: &str) -> Option<&Module> {
        self.submodules().find(|m| m.name == name)
    }

    /// Classes of this module and every submodule, depth first.
    pub fn all_classes(&self) -> Vec<&ClassDecl> {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                Item::Class(c) => out.push(c),
                Item::Submodule(m) => out.extend(m.all_classes()),
                Item::Enum(_) | Item::Function(_) | Item::Variable(_) => {}
            }
        }
        out
    }
}
