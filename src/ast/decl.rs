//! Resolved declarations.
//!
//! The same node types describe a module before and after template
//! expansion: generic declarations carry `template` and placeholder types,
//! concrete ones carry `template_args` and no placeholders.

use super::span::Span;
use super::types::{QualifiedName, TypeRef, TypeUse};
pub use crate::cst::DefaultKind;

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue {
    /// Exact source text, embedded verbatim in generated code
    pub text: String,
    pub kind: DefaultKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub span: Span,
    pub name: String,
    pub ty: TypeUse,
    pub default: Option<DefaultValue>,
}

/// Template parameters of one declaration and their instantiation lists.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParams {
    pub span: Span,
    pub names: Vec<String>,
    /// Placeholder index of the first name
    pub offset: usize,
    /// One list per name; an empty list means none was declared
    pub lists: Vec<Vec<TypeRef>>,
}

/// Extra class instantiation contributed by a `typedef`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedefInstance {
    pub span: Span,
    pub alias: String,
    pub args: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub span: Span,
    pub params: Vec<Param>,
    pub template: Option<TemplateParams>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub span: Span,
    /// Native name
    pub name: String,
    /// Name registered with the host
    pub export_name: String,
    pub params: Vec<Param>,
    pub return_type: TypeUse,
    pub is_const: bool,
    pub template: Option<TemplateParams>,
    pub template_args: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub span: Span,
    pub name: String,
    pub ty: TypeUse,
}

/// Host protocol method such as `__len__`. The native class supplies
/// the protocol through its iterator pair, not a same-named method.
#[derive(Debug, Clone, PartialEq)]
pub struct DunderMethod {
    pub span: Span,
    /// Protocol name without the underscores
    pub name: String,
    pub params: Vec<Param>,
}

impl DunderMethod {
    pub fn export_name(&self) -> String {
        format!("__{}__", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
    /// `operator()` takes any number of operands
    Call,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDecl {
    pub span: Span,
    pub symbol: String,
    pub arity: Arity,
    pub params: Vec<Param>,
    pub return_type: TypeUse,
    pub is_const: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub label: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub span: Span,
    pub name: String,
    pub cpp_path: QualifiedName,
    /// Owning class for nested enums
    pub owner: Option<QualifiedName>,
    pub is_scoped: bool,
    pub export_values: bool,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub span: Span,
    pub name: String,
    pub export_name: String,
    pub cpp_path: QualifiedName,
    pub template: Option<TemplateParams>,
    pub typedef_instances: Vec<TypedefInstance>,
    pub template_args: Vec<TypeRef>,
    pub base: Option<TypeUse>,
    pub is_virtual: bool,
    pub serializable: bool,
    pub constructors: Vec<Constructor>,
    pub methods: Vec<Method>,
    pub static_methods: Vec<Method>,
    pub dunder_methods: Vec<DunderMethod>,
    pub fields: Vec<Field>,
    pub operators: Vec<OperatorDecl>,
    pub enums: Vec<EnumDecl>,
}

impl ClassDecl {
    /// Native type, with template arguments once instantiated.
    pub fn cpp_type(&self) -> String {
        if self.template_args.is_empty() {
            return self.cpp_path.to_string();
        }
        let args: Vec<String> = self.template_args.iter().map(ToString::to_string).collect();
        format!("{}<{}>", self.cpp_path, args.join(", "))
    }

    /// The class as a type, for comparing against operand types.
    pub fn self_type(&self) -> TypeRef {
        TypeRef::NativeClass {
            path: self.cpp_path.clone(),
            args: self.template_args.iter().cloned().map(TypeUse::value).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub span: Span,
    pub name: String,
    pub export_name: String,
    /// Native name including its namespaces
    pub cpp_path: QualifiedName,
    pub params: Vec<Param>,
    pub return_type: TypeUse,
    pub template: Option<TemplateParams>,
    pub template_args: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub span: Span,
    pub name: String,
    pub cpp_path: QualifiedName,
    pub ty: TypeUse,
}

/// Signature text used in diagnostics, e.g. `f(double, const Foo&)`.
pub fn signature(name: &str, params: &[Param]) -> String {
    let types: Vec<String> = params.iter().map(|p| p.ty.to_cpp()).collect();
    format!("{name}({})", types.join(", "))
}
