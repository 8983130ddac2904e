//! Raw declaration tree produced by the parser.
//!
//! Names are still unresolved text and types are still written syntax;
//! the resolver turns this tree into the typed AST in `crate::ast`.
//! Every node keeps its source span for diagnostics.

use crate::ast::span::{Span, Spanned};

/// One parsed interface file
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub span: Span,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Include(Spanned<String>),
    Namespace(Namespace),
    Class(ClassDef),
    ForwardDecl(ForwardDecl),
    Enum(EnumDef),
    Typedef(Typedef),
    Function(FunctionDef),
    Variable(VariableDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub span: Span,
    pub name: Spanned<String>,
    pub items: Vec<Item>,
}

/// Written type: `const gtsam::Pose3&`, `std::vector<Point2*>`, `T::Value`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub span: Span,
    pub is_const: bool,
    /// Path segments without the leading `::`; `unsigned char` is one segment.
    pub path: Vec<String>,
    pub args: Vec<TemplateArg>,
    pub indirection: Indirection,
}

impl TypeExpr {
    pub fn qualified_name(&self) -> String {
        self.path.join("::")
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.path.len() == 1 && self.path[0] == name && self.args.is_empty()
    }
}

/// Trailing pointer/reference marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indirection {
    None,
    /// `*`: shared-owning pointer
    Shared,
    /// `@`: raw pointer
    Raw,
    /// `&`
    Ref,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
    Type(TypeExpr),
    /// Non-type argument, e.g. the `3` of `Eigen::Matrix<double, 3, 3>`
    Literal(Spanned<String>),
}

impl TemplateArg {
    pub fn span(&self) -> Span {
        match self {
            TemplateArg::Type(ty) => ty.span,
            TemplateArg::Literal(lit) => lit.span,
        }
    }
}

/// `template<T = {double, int}, U>`
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDecl {
    pub span: Span,
    pub params: Vec<TemplateParam>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParam {
    pub name: Spanned<String>,
    /// Empty when the parameter was declared without `= {...}`
    pub instantiations: Vec<TemplateArg>,
}

/// Default value kept as its exact source text
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultExpr {
    pub span: Span,
    pub text: String,
    pub kind: DefaultKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultKind {
    Number,
    String,
    Char,
    Bool,
    Null,
    /// `gtsam::Pose3()`, `ns::Class<T>(1, 2)`
    Call,
    /// `{1, 2}`
    Braced,
    /// `Color::Red`, `gtsam::DefaultKeyFormatter`
    Name,
    Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub span: Span,
    pub ty: TypeExpr,
    pub name: String,
    pub default: Option<DefaultExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub span: Span,
    pub template: Option<TemplateDecl>,
    pub is_virtual: bool,
    pub name: Spanned<String>,
    pub base: Option<TypeExpr>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Constructor(CtorDef),
    Method(MethodDef),
    StaticMethod(MethodDef),
    Operator(OperatorDef),
    Dunder(DunderDef),
    Field(FieldDef),
    Enum(EnumDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CtorDef {
    pub span: Span,
    pub template: Option<TemplateDecl>,
    pub params: Vec<ParamDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub span: Span,
    pub template: Option<TemplateDecl>,
    pub return_type: TypeExpr,
    pub name: Spanned<String>,
    pub params: Vec<ParamDef>,
    pub is_const: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDef {
    pub span: Span,
    pub return_type: TypeExpr,
    pub symbol: Spanned<String>,
    pub params: Vec<ParamDef>,
    pub is_const: bool,
}

/// `__name__(params);`, a host protocol method
#[derive(Debug, Clone, PartialEq)]
pub struct DunderDef {
    pub span: Span,
    /// Protocol name without the underscores, e.g. `contains`
    pub name: Spanned<String>,
    pub params: Vec<ParamDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub span: Span,
    pub ty: TypeExpr,
    pub name: Spanned<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub span: Span,
    pub name: Spanned<String>,
    /// `enum class` / `enum struct`
    pub is_scoped: bool,
    pub export_values: bool,
    pub enumerators: Vec<Enumerator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumerator {
    pub span: Span,
    pub name: String,
    pub value: Option<String>,
}

/// `typedef Tmpl<A, B> Alias;`
#[derive(Debug, Clone, PartialEq)]
pub struct Typedef {
    pub span: Span,
    pub target: TypeExpr,
    pub alias: Spanned<String>,
}

/// `class gtsam::Pose3;` or `virtual class Derived : Base;`
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardDecl {
    pub span: Span,
    pub is_virtual: bool,
    pub path: Vec<String>,
    pub base: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub span: Span,
    pub template: Option<TemplateDecl>,
    pub return_type: TypeExpr,
    pub name: Spanned<String>,
    pub params: Vec<ParamDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub span: Span,
    pub ty: TypeExpr,
    pub name: Spanned<String>,
    pub default: Option<DefaultExpr>,
}
