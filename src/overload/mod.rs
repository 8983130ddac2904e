//! Overload planning.
//!
//! Works on the concrete module produced by template expansion. Decides
//! the host-visible name of every callable, materializes default-argument
//! overloads when the backend cannot express defaults, and rejects any
//! pair of registrations the host could not tell apart.

pub mod policy;

use std::collections::HashMap;

use crate::ast::{
    signature, Arity, ClassDecl, Constructor, FunctionDecl, Item, Method, Module, Param, Span,
};
use crate::codegen::{Backend, DefaultArgs};
use crate::diagnostics::WrapError;

use policy::{compare, default_variants, manufactured_name, numeric_clusters, Relation};

/// Plan every scope of `module` for `backend`.
pub fn plan(mut module: Module, backend: &Backend) -> Result<Module, WrapError> {
    plan_module(&mut module, backend)?;
    Ok(module)
}

fn plan_module(module: &mut Module, backend: &Backend) -> Result<(), WrapError> {
    let scope = if module.namespace.is_empty() {
        format!("module {}", module.name)
    } else {
        format!("module {}", module.namespace.join("::"))
    };

    let mut functions: Vec<FunctionDecl> = Vec::new();
    let mut items: Vec<Item> = Vec::with_capacity(module.items.len());
    for item in std::mem::take(&mut module.items) {
        match item {
            Item::Function(f) => {
                for mut concrete in expand_defaults(&f, |f| &f.params, |f, p| f.params = p, backend) {
                    concrete.export_name = backend.export_name(&concrete.export_name);
                    functions.push(concrete);
                }
                // keep registration order; functions are re-inserted below
                items.push(Item::Function(f));
            }
            Item::Class(mut class) => {
                plan_class(&mut class, backend)?;
                items.push(Item::Class(class));
            }
            Item::Submodule(mut sub) => {
                plan_module(&mut sub, backend)?;
                items.push(Item::Submodule(sub));
            }
            other => items.push(other),
        }
    }

    disambiguate(&mut functions, |f| &f.params, |f| &mut f.export_name, backend, &scope)?;

    // splice planned functions back where their generic declaration stood
    let mut planned = functions.into_iter().peekable();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Item::Function(original) => {
                while let Some(f) = planned.next_if(|f| f.span == original.span && f.name == original.name) {
                    out.push(Item::Function(f));
                }
            }
            other => out.push(other),
        }
    }
    module.items = out;

    check_module_names(module, &scope)
}

fn plan_class(class: &mut ClassDecl, backend: &Backend) -> Result<(), WrapError> {
    let scope = format!("class {}", class.export_name);

    for op in &class.operators {
        if !backend.supports_operator(&op.symbol, op.arity == Arity::Unary) {
            let kind = match op.arity {
                Arity::Unary => "unary",
                Arity::Binary | Arity::Call => "binary",
            };
            return Err(WrapError::UnsupportedConstruct {
                span: op.span,
                construct: format!("{kind} operator{}", op.symbol),
                context: class.export_name.clone(),
                backend: backend.name.clone(),
            });
        }
    }

    for d in &class.dunder_methods {
        let arity = backend.dunder_arity(&d.name);
        if arity != Some(d.params.len()) {
            let construct = match arity {
                Some(_) => format!("{} with {} parameter(s)", d.export_name(), d.params.len()),
                None => format!("protocol method {}", d.export_name()),
            };
            return Err(WrapError::UnsupportedConstruct {
                span: d.span,
                construct,
                context: class.export_name.clone(),
                backend: backend.name.clone(),
            });
        }
    }

    class.constructors = std::mem::take(&mut class.constructors)
        .iter()
        .flat_map(|c| expand_defaults(c, |c| &c.params, |c, p| c.params = p, backend))
        .collect();
    check_constructors(&class.constructors, &scope)?;

    class.methods = plan_methods(&class.methods, backend, &scope)?;
    let mut statics = plan_methods(&class.static_methods, backend, &scope)?;
    for s in &mut statics {
        if class.methods.iter().any(|m| m.export_name == s.export_name) {
            log::debug!("  {}: static {} renamed", class.export_name, s.export_name);
            s.export_name.push_str("Static");
        }
    }
    class.static_methods = statics;

    check_class_names(class, &scope)
}

fn plan_methods(methods: &[Method], backend: &Backend, scope: &str) -> Result<Vec<Method>, WrapError> {
    let mut planned: Vec<Method> = methods
        .iter()
        .flat_map(|m| expand_defaults(m, |m| &m.params, |m, p| m.params = p, backend))
        .map(|mut m| {
            m.export_name = backend.export_name(&m.export_name);
            m
        })
        .collect();
    disambiguate(&mut planned, |m| &m.params, |m| &mut m.export_name, backend, scope)?;
    Ok(planned)
}

/// One declaration per trailing-default omission under `DefaultArgs::Expand`.
fn expand_defaults<T: Clone>(
    decl: &T,
    params: impl Fn(&T) -> &Vec<Param>,
    set_params: impl Fn(&mut T, Vec<Param>),
    backend: &Backend,
) -> Vec<T> {
    match backend.default_args {
        DefaultArgs::Inline => vec![decl.clone()],
        DefaultArgs::Expand => default_variants(params(decl))
            .into_iter()
            .map(|variant| {
                let mut concrete = decl.clone();
                set_params(&mut concrete, variant);
                concrete
            })
            .collect(),
    }
}

trait HasSpan {
    fn span(&self) -> Span;
}

impl HasSpan for Method {
    fn span(&self) -> Span {
        self.span
    }
}

impl HasSpan for FunctionDecl {
    fn span(&self) -> Span {
        self.span
    }
}

/// Group by export name, reject indistinguishable pairs and rename
/// numeric-precision clusters.
fn disambiguate<T: HasSpan>(
    decls: &mut [T],
    params: impl Fn(&T) -> &Vec<Param>,
    export_name: impl Fn(&mut T) -> &mut String,
    backend: &Backend,
    scope: &str,
) -> Result<(), WrapError> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for i in 0..decls.len() {
        let name = export_name(&mut decls[i]).clone();
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, members)) => members.push(i),
            None => groups.push((name, vec![i])),
        }
    }
    let original: Vec<String> = groups.iter().map(|(n, _)| n.clone()).collect();
    let mut manufactured: Vec<(String, usize)> = Vec::new();

    for (name, members) in &groups {
        for (a, &i) in members.iter().enumerate() {
            for &j in &members[a + 1..] {
                if compare(params(&decls[i]), params(&decls[j])) == Relation::Identical {
                    return Err(WrapError::OverloadCollision {
                        name: name.clone(),
                        scope: scope.to_string(),
                        first: decls[i].span(),
                        first_signature: signature(name, params(&decls[i])),
                        second: decls[j].span(),
                        second_signature: signature(name, params(&decls[j])),
                    });
                }
            }
        }

        let signatures: Vec<&[Param]> = members.iter().map(|&i| params(&decls[i]).as_slice()).collect();
        let clusters = numeric_clusters(&signatures);
        let mut renames: Vec<(usize, String)> = Vec::new();
        for (cluster, positions) in clusters {
            for local in cluster {
                let idx = members[local];
                let new_name = manufactured_name(name, params(&decls[idx]), &positions, backend.naming);
                renames.push((idx, new_name));
            }
        }
        for (idx, new_name) in renames {
            log::debug!("  {scope}: {name} disambiguated as {new_name}");
            manufactured.push((new_name.clone(), idx));
            *export_name(&mut decls[idx]) = new_name;
        }
    }

    // a manufactured name must not land on another name of the scope
    for (a, (name, idx)) in manufactured.iter().enumerate() {
        let clash = original.iter().any(|o| o == name)
            || manufactured[a + 1..].iter().any(|(n, _)| n == name);
        if clash {
            let other = (0..decls.len())
                .find(|&k| k != *idx && *export_name(&mut decls[k]) == *name)
                .unwrap_or(*idx);
            return Err(WrapError::OverloadCollision {
                name: name.clone(),
                scope: scope.to_string(),
                first: decls[other].span(),
                first_signature: signature(name, params(&decls[other])),
                second: decls[*idx].span(),
                second_signature: signature(name, params(&decls[*idx])),
            });
        }
    }
    Ok(())
}

fn check_constructors(ctors: &[Constructor], scope: &str) -> Result<(), WrapError> {
    for (a, first) in ctors.iter().enumerate() {
        for second in &ctors[a + 1..] {
            if compare(&first.params, &second.params) == Relation::Identical {
                return Err(WrapError::OverloadCollision {
                    name: "__init__".to_string(),
                    scope: scope.to_string(),
                    first: first.span,
                    first_signature: signature("__init__", &first.params),
                    second: second.span,
                    second_signature: signature("__init__", &second.params),
                });
            }
        }
    }
    Ok(())
}

/// What a name in a scope refers to. Only same-kind callables may share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameKind {
    Function,
    Method,
    StaticMethod,
    Class,
    Enum,
    EnumValue,
    Variable,
    Field,
    Submodule,
    Dunder,
    Hook,
}

impl NameKind {
    fn overloadable(self) -> bool {
        matches!(self, NameKind::Function | NameKind::Method | NameKind::StaticMethod)
    }

    fn describe(self) -> &'static str {
        match self {
            NameKind::Function => "function",
            NameKind::Method => "method",
            NameKind::StaticMethod => "static method",
            NameKind::Class => "class",
            NameKind::Enum => "enum",
            NameKind::EnumValue => "enum value",
            NameKind::Variable => "variable",
            NameKind::Field => "field",
            NameKind::Submodule => "submodule",
            NameKind::Dunder => "protocol method",
            NameKind::Hook => "generated hook",
        }
    }
}

struct NameTable<'a> {
    scope: &'a str,
    seen: HashMap<String, (NameKind, Span, String)>,
}

impl<'a> NameTable<'a> {
    fn new(scope: &'a str) -> Self {
        NameTable {
            scope,
            seen: HashMap::new(),
        }
    }

    /// Record `name`; `detail` is the declaration as shown in diagnostics.
    fn add(&mut self, name: &str, kind: NameKind, span: Span, detail: String) -> Result<(), WrapError> {
        let what = format!("{} {detail}", kind.describe());
        if let Some((prev_kind, prev_span, prev_what)) = self.seen.get(name) {
            if *prev_kind == kind && kind.overloadable() {
                return Ok(());
            }
            return Err(WrapError::OverloadCollision {
                name: name.to_string(),
                scope: self.scope.to_string(),
                first: *prev_span,
                first_signature: prev_what.clone(),
                second: span,
                second_signature: what,
            });
        }
        self.seen.insert(name.to_string(), (kind, span, what));
        Ok(())
    }
}

fn check_module_names(module: &Module, scope: &str) -> Result<(), WrapError> {
    let mut names = NameTable::new(scope);
    for item in &module.items {
        match item {
            Item::Class(c) => {
                names.add(&c.export_name, NameKind::Class, c.span, c.export_name.clone())?
            }
            Item::Enum(e) => {
                names.add(&e.name, NameKind::Enum, e.span, e.name.clone())?;
                if e.export_values {
                    for v in &e.values {
                        names.add(&v.label, NameKind::EnumValue, e.span, format!("{}::{}", e.name, v.label))?;
                    }
                }
            }
            Item::Function(f) => names.add(
                &f.export_name,
                NameKind::Function,
                f.span,
                signature(&f.export_name, &f.params),
            )?,
            Item::Variable(v) => {
                names.add(&v.name, NameKind::Variable, v.span, format!("{} {}", v.ty.to_cpp(), v.name))?
            }
            Item::Submodule(m) => names.add(&m.name, NameKind::Submodule, m.span, m.name.clone())?,
        }
    }
    Ok(())
}

fn check_class_names(class: &ClassDecl, scope: &str) -> Result<(), WrapError> {
    let mut names = NameTable::new(scope);
    for m in &class.methods {
        names.add(&m.export_name, NameKind::Method, m.span, signature(&m.export_name, &m.params))?;
    }
    for m in &class.static_methods {
        let what = signature(&m.export_name, &m.params);
        names.add(&m.export_name, NameKind::StaticMethod, m.span, what)?;
    }
    for d in &class.dunder_methods {
        let name = d.export_name();
        let what = signature(&name, &d.params);
        names.add(&name, NameKind::Dunder, d.span, what)?;
    }
    for f in &class.fields {
        names.add(&f.name, NameKind::Field, f.span, format!("{} {}", f.ty.to_cpp(), f.name))?;
    }
    for e in &class.enums {
        names.add(&e.name, NameKind::Enum, e.span, e.name.clone())?;
        if e.export_values {
            for v in &e.values {
                names.add(&v.label, NameKind::EnumValue, e.span, format!("{}::{}", e.name, v.label))?;
            }
        }
    }
    if let Some(print) = class.methods.iter().find(|m| m.name == "print") {
        names.add("__repr__", NameKind::Hook, print.span, "__repr__".to_string())?;
    }
    if class.serializable {
        for hook in ["serialize", "deserialize"] {
            names.add(hook, NameKind::Hook, class.span, hook.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::expand::{camel_suffix, expand};
    use crate::parser::parse;
    use crate::resolve::{resolve, SymbolTable};

    fn plan_src(source: &str, backend: &Backend) -> Result<Module, WrapError> {
        let cst = parse(source).unwrap();
        let externs = Arc::new(SymbolTable::from_externs(["gtsam::Pose3", "gtsam::KeyFormatter"]));
        let module = resolve(&cst, "test_py", &externs)?;
        plan(expand(&module, camel_suffix)?, backend)
    }

    fn function_names(module: &Module) -> Vec<String> {
        module.functions().map(|f| f.export_name.clone()).collect()
    }

    #[test]
    fn test_arity_overloads_keep_name() {
        let module = plan_src("void f(int a);\nvoid f(int a, double b);", &Backend::pybind11()).unwrap();
        assert_eq!(function_names(&module), ["f", "f"]);
    }

    #[test]
    fn test_numeric_precision_renamed() {
        let module = plan_src(
            "void f(double a);\nvoid f(float a);\nvoid f(gtsam::Pose3 p);",
            &Backend::pybind11(),
        )
        .unwrap();
        assert_eq!(function_names(&module), ["fDouble", "fFloat", "f"]);
    }

    #[test]
    fn test_identical_signatures_collide() {
        let err = plan_src("void f(int a);\nvoid f(const int& b);", &Backend::pybind11()).unwrap_err();
        match err {
            WrapError::OverloadCollision { name, first_signature, second_signature, .. } => {
                assert_eq!(name, "f");
                assert_eq!(first_signature, "f(int)");
                assert_eq!(second_signature, "f(const int&)");
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_manufactured_name_collides() {
        let err = plan_src(
            "void f(double a);\nvoid f(float a);\nvoid fDouble(gtsam::Pose3 p);",
            &Backend::pybind11(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "OverloadCollisionError");
    }

    #[test]
    fn test_function_and_variable_share_name() {
        let err = plan_src("int x;\nvoid x(int a);", &Backend::pybind11()).unwrap_err();
        assert_eq!(err.code(), "OverloadCollisionError");
    }

    #[test]
    fn test_static_renamed_and_print_reserved() {
        let module = plan_src(
            "class A {
               double value() const;
               static double value(int seed);
               void print(const string& s) const;
             };",
            &Backend::pybind11(),
        )
        .unwrap();
        let class = module.classes().next().unwrap();
        let methods: Vec<&str> = class.methods.iter().map(|m| m.export_name.as_str()).collect();
        assert_eq!(methods, ["value", "print_"]);
        assert_eq!(class.methods[1].name, "print");
        assert_eq!(class.static_methods[0].export_name, "valueStatic");
    }

    #[test]
    fn test_field_method_collision() {
        let err = plan_src("class A { int x; int x() const; };", &Backend::pybind11()).unwrap_err();
        match err {
            WrapError::OverloadCollision { first_signature, second_signature, .. } => {
                assert_eq!(first_signature, "method x()");
                assert_eq!(second_signature, "field int x");
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_dunder_methods_checked_against_backend() {
        let module = plan_src("class Set { __len__(); __contains__(size_t key); };", &Backend::pybind11())
            .unwrap();
        let class = module.classes().next().unwrap();
        let names: Vec<String> = class.dunder_methods.iter().map(|d| d.export_name()).collect();
        assert_eq!(names, ["__len__", "__contains__"]);

        let err = plan_src("class Set { __len__(int n); };", &Backend::pybind11()).unwrap_err();
        match err {
            WrapError::UnsupportedConstruct { construct, context, .. } => {
                assert_eq!(construct, "__len__ with 1 parameter(s)");
                assert_eq!(context, "Set");
            }
            other => panic!("{other:?}"),
        }

        let err = plan_src("class Set { __hash__(); };", &Backend::pybind11()).unwrap_err();
        match err {
            WrapError::UnsupportedConstruct { construct, .. } => {
                assert_eq!(construct, "protocol method __hash__")
            }
            other => panic!("{other:?}"),
        }

        let err = plan_src("class Set { __len__(); __len__(); };", &Backend::pybind11()).unwrap_err();
        assert_eq!(err.code(), "OverloadCollisionError");
    }

    #[test]
    fn test_expand_defaults_materializes_overloads() {
        let backend = Backend::pybind11().with_default_args(DefaultArgs::Expand);
        let module = plan_src("void g(int a, int b = 1, double c = 2.0);", &backend).unwrap();
        let arities: Vec<usize> = module.functions().map(|f| f.params.len()).collect();
        assert_eq!(arities, [3, 2, 1]);
        assert!(module.functions().all(|f| f.export_name == "g"));
    }

    #[test]
    fn test_inline_defaults_single_entry() {
        let module = plan_src("void g(int a, int b = 1);", &Backend::pybind11()).unwrap();
        assert_eq!(module.functions().count(), 1);
        let f = module.functions().next().unwrap();
        assert_eq!(f.params[1].default.as_ref().map(|d| d.text.as_str()), Some("1"));
    }

    #[test]
    fn test_expand_defaults_can_collide() {
        let backend = Backend::pybind11().with_default_args(DefaultArgs::Expand);
        let err = plan_src("void g(int a);\nvoid g(int a, int b = 1);", &backend).unwrap_err();
        assert_eq!(err.code(), "OverloadCollisionError");
    }

    #[test]
    fn test_unsupported_operator() {
        let err = plan_src("class A { bool operator&&(const A& other) const; };", &Backend::pybind11())
            .unwrap_err();
        match err {
            WrapError::UnsupportedConstruct { construct, backend, .. } => {
                assert_eq!(construct, "binary operator&&");
                assert_eq!(backend, "pybind11");
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_duplicate_constructor() {
        let err = plan_src("class A { A(int a); A(int b); };", &Backend::pybind11()).unwrap_err();
        assert_eq!(err.code(), "OverloadCollisionError");
    }
}
