//! Type resolution: raw declaration tree to typed AST.
//!
//! Every written type is classified into a `TypeRef`. Names are looked up
//! innermost scope first (class, enclosing namespaces, global) in a symbol
//! table layered over the read-only extern table shared by all modules.

pub mod symbols;

use std::sync::Arc;

use crate::ast::{
    Arity, ClassDecl, Constructor, ContainerKind, DefaultValue, DunderMethod, EnumDecl, EnumValue,
    Field, FunctionDecl, Item, Method, Module, NumericShape, OperatorDecl, Ownership, Param,
    Placeholder, PrimitiveKind, QualifiedName, TemplateParams, TypeRef, TypeUse, TypedefInstance,
    VariableDecl,
};
use crate::cst::{self, Indirection, TemplateArg, TypeExpr};
use crate::diagnostics::WrapError;

pub use symbols::{declared_symbols, SymbolKind, SymbolTable};

/// Resolve a parsed module against `externs` (classes and enums declared
/// elsewhere). The extern table is never modified.
pub fn resolve(
    module: &cst::Module,
    module_name: &str,
    externs: &Arc<SymbolTable>,
) -> Result<Module, WrapError> {
    let mut symbols = SymbolTable::with_base(Arc::clone(externs));
    symbols.register_module(module);
    log::debug!(
        "resolving module {}: {} local symbols",
        module_name,
        symbols.local_len()
    );

    let mut resolver = Resolver {
        symbols,
        includes: Vec::new(),
        typedefs: Vec::new(),
    };
    let mut root = Module::new(module_name, Vec::new(), module.span);
    resolver.resolve_items(&module.items, &[], &mut root)?;
    root.includes = std::mem::take(&mut resolver.includes);

    for (typedef, namespaces) in std::mem::take(&mut resolver.typedefs) {
        resolver.attach_typedef(&typedef, &namespaces, &mut root)?;
    }
    Ok(root)
}

struct Resolver {
    symbols: SymbolTable,
    includes: Vec<String>,
    typedefs: Vec<(cst::Typedef, Vec<String>)>,
}

/// What is visible while resolving one declaration.
#[derive(Clone, Copy)]
struct Scope<'a> {
    /// Lookup prefix: enclosing namespaces, plus the class inside a class
    prefix: &'a [String],
    /// Template parameter names, class parameters first
    templates: &'a [String],
    this_type: Option<&'a TypeRef>,
    /// Declaration name used in diagnostics
    context: &'a str,
}

impl Resolver {
    fn resolve_items(
        &mut self,
        items: &[cst::Item],
        namespaces: &[String],
        module: &mut Module,
    ) -> Result<(), WrapError> {
        for item in items {
            match item {
                cst::Item::Include(path) => self.includes.push(path.node.clone()),
                cst::Item::Namespace(ns) => {
                    let mut chain = namespaces.to_vec();
                    chain.push(ns.name.node.clone());
                    // repeated namespace blocks merge into the first submodule
                    let idx = match module.items.iter().position(
                        |i| matches!(i, Item::Submodule(m) if m.name == ns.name.node),
                    ) {
                        Some(idx) => idx,
                        None => {
                            module.items.push(Item::Submodule(Module::new(
                                &ns.name.node,
                                chain.clone(),
                                ns.span,
                            )));
                            module.items.len() - 1
                        }
                    };
                    if let Item::Submodule(sub) = &mut module.items[idx] {
                        self.resolve_items(&ns.items, &chain, sub)?;
                    }
                }
                cst::Item::Class(class) => {
                    let decl = self.resolve_class(class, namespaces)?;
                    module.items.push(Item::Class(decl));
                }
                cst::Item::ForwardDecl(_) => {}
                cst::Item::Enum(e) => {
                    module.items.push(Item::Enum(self.resolve_enum(e, namespaces, None)));
                }
                cst::Item::Typedef(t) => self.typedefs.push((t.clone(), namespaces.to_vec())),
                cst::Item::Function(f) => {
                    let decl = self.resolve_function(f, namespaces)?;
                    module.items.push(Item::Function(decl));
                }
                cst::Item::Variable(v) => {
                    let scope = Scope {
                        prefix: namespaces,
                        templates: &[],
                        this_type: None,
                        context: &v.name.node,
                    };
                    let mut segments = namespaces.to_vec();
                    segments.push(v.name.node.clone());
                    module.items.push(Item::Variable(VariableDecl {
                        span: v.span,
                        name: v.name.node.clone(),
                        cpp_path: QualifiedName::from_segments(&segments),
                        ty: self.resolve_type(&v.ty, scope)?,
                    }));
                }
            }
        }
        Ok(())
    }

    fn resolve_class(&self, def: &cst::ClassDef, namespaces: &[String]) -> Result<ClassDecl, WrapError> {
        let name = def.name.node.clone();
        let mut prefix = namespaces.to_vec();
        prefix.push(name.clone());
        let cpp_path = QualifiedName::from_segments(&prefix);

        let outer = Scope {
            prefix: namespaces,
            templates: &[],
            this_type: None,
            context: &name,
        };
        let template = def
            .template
            .as_ref()
            .map(|t| self.resolve_template_params(t, 0, outer))
            .transpose()?;
        let class_templates: Vec<String> = template.as_ref().map(|t| t.names.clone()).unwrap_or_default();

        let this_type = TypeRef::NativeClass {
            path: cpp_path.clone(),
            args: class_templates
                .iter()
                .enumerate()
                .map(|(index, n)| {
                    TypeUse::value(TypeRef::Placeholder(Placeholder {
                        index,
                        name: n.clone(),
                        member: Vec::new(),
                    }))
                })
                .collect(),
        };
        let class_scope = Scope {
            prefix: &prefix,
            templates: &class_templates,
            this_type: Some(&this_type),
            context: &name,
        };
        let base = def
            .base
            .as_ref()
            .map(|b| self.resolve_type(b, Scope { prefix: namespaces, ..class_scope }))
            .transpose()?;

        let mut decl = ClassDecl {
            span: def.span,
            name: name.clone(),
            export_name: name.clone(),
            cpp_path: cpp_path.clone(),
            template,
            typedef_instances: Vec::new(),
            template_args: Vec::new(),
            base,
            is_virtual: def.is_virtual,
            serializable: false,
            constructors: Vec::new(),
            methods: Vec::new(),
            static_methods: Vec::new(),
            dunder_methods: Vec::new(),
            fields: Vec::new(),
            operators: Vec::new(),
            enums: Vec::new(),
        };

        for member in &def.members {
            match member {
                cst::Member::Constructor(ctor) => {
                    let template = ctor
                        .template
                        .as_ref()
                        .map(|t| self.resolve_template_params(t, class_templates.len(), class_scope))
                        .transpose()?;
                    let templates = combined(&class_templates, template.as_ref());
                    let scope = Scope {
                        templates: &templates,
                        ..class_scope
                    };
                    decl.constructors.push(Constructor {
                        span: ctor.span,
                        params: self.resolve_params(&ctor.params, scope)?,
                        template,
                    });
                }
                cst::Member::Method(m) => {
                    let marker = m.params.is_empty()
                        && (m.name.node == "serialize" || m.name.node == "serializable");
                    if marker {
                        log::debug!("  {}: serialization marker '{}'", name, m.name.node);
                        decl.serializable = true;
                    } else {
                        decl.methods.push(self.resolve_method(m, &class_templates, class_scope)?);
                    }
                }
                cst::Member::StaticMethod(m) => {
                    decl.static_methods
                        .push(self.resolve_method(m, &class_templates, class_scope)?);
                }
                cst::Member::Operator(op) => {
                    let context = format!("{name}::operator{}", op.symbol.node);
                    let scope = Scope {
                        context: &context,
                        ..class_scope
                    };
                    let params = self.resolve_params(&op.params, scope)?;
                    let arity = match (op.symbol.node.as_str(), params.len()) {
                        ("()", _) => Arity::Call,
                        (_, 0) => Arity::Unary,
                        (_, 1) => Arity::Binary,
                        (_, n) => {
                            return Err(WrapError::UnsupportedConstruct {
                                span: op.span,
                                construct: format!("operator{} with {n} operands", op.symbol.node),
                                context: name.clone(),
                                backend: "any".into(),
                            })
                        }
                    };
                    decl.operators.push(OperatorDecl {
                        span: op.span,
                        symbol: op.symbol.node.clone(),
                        arity,
                        params,
                        return_type: self.resolve_type(&op.return_type, scope)?,
                        is_const: op.is_const,
                    });
                }
                cst::Member::Dunder(d) => {
                    let context = format!("{name}::__{}__", d.name.node);
                    let scope = Scope {
                        context: &context,
                        ..class_scope
                    };
                    decl.dunder_methods.push(DunderMethod {
                        span: d.span,
                        name: d.name.node.clone(),
                        params: self.resolve_params(&d.params, scope)?,
                    });
                }
                cst::Member::Field(f) => {
                    decl.fields.push(Field {
                        span: f.span,
                        name: f.name.node.clone(),
                        ty: self.resolve_type(&f.ty, class_scope)?,
                    });
                }
                cst::Member::Enum(e) => {
                    decl.enums.push(self.resolve_enum(e, &prefix, Some(cpp_path.clone())));
                }
            }
        }
        Ok(decl)
    }

    fn resolve_method(
        &self,
        m: &cst::MethodDef,
        class_templates: &[String],
        class_scope: Scope<'_>,
    ) -> Result<Method, WrapError> {
        let context = format!("{}::{}", class_scope.context, m.name.node);
        let template = m
            .template
            .as_ref()
            .map(|t| {
                self.resolve_template_params(t, class_templates.len(), Scope { context: &context, ..class_scope })
            })
            .transpose()?;
        let templates = combined(class_templates, template.as_ref());
        let scope = Scope {
            templates: &templates,
            context: &context,
            ..class_scope
        };
        Ok(Method {
            span: m.span,
            name: m.name.node.clone(),
            export_name: m.name.node.clone(),
            params: self.resolve_params(&m.params, scope)?,
            return_type: self.resolve_type(&m.return_type, scope)?,
            is_const: m.is_const,
            template,
            template_args: Vec::new(),
        })
    }

    fn resolve_function(
        &self,
        f: &cst::FunctionDef,
        namespaces: &[String],
    ) -> Result<FunctionDecl, WrapError> {
        let outer = Scope {
            prefix: namespaces,
            templates: &[],
            this_type: None,
            context: &f.name.node,
        };
        let template = f
            .template
            .as_ref()
            .map(|t| self.resolve_template_params(t, 0, outer))
            .transpose()?;
        let templates = combined(&[], template.as_ref());
        let scope = Scope {
            templates: &templates,
            ..outer
        };
        let mut segments = namespaces.to_vec();
        segments.push(f.name.node.clone());
        Ok(FunctionDecl {
            span: f.span,
            name: f.name.node.clone(),
            export_name: f.name.node.clone(),
            cpp_path: QualifiedName::from_segments(&segments),
            params: self.resolve_params(&f.params, scope)?,
            return_type: self.resolve_type(&f.return_type, scope)?,
            template,
            template_args: Vec::new(),
        })
    }

    fn resolve_enum(
        &self,
        def: &cst::EnumDef,
        prefix: &[String],
        owner: Option<QualifiedName>,
    ) -> EnumDecl {
        let mut segments = prefix.to_vec();
        segments.push(def.name.node.clone());
        EnumDecl {
            span: def.span,
            name: def.name.node.clone(),
            cpp_path: QualifiedName::from_segments(&segments),
            owner,
            is_scoped: def.is_scoped,
            export_values: def.export_values,
            values: def
                .enumerators
                .iter()
                .map(|e| EnumValue {
                    label: e.name.clone(),
                    value: e.value.clone(),
                })
                .collect(),
        }
    }

    fn resolve_template_params(
        &self,
        decl: &cst::TemplateDecl,
        offset: usize,
        scope: Scope<'_>,
    ) -> Result<TemplateParams, WrapError> {
        let mut names: Vec<String> = Vec::new();
        let mut lists = Vec::new();
        for param in &decl.params {
            if names.contains(&param.name.node) || scope.templates.contains(&param.name.node) {
                return Err(WrapError::TemplateExpansion {
                    span: param.name.span,
                    entity: scope.context.to_string(),
                    reason: format!("template parameter '{}' declared twice", param.name.node),
                });
            }
            names.push(param.name.node.clone());
            let list = param
                .instantiations
                .iter()
                .map(|arg| self.resolve_template_arg(arg, scope).map(|u| u.ty))
                .collect::<Result<Vec<_>, _>>()?;
            lists.push(list);
        }
        Ok(TemplateParams {
            span: decl.span,
            names,
            offset,
            lists,
        })
    }

    fn resolve_params(&self, params: &[cst::ParamDef], scope: Scope<'_>) -> Result<Vec<Param>, WrapError> {
        params
            .iter()
            .map(|p| {
                Ok(Param {
                    span: p.span,
                    name: p.name.clone(),
                    ty: self.resolve_type(&p.ty, scope)?,
                    default: p.default.as_ref().map(|d| DefaultValue {
                        text: d.text.clone(),
                        kind: d.kind,
                    }),
                })
            })
            .collect()
    }

    fn resolve_template_arg(&self, arg: &TemplateArg, scope: Scope<'_>) -> Result<TypeUse, WrapError> {
        match arg {
            TemplateArg::Type(ty) => self.resolve_type(ty, scope),
            TemplateArg::Literal(lit) => Ok(TypeUse::value(TypeRef::Literal(lit.node.clone()))),
        }
    }

    fn resolve_type(&self, expr: &TypeExpr, scope: Scope<'_>) -> Result<TypeUse, WrapError> {
        let ownership = match expr.indirection {
            Indirection::Shared => Ownership::Shared,
            Indirection::Raw => Ownership::Raw,
            Indirection::None | Indirection::Ref => Ownership::Value,
        };
        Ok(TypeUse {
            ty: self.resolve_type_ref(expr, scope)?,
            is_const: expr.is_const,
            is_ref: expr.indirection == Indirection::Ref,
            ownership,
        })
    }

    fn resolve_type_ref(&self, expr: &TypeExpr, scope: Scope<'_>) -> Result<TypeRef, WrapError> {
        let path = &expr.path;
        let unresolved = || WrapError::UnresolvedType {
            span: expr.span,
            name: expr.qualified_name(),
            context: scope.context.to_string(),
        };
        let Some(head) = path.first() else {
            return Err(unresolved());
        };

        if path.len() == 1 && expr.args.is_empty() {
            if let Some(kind) = PrimitiveKind::from_name(head) {
                return Ok(TypeRef::Primitive(kind));
            }
        }
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        if expr.args.is_empty() && matches!(segments.as_slice(), ["string"] | ["std", "string"]) {
            return Ok(TypeRef::String(QualifiedName::from_segments(path)));
        }
        if path.len() == 1 && head == "This" {
            return scope.this_type.cloned().ok_or_else(unresolved);
        }
        if let Some(index) = scope.templates.iter().position(|t| t == head) {
            return Ok(TypeRef::Placeholder(Placeholder {
                index,
                name: head.clone(),
                member: path[1..].to_vec(),
            }));
        }

        let args = expr
            .args
            .iter()
            .map(|a| self.resolve_template_arg(a, scope))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some((qualified, kind)) = self.lookup(path, scope) {
            return match kind {
                SymbolKind::Enum => Ok(TypeRef::Enum(qualified)),
                SymbolKind::Class {
                    template_arity: Some(n),
                    ..
                } if !args.is_empty() && args.len() != n => Err(WrapError::UnresolvedType {
                    span: expr.span,
                    name: format!("{qualified} with {} template arguments (expects {n})", args.len()),
                    context: scope.context.to_string(),
                }),
                SymbolKind::Class { .. } => Ok(TypeRef::NativeClass {
                    path: qualified,
                    args,
                }),
            };
        }

        let std_spelling = matches!(segments.as_slice(), [_] | ["std", _]);
        if let Some(kind) = ContainerKind::from_name(&path[path.len() - 1]) {
            if std_spelling && args.len() == kind.arity() {
                return Ok(TypeRef::Container {
                    kind,
                    path: QualifiedName::from_segments(path),
                    args,
                });
            }
        }
        if let Some(shape) = numeric_shape(&segments, &args) {
            return Ok(TypeRef::Numeric {
                path: QualifiedName::from_segments(path),
                args,
                shape,
            });
        }
        Err(unresolved())
    }

    /// Try `prefix[..i]::path` from the innermost scope outwards.
    fn lookup(&self, path: &[String], scope: Scope<'_>) -> Option<(QualifiedName, SymbolKind)> {
        (0..=scope.prefix.len()).rev().find_map(|i| {
            let mut segments = scope.prefix[..i].to_vec();
            segments.extend(path.iter().cloned());
            self.symbols
                .get(&segments.join("::"))
                .map(|kind| (QualifiedName::from_segments(&segments), kind.clone()))
        })
    }

    /// Record a `typedef Tmpl<A, B> Alias;` as an extra instantiation of
    /// the class template it names.
    fn attach_typedef(
        &self,
        typedef: &cst::Typedef,
        namespaces: &[String],
        root: &mut Module,
    ) -> Result<(), WrapError> {
        let alias = &typedef.alias.node;
        let scope = Scope {
            prefix: namespaces,
            templates: &[],
            this_type: None,
            context: alias,
        };
        let not_an_instantiation = || WrapError::TemplateExpansion {
            span: typedef.span,
            entity: alias.clone(),
            reason: "typedef target must instantiate a class template".into(),
        };
        let (path, args) = match self.resolve_type(&typedef.target, scope)?.ty {
            TypeRef::NativeClass { path, args } if !args.is_empty() => (path, args),
            _ => return Err(not_an_instantiation()),
        };
        let Some(class) = find_class_mut(root, &path) else {
            log::warn!("typedef {} names template {} declared elsewhere; nothing emitted", alias, path);
            return Ok(());
        };
        match &class.template {
            Some(t) if t.names.len() == args.len() => {
                class.typedef_instances.push(TypedefInstance {
                    span: typedef.span,
                    alias: alias.clone(),
                    args: args.into_iter().map(|a| a.ty).collect(),
                });
                Ok(())
            }
            _ => Err(not_an_instantiation()),
        }
    }
}

/// Class template names followed by the member's own.
fn combined(outer: &[String], template: Option<&TemplateParams>) -> Vec<String> {
    let mut names = outer.to_vec();
    if let Some(t) = template {
        names.extend(t.names.iter().cloned());
    }
    names
}

fn find_class_mut<'m>(module: &'m mut Module, path: &QualifiedName) -> Option<&'m mut ClassDecl> {
    for item in &mut module.items {
        match item {
            Item::Class(c) if &c.cpp_path == path => return Some(c),
            Item::Submodule(sub) => {
                if let Some(found) = find_class_mut(sub, path) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

/// Dense vector/matrix names, bare or under `gtsam::` / `Eigen::`.
fn numeric_shape(segments: &[&str], args: &[TypeUse]) -> Option<NumericShape> {
    let (name, prefix) = segments.split_last()?;
    if !matches!(prefix, [] | ["gtsam"] | ["Eigen"]) {
        return None;
    }
    if *name == "Matrix" && args.len() == 3 {
        let dim = |arg: &TypeUse| match &arg.ty {
            TypeRef::Literal(text) if text == "-1" => Some(None),
            TypeRef::Literal(text) => text.parse::<usize>().ok().map(Some),
            _ => None,
        };
        return Some(match (dim(&args[1])?, dim(&args[2])?) {
            (None, Some(1)) => NumericShape::DynamicVector,
            (Some(rows), Some(1)) => NumericShape::FixedVector(rows),
            (Some(rows), Some(cols)) => NumericShape::FixedMatrix(rows, cols),
            _ => NumericShape::DynamicMatrix,
        });
    }
    if !args.is_empty() {
        return None;
    }
    let fixed = |rest: &str| rest.parse::<usize>().ok().filter(|n| (1..=9).contains(n));
    match *name {
        "Vector" | "VectorXd" => Some(NumericShape::DynamicVector),
        "Matrix" | "MatrixXd" => Some(NumericShape::DynamicMatrix),
        "Point2" => Some(NumericShape::FixedVector(2)),
        "Point3" => Some(NumericShape::FixedVector(3)),
        n => {
            if let Some(size) = n.strip_prefix("Vector").and_then(fixed) {
                Some(NumericShape::FixedVector(size))
            } else {
                n.strip_prefix("Matrix").and_then(fixed).map(|size| NumericShape::FixedMatrix(size, size))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn resolve_src(source: &str, externs: &[&str]) -> Result<Module, WrapError> {
        let module = parse(source).unwrap();
        let externs = Arc::new(SymbolTable::from_externs(externs.iter().copied()));
        resolve(&module, "test_py", &externs)
    }

    fn first_function(module: &Module) -> &FunctionDecl {
        module.functions().next().unwrap()
    }

    #[test]
    fn test_classification() {
        let module = resolve_src(
            "class Foo {};
             enum Color { Red };
             void f(int a, const string& s, Foo* foo, Color c, gtsam::Vector v,
                    Matrix3 m, std::vector<Foo> fs, gtsam::Pose3@ p);",
            &["gtsam::Pose3"],
        )
        .unwrap();
        let types: Vec<&TypeRef> = first_function(&module).params.iter().map(|p| &p.ty.ty).collect();
        assert_eq!(types[0], &TypeRef::Primitive(PrimitiveKind::Int));
        assert!(matches!(types[1], TypeRef::String(_)));
        assert!(matches!(types[2], TypeRef::NativeClass { path, .. } if path.to_string() == "Foo"));
        assert!(matches!(types[3], TypeRef::Enum(_)));
        assert!(matches!(types[4], TypeRef::Numeric { shape: NumericShape::DynamicVector, .. }));
        assert!(matches!(types[5], TypeRef::Numeric { shape: NumericShape::FixedMatrix(3, 3), .. }));
        assert!(matches!(types[6], TypeRef::Container { kind: ContainerKind::Vector, .. }));
        assert!(matches!(types[7], TypeRef::NativeClass { .. }));

        let params = &first_function(&module).params;
        assert_eq!(params[2].ty.ownership, Ownership::Shared);
        assert_eq!(params[7].ty.ownership, Ownership::Raw);
        assert!(params[1].ty.is_ref && params[1].ty.is_const);
    }

    #[test]
    fn test_unresolved_type_names_declaration() {
        let err = resolve_src("class A { void f(Missing m); };", &[]).unwrap_err();
        match err {
            WrapError::UnresolvedType { name, context, .. } => {
                assert_eq!(name, "Missing");
                assert_eq!(context, "A::f");
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_declared_class_shadows_numeric_name() {
        let module = resolve_src("namespace gtsam { class Point3 {}; }\nvoid f(gtsam::Point3 p);", &[]).unwrap();
        assert!(matches!(
            &first_function(&module).params[0].ty.ty,
            TypeRef::NativeClass { .. }
        ));
    }

    #[test]
    fn test_nested_enum_resolves_through_class_scope() {
        let module = resolve_src("class Pet { enum Kind { Dog, Cat }; Pet(Kind k); Kind kind; };", &[]).unwrap();
        let class = module.classes().next().unwrap();
        assert_eq!(class.enums[0].cpp_path.to_string(), "Pet::Kind");
        assert_eq!(class.enums[0].owner.as_ref().map(|o| o.to_string()), Some("Pet".into()));
        assert_eq!(class.fields[0].ty.ty, TypeRef::Enum(QualifiedName::from_segments(&["Pet".into(), "Kind".into()])));
    }

    #[test]
    fn test_placeholders_and_this() {
        let module = resolve_src(
            "template<T = {double}> class Fun {
               template<U = {int}> This dhamaal(const T& t, U u, T::Value v);
             };",
            &[],
        )
        .unwrap();
        let class = module.classes().next().unwrap();
        let method = &class.methods[0];
        assert!(matches!(&method.return_type.ty, TypeRef::NativeClass { args, .. } if args.len() == 1));
        assert!(matches!(&method.params[0].ty.ty, TypeRef::Placeholder(p) if p.index == 0));
        assert!(matches!(&method.params[1].ty.ty, TypeRef::Placeholder(p) if p.index == 1));
        assert!(matches!(&method.params[2].ty.ty, TypeRef::Placeholder(p) if p.member == ["Value"]));
        assert_eq!(method.template.as_ref().map(|t| t.offset), Some(1));
    }

    #[test]
    fn test_namespaces_merge_and_include_collection() {
        let module = resolve_src(
            "#include <a.h>
             namespace gtsam { class A {}; }
             namespace gtsam { #include <b.h>\n class B {}; }",
            &[],
        )
        .unwrap();
        assert_eq!(module.includes, ["a.h", "b.h"]);
        assert_eq!(module.submodules().count(), 1);
        let gtsam = module.submodule("gtsam").unwrap();
        let names: Vec<String> = gtsam.classes().map(|c| c.cpp_path.to_string()).collect();
        assert_eq!(names, ["gtsam::A", "gtsam::B"]);
    }

    #[test]
    fn test_typedef_attaches_instance() {
        let module = resolve_src(
            "template<POSE, POINT> class MyFactor {};
             typedef MyFactor<gtsam::Pose2, gtsam::Matrix> MyFactorPosePoint2;",
            &["gtsam::Pose2"],
        )
        .unwrap();
        let class = module.classes().next().unwrap();
        assert_eq!(class.typedef_instances.len(), 1);
        assert_eq!(class.typedef_instances[0].alias, "MyFactorPosePoint2");
    }

    #[test]
    fn test_typedef_of_plain_type_rejected() {
        let err = resolve_src("typedef double Real;", &[]).unwrap_err();
        assert_eq!(err.code(), "TemplateExpansionError");
    }

    #[test]
    fn test_serialize_marker_is_not_a_method() {
        let module = resolve_src("class A { void serialize() const; void print() const; };", &[]).unwrap();
        let class = module.classes().next().unwrap();
        assert!(class.serializable);
        assert_eq!(class.methods.len(), 1);
    }
}
