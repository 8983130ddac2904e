//! Template expansion.
//!
//! Every templated class, method, constructor and free function becomes one
//! concrete declaration per instantiation tuple. Class tuples and member
//! tuples combine as a Cartesian product. The generic module is only read.

pub mod naming;
pub mod subst;

use crate::ast::{
    ClassDecl, Constructor, DunderMethod, FunctionDecl, Item, Method, Module, OperatorDecl, Span,
    TemplateParams, TypeRef, TypeUse,
};
use crate::diagnostics::WrapError;

pub use naming::camel_suffix;
pub use subst::Substitution;

/// Naming strategy: suffix contributed by one template argument.
pub type SuffixFn = fn(&TypeRef) -> String;

/// Expand all templates of `module`; the result contains no placeholders.
pub fn expand(module: &Module, suffix: SuffixFn) -> Result<Module, WrapError> {
    let expanded = expand_module(module, suffix)?;
    verify_concrete(&expanded)?;
    Ok(expanded)
}

struct Instance {
    export_name: String,
    args: Vec<TypeRef>,
}

fn expand_module(module: &Module, suffix: SuffixFn) -> Result<Module, WrapError> {
    let mut out = Module {
        span: module.span,
        name: module.name.clone(),
        namespace: module.namespace.clone(),
        includes: module.includes.clone(),
        items: Vec::with_capacity(module.items.len()),
    };
    for item in &module.items {
        match item {
            Item::Class(class) => {
                for instance in class_instances(class, suffix)? {
                    out.items.push(Item::Class(instantiate_class(class, &instance, suffix)?));
                }
            }
            Item::Function(function) => {
                for concrete in expand_function(function, suffix)? {
                    out.items.push(Item::Function(concrete));
                }
            }
            Item::Enum(e) => out.items.push(Item::Enum(e.clone())),
            Item::Variable(v) => out.items.push(Item::Variable(v.clone())),
            Item::Submodule(sub) => out.items.push(Item::Submodule(expand_module(sub, suffix)?)),
        }
    }
    Ok(out)
}

fn instance_name(base: &str, args: &[TypeRef], suffix: SuffixFn) -> String {
    let mut name = base.to_string();
    for arg in args {
        name.push_str(&suffix(arg));
    }
    name
}

/// Cartesian product; the last list varies fastest.
fn cartesian(lists: &[Vec<TypeRef>]) -> Vec<Vec<TypeRef>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.into_iter()
            .flat_map(|prefix| {
                list.iter().map(move |ty| {
                    let mut tuple = prefix.clone();
                    tuple.push(ty.clone());
                    tuple
                })
            })
            .collect()
    })
}

fn class_instances(class: &ClassDecl, suffix: SuffixFn) -> Result<Vec<Instance>, WrapError> {
    let Some(template) = &class.template else {
        return Ok(vec![Instance {
            export_name: class.name.clone(),
            args: Vec::new(),
        }]);
    };

    let missing: Vec<&str> = template
        .names
        .iter()
        .zip(&template.lists)
        .filter(|(_, list)| list.is_empty())
        .map(|(name, _)| name.as_str())
        .collect();
    if !missing.is_empty() && missing.len() != template.names.len() {
        return Err(WrapError::TemplateExpansion {
            span: template.span,
            entity: class.name.clone(),
            reason: format!("no instantiation list for parameter(s) {}", missing.join(", ")),
        });
    }

    let mut instances: Vec<Instance> = if missing.is_empty() {
        cartesian(&template.lists)
            .into_iter()
            .map(|args| Instance {
                export_name: instance_name(&class.name, &args, suffix),
                args,
            })
            .collect()
    } else {
        Vec::new()
    };
    for typedef in &class.typedef_instances {
        match instances.iter_mut().find(|i| i.args == typedef.args) {
            Some(existing) => existing.export_name = typedef.alias.clone(),
            None => instances.push(Instance {
                export_name: typedef.alias.clone(),
                args: typedef.args.clone(),
            }),
        }
    }

    if instances.is_empty() {
        return Err(WrapError::TemplateExpansion {
            span: template.span,
            entity: class.name.clone(),
            reason: "class template has no instantiation list and no typedef instantiates it".into(),
        });
    }
    log::debug!("  {}: {} instantiation(s)", class.name, instances.len());
    Ok(instances)
}

fn instantiate_class(
    class: &ClassDecl,
    instance: &Instance,
    suffix: SuffixFn,
) -> Result<ClassDecl, WrapError> {
    let mut subst = Substitution::new().extend(0, &instance.args);
    if !instance.args.is_empty() {
        let owner = TypeRef::NativeClass {
            path: class.cpp_path.clone(),
            args: instance.args.iter().cloned().map(TypeUse::value).collect(),
        };
        subst = subst.with_owner(&class.cpp_path, owner);
    }

    let mut constructors = Vec::new();
    for ctor in &class.constructors {
        let offset = ctor.template.as_ref().map_or(0, |t| t.offset);
        for args in member_tuples(ctor.template.as_ref(), &subst, &class.name)? {
            let inner = subst.extend(offset, &args);
            constructors.push(Constructor {
                span: ctor.span,
                params: inner.apply_params(&ctor.params),
                template: None,
            });
        }
    }

    let mut methods = Vec::new();
    for method in &class.methods {
        methods.extend(expand_method(method, &subst, &class.name, suffix)?);
    }
    let mut static_methods = Vec::new();
    for method in &class.static_methods {
        static_methods.extend(expand_method(method, &subst, &class.name, suffix)?);
    }

    Ok(ClassDecl {
        span: class.span,
        name: class.name.clone(),
        export_name: instance.export_name.clone(),
        cpp_path: class.cpp_path.clone(),
        template: None,
        typedef_instances: Vec::new(),
        template_args: instance.args.clone(),
        base: class.base.as_ref().map(|b| subst.apply_use(b)),
        is_virtual: class.is_virtual,
        serializable: class.serializable,
        constructors,
        methods,
        static_methods,
        dunder_methods: class
            .dunder_methods
            .iter()
            .map(|d| DunderMethod {
                params: subst.apply_params(&d.params),
                ..d.clone()
            })
            .collect(),
        fields: class
            .fields
            .iter()
            .map(|f| crate::ast::Field {
                ty: subst.apply_use(&f.ty),
                ..f.clone()
            })
            .collect(),
        operators: class
            .operators
            .iter()
            .map(|op| OperatorDecl {
                params: subst.apply_params(&op.params),
                return_type: subst.apply_use(&op.return_type),
                ..op.clone()
            })
            .collect(),
        enums: class.enums.clone(),
    })
}

/// Instantiation tuples of a member's own template, with the owner's
/// bindings applied to the lists; one empty tuple when not templated.
fn member_tuples(
    template: Option<&TemplateParams>,
    subst: &Substitution,
    entity: &str,
) -> Result<Vec<Vec<TypeRef>>, WrapError> {
    let Some(template) = template else {
        return Ok(vec![Vec::new()]);
    };
    if let Some(i) = template.lists.iter().position(Vec::is_empty) {
        return Err(WrapError::TemplateExpansion {
            span: template.span,
            entity: entity.to_string(),
            reason: format!("no instantiation list for parameter {}", template.names[i]),
        });
    }
    let lists: Vec<Vec<TypeRef>> = template
        .lists
        .iter()
        .map(|list| list.iter().map(|ty| subst.apply(ty)).collect())
        .collect();
    Ok(cartesian(&lists))
}

fn expand_method(
    method: &Method,
    subst: &Substitution,
    class_name: &str,
    suffix: SuffixFn,
) -> Result<Vec<Method>, WrapError> {
    let entity = format!("{class_name}::{}", method.name);
    let offset = method.template.as_ref().map_or(0, |t| t.offset);
    Ok(member_tuples(method.template.as_ref(), subst, &entity)?
        .into_iter()
        .map(|args| {
            let inner = subst.extend(offset, &args);
            Method {
                span: method.span,
                name: method.name.clone(),
                export_name: instance_name(&method.export_name, &args, suffix),
                params: inner.apply_params(&method.params),
                return_type: inner.apply_use(&method.return_type),
                is_const: method.is_const,
                template: None,
                template_args: args,
            }
        })
        .collect())
}

fn expand_function(function: &FunctionDecl, suffix: SuffixFn) -> Result<Vec<FunctionDecl>, WrapError> {
    let root = Substitution::new();
    Ok(member_tuples(function.template.as_ref(), &root, &function.name)?
        .into_iter()
        .map(|args| {
            let subst = root.extend(0, &args);
            FunctionDecl {
                span: function.span,
                name: function.name.clone(),
                export_name: instance_name(&function.export_name, &args, suffix),
                cpp_path: function.cpp_path.clone(),
                params: subst.apply_params(&function.params),
                return_type: subst.apply_use(&function.return_type),
                template: None,
                template_args: args,
            }
        })
        .collect())
}

/// Any placeholder left after substitution is an internal consistency error.
fn verify_concrete(module: &Module) -> Result<(), WrapError> {
    for item in &module.items {
        match item {
            Item::Class(class) => {
                let mut uses: Vec<(&TypeUse, Span, String)> = Vec::new();
                if let Some(base) = &class.base {
                    uses.push((base, class.span, class.export_name.clone()));
                }
                for ctor in &class.constructors {
                    uses.extend(ctor.params.iter().map(|p| (&p.ty, ctor.span, class.export_name.clone())));
                }
                for m in class.methods.iter().chain(&class.static_methods) {
                    let entity = format!("{}::{}", class.export_name, m.export_name);
                    uses.push((&m.return_type, m.span, entity.clone()));
                    uses.extend(m.params.iter().map(|p| (&p.ty, m.span, entity.clone())));
                }
                for d in &class.dunder_methods {
                    let entity = format!("{}::{}", class.export_name, d.export_name());
                    uses.extend(d.params.iter().map(|p| (&p.ty, d.span, entity.clone())));
                }
                for f in &class.fields {
                    uses.push((&f.ty, f.span, format!("{}::{}", class.export_name, f.name)));
                }
                for op in &class.operators {
                    let entity = format!("{}::operator{}", class.export_name, op.symbol);
                    uses.push((&op.return_type, op.span, entity.clone()));
                    uses.extend(op.params.iter().map(|p| (&p.ty, op.span, entity.clone())));
                }
                for (ty, span, entity) in uses {
                    check_concrete(ty, span, &entity)?;
                }
            }
            Item::Function(f) => {
                check_concrete(&f.return_type, f.span, &f.export_name)?;
                for p in &f.params {
                    check_concrete(&p.ty, f.span, &f.export_name)?;
                }
            }
            Item::Variable(v) => check_concrete(&v.ty, v.span, &v.name)?,
            Item::Enum(_) => {}
            Item::Submodule(sub) => verify_concrete(sub)?,
        }
    }
    Ok(())
}

fn check_concrete(ty: &TypeUse, span: Span, entity: &str) -> Result<(), WrapError> {
    match ty.ty.find_placeholder() {
        Some(p) => Err(WrapError::TemplateExpansion {
            span,
            entity: entity.to_string(),
            reason: format!("placeholder '{}' survived substitution", p.name),
        }),
        None => Ok(()),
    }
}
