//! pybind11 emitter.
//!
//! Pure function of a planned module and a backend descriptor. Operator
//! support and name uniqueness were settled by the planner, so nothing
//! here can fail.

use crate::ast::{
    Arity, ClassDecl, Constructor, DunderMethod, EnumDecl, FunctionDecl, Item, Method, Module,
    OperatorDecl, Param, TypeRef, VariableDecl,
};

use super::backend::{Backend, DefaultArgs};
use super::printer::Printer;

const ROOT_HANDLE: &str = "m_";

/// Render the complete translation unit for `module`.
pub fn emit_module(module: &Module, backend: &Backend) -> String {
    let classes = module.all_classes();
    let mut p = Printer::new();

    for line in &backend.preamble {
        p.writeln(line);
    }
    p.newline();
    if !module.includes.is_empty() {
        for include in &module.includes {
            p.writeln(&format!("#include \"{include}\""));
        }
        p.newline();
    }
    if !classes.is_empty() && !backend.serialization_preamble.is_empty() {
        for line in &backend.serialization_preamble {
            p.writeln(line);
        }
        p.newline();
    }
    let exports: Vec<String> = classes
        .iter()
        .filter(|c| c.is_virtual && c.serializable)
        .map(|c| format!("BOOST_CLASS_EXPORT({})", c.cpp_type()))
        .collect();
    if !exports.is_empty() {
        for line in &exports {
            p.writeln(line);
        }
        p.newline();
    }

    p.writeln("using namespace std;");
    p.newline();
    p.writeln("namespace py = pybind11;");
    p.newline();
    p.writeln(&format!("PYBIND11_MODULE({}, {ROOT_HANDLE}) {{", module.name));
    p.indent();
    p.line(&format!("{ROOT_HANDLE}.doc() = \"{} wrapper of {}\";", backend.name, module.name));
    p.newline();
    p.write(&emit_items(module, ROOT_HANDLE, backend));
    p.dedent();
    p.newline();
    p.writeln(&backend.trailer);
    p.newline();
    p.writeln("}");
    p.finish()
}

/// Registrations of one scope, without the enclosing module definition.
/// Used for the root module and, recursively, for every submodule.
pub fn emit_items(module: &Module, handle: &str, backend: &Backend) -> String {
    let mut p = Printer::with_indent(1);
    let mut after_line = false;
    for item in &module.items {
        match item {
            Item::Function(f) => {
                p.line(&function(f, handle, backend));
                after_line = true;
            }
            Item::Variable(v) => {
                p.line(&variable(v, handle));
                after_line = true;
            }
            Item::Class(c) => {
                if after_line {
                    p.newline();
                }
                class(&mut p, c, handle, &module.namespace, backend);
                p.newline();
                after_line = false;
            }
            Item::Enum(e) => {
                if after_line {
                    p.newline();
                }
                enumeration(&mut p, e, &e.cpp_path.to_string(), handle);
                p.newline();
                after_line = false;
            }
            Item::Submodule(sub) => {
                if after_line {
                    p.newline();
                }
                let sub_handle = submodule_handle(&sub.namespace);
                p.line(&format!(
                    "pybind11::module {sub_handle} = {handle}.def_submodule(\"{0}\", \"{0} submodule\");",
                    sub.name
                ));
                let fragment = emit_items(sub, &sub_handle, backend);
                after_line = !fragment.is_empty() && !fragment.ends_with("\n\n");
                p.write(&fragment);
            }
        }
    }
    p.finish()
}

fn submodule_handle(namespace: &[String]) -> String {
    format!("{ROOT_HANDLE}{}", namespace.join("_"))
}

fn class_handle(namespace: &[String], export_name: &str) -> String {
    if namespace.is_empty() {
        format!("{ROOT_HANDLE}{export_name}")
    } else {
        format!("{ROOT_HANDLE}{}_{export_name}", namespace.join("_"))
    }
}

fn class(p: &mut Printer, c: &ClassDecl, handle: &str, namespace: &[String], backend: &Backend) {
    let cpp = c.cpp_type();
    let mut params = vec![cpp.clone()];
    if let Some(base) = &c.base {
        params.push(base.ty.to_string());
    }
    params.push(format!("std::shared_ptr<{cpp}>"));
    let class_type = format!("py::class_<{}>", params.join(", "));

    let members = class_members(c, &cpp, backend);
    if c.enums.is_empty() {
        p.chain(&format!("{class_type}({handle}, \"{}\")", c.export_name), &members);
        return;
    }

    let own = class_handle(namespace, &c.export_name);
    p.line(&format!("{class_type} {own}({handle}, \"{}\");", c.export_name));
    if !members.is_empty() {
        p.chain(&own, &members);
    }
    for e in &c.enums {
        p.newline();
        enumeration(p, e, &format!("{cpp}::{}", e.name), &own);
    }
}

fn class_members(c: &ClassDecl, cpp: &str, backend: &Backend) -> Vec<String> {
    let mut out = Vec::new();
    out.extend(c.constructors.iter().map(|ctor| constructor(ctor, backend)));
    out.extend(c.methods.iter().map(|m| method(m, cpp, backend)));
    out.extend(c.static_methods.iter().map(|m| static_method(m, cpp, backend)));
    out.extend(c.dunder_methods.iter().map(|d| dunder(d, cpp, backend)));
    for f in &c.fields {
        let def = if f.ty.is_const { "def_readonly" } else { "def_readwrite" };
        out.push(format!(".{def}(\"{0}\", &{cpp}::{0})", f.name));
    }
    out.extend(c.operators.iter().map(|op| operator(op, c, cpp, backend)));
    if c.serializable {
        out.extend(serialization(cpp, &backend.serializer_namespace));
    }
    if let Some(repr) = repr(c, cpp, backend) {
        out.push(repr);
    }
    out
}

fn param_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.ty.to_cpp(), p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn arg_names(params: &[Param]) -> String {
    params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
}

/// `, py::arg("a"), py::arg("b") = 2`; defaults only when the host takes them.
fn py_args(params: &[Param], backend: &Backend) -> String {
    params
        .iter()
        .map(|p| match (&p.default, backend.default_args) {
            (Some(d), DefaultArgs::Inline) => format!(", py::arg(\"{}\") = {}", p.name, d.text),
            _ => format!(", py::arg(\"{}\")", p.name),
        })
        .collect()
}

fn template_call_args(args: &[TypeRef]) -> String {
    if args.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("<{}>", rendered.join(","))
}

/// Lambda body forwarding to `call`; `void` results are not returned.
fn forward(call: &str, returns_void: bool) -> String {
    if returns_void {
        format!("{{ {call};}}")
    } else {
        format!("{{return {call};}}")
    }
}

fn constructor(ctor: &Constructor, backend: &Backend) -> String {
    let types: Vec<String> = ctor.params.iter().map(|p| p.ty.to_cpp()).collect();
    format!(
        ".def(py::init<{}>(){})",
        types.join(", "),
        py_args(&ctor.params, backend)
    )
}

fn method(m: &Method, cpp: &str, backend: &Backend) -> String {
    let mut lambda_params = format!("{cpp}* self");
    if !m.params.is_empty() {
        lambda_params.push_str(", ");
        lambda_params.push_str(&param_list(&m.params));
    }
    let call = format!(
        "self->{}{}({})",
        m.name,
        template_call_args(&m.template_args),
        arg_names(&m.params)
    );
    format!(
        ".def(\"{}\",[]({lambda_params}){}{})",
        m.export_name,
        forward(&call, m.return_type.ty.is_void()),
        py_args(&m.params, backend)
    )
}

fn static_method(m: &Method, cpp: &str, backend: &Backend) -> String {
    let call = format!(
        "{cpp}::{}{}({})",
        m.name,
        template_call_args(&m.template_args),
        arg_names(&m.params)
    );
    format!(
        ".def_static(\"{}\",[]({}){}{})",
        m.export_name,
        param_list(&m.params),
        forward(&call, m.return_type.ty.is_void()),
        py_args(&m.params, backend)
    )
}

/// Container protocols go through the native iterator pair.
fn dunder(d: &DunderMethod, cpp: &str, backend: &Backend) -> String {
    let mut lambda_params = format!("{cpp}* self");
    if !d.params.is_empty() {
        lambda_params.push_str(", ");
        lambda_params.push_str(&param_list(&d.params));
    }
    let (body, policy) = match d.name.as_str() {
        "len" => ("std::distance(self->begin(), self->end())".to_string(), ""),
        "contains" => (
            format!("std::find(self->begin(), self->end(), {}) != self->end()", arg_names(&d.params)),
            "",
        ),
        "iter" => (
            "py::make_iterator(self->begin(), self->end())".to_string(),
            ", py::keep_alive<0, 1>()",
        ),
        other => (format!("self->{other}({})", arg_names(&d.params)), ""),
    };
    format!(
        ".def(\"{}\",[]({lambda_params}){{return {body};}}{}{policy})",
        d.export_name(),
        py_args(&d.params, backend)
    )
}

fn operator(op: &OperatorDecl, c: &ClassDecl, cpp: &str, backend: &Backend) -> String {
    match (op.arity, op.symbol.as_str()) {
        (Arity::Unary, symbol) => format!(".def({symbol}py::self)"),
        (_, "[]") => {
            let call = format!("(*self)[{}]", arg_names(&op.params));
            format!(
                ".def(\"__getitem__\",[]({cpp}* self, {}){}{})",
                param_list(&op.params),
                forward(&call, op.return_type.ty.is_void()),
                py_args(&op.params, backend)
            )
        }
        (_, "()") => {
            let mut lambda_params = format!("{cpp}* self");
            if !op.params.is_empty() {
                lambda_params.push_str(", ");
                lambda_params.push_str(&param_list(&op.params));
            }
            let call = format!("(*self)({})", arg_names(&op.params));
            format!(
                ".def(\"__call__\",[]({lambda_params}){}{})",
                forward(&call, op.return_type.ty.is_void()),
                py_args(&op.params, backend)
            )
        }
        (_, symbol) => {
            let rhs = match op.params.first() {
                Some(p) if p.ty.ty == c.self_type() => "py::self".to_string(),
                Some(p) => format!("{}()", p.ty.ty),
                None => "py::self".to_string(),
            };
            format!(".def(py::self {symbol} {rhs})")
        }
    }
}

fn serialization(cpp: &str, ns: &str) -> Vec<String> {
    vec![
        format!(".def(\"serialize\", []({cpp}* self){{ return {ns}::serialize(*self); }})"),
        format!(
            ".def(\"deserialize\", []({cpp}* self, string serialized){{ {ns}::deserialize(serialized, *self); }}, py::arg(\"serialized\"))"
        ),
        format!(
            ".def(py::pickle(\n            [](const {cpp} &a){{ return py::make_tuple({ns}::serialize(a)); }},\n            [](py::tuple t){{ {cpp} obj; {ns}::deserialize(t[0].cast<std::string>(), obj); return obj; }}))"
        ),
    ]
}

/// Value the representation hook passes for `p` when the caller gives none.
fn repr_default(p: &Param, backend: &Backend) -> Option<String> {
    if matches!(p.ty.ty, TypeRef::String(_)) {
        return Some("\"\"".to_string());
    }
    if let Some(d) = &p.default {
        return Some(d.text.clone());
    }
    backend.repr_default(&p.ty.ty.to_string()).map(str::to_string)
}

fn repr(c: &ClassDecl, cpp: &str, backend: &Backend) -> Option<String> {
    let capture = &backend.capture_type;
    match backend.default_args {
        DefaultArgs::Inline => {
            let print = c.methods.iter().find(|m| m.name == "print")?;
            let mut lambda_params = format!("const {cpp} &a");
            if !print.params.is_empty() {
                lambda_params.push_str(", ");
                lambda_params.push_str(&param_list(&print.params));
            }
            let args: String = print
                .params
                .iter()
                .map(|p| match repr_default(p, backend) {
                    Some(value) => format!(", py::arg(\"{}\") = {value}", p.name),
                    None => format!(", py::arg(\"{}\")", p.name),
                })
                .collect();
            Some(repr_lambda(&lambda_params, capture, &arg_names(&print.params), &args))
        }
        DefaultArgs::Expand => {
            // the host cannot take defaults, so the hook takes only self
            let print = c
                .methods
                .iter()
                .filter(|m| m.name == "print")
                .min_by_key(|m| m.params.len())?;
            let values: Option<Vec<String>> = print.params.iter().map(|p| repr_default(p, backend)).collect();
            let values = values?;
            Some(repr_lambda(&format!("const {cpp} &a"), capture, &values.join(", "), ""))
        }
    }
}

const LAMBDA_INDENT: &str = "                    ";
const BODY_INDENT: &str = "                        ";

fn repr_lambda(lambda_params: &str, capture: &str, call_args: &str, py_args: &str) -> String {
    format!(
        ".def(\"__repr__\",\n{LAMBDA_INDENT}[]({lambda_params}) {{\n\
         {BODY_INDENT}{capture} redirect;\n\
         {BODY_INDENT}a.print({call_args});\n\
         {BODY_INDENT}return redirect.str();\n\
         {LAMBDA_INDENT}}}{py_args})"
    )
}

fn enumeration(p: &mut Printer, e: &EnumDecl, cpp: &str, handle: &str) {
    let mut members: Vec<String> = e
        .values
        .iter()
        .map(|v| format!(".value(\"{0}\", {cpp}::{0})", v.label))
        .collect();
    if e.export_values {
        members.push(".export_values()".to_string());
    }
    p.chain(&format!("py::enum_<{cpp}>({handle}, \"{}\", py::arithmetic())", e.name), &members);
}

fn function(f: &FunctionDecl, handle: &str, backend: &Backend) -> String {
    let callee = if f.cpp_path.namespaces.is_empty() {
        format!("::{}", f.name)
    } else {
        f.cpp_path.to_string()
    };
    let call = format!(
        "{callee}{}({})",
        template_call_args(&f.template_args),
        arg_names(&f.params)
    );
    format!(
        "{handle}.def(\"{}\",[]({}){}{});",
        f.export_name,
        param_list(&f.params),
        forward(&call, f.return_type.ty.is_void()),
        py_args(&f.params, backend)
    )
}

fn variable(v: &VariableDecl, handle: &str) -> String {
    format!("{handle}.attr(\"{}\") = {};", v.name, v.cpp_path)
}
