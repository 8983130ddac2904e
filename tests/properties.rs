//! Property tests over generated interface files.

use std::sync::Arc;

use proptest::prelude::*;
use wrapgen::{generate_source, Backend, DefaultArgs, SymbolTable};

fn arb_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["int", "double", "size_t", "string", "const string&", "float"])
}

fn arb_function(name: String) -> impl Strategy<Value = String> {
    (arb_type(), prop::collection::vec(arb_type(), 0..4)).prop_map(move |(ret, params)| {
        let params: Vec<String> = params
            .iter()
            .enumerate()
            .map(|(i, ty)| format!("{ty} a{i}"))
            .collect();
        format!("{ret} {name}({});", params.join(", "))
    })
}

/// Declarations drawn from a small name pool, so overloads are common.
fn arb_overloaded_module() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["f", "g", "h"]).prop_flat_map(|n| arb_function(n.to_string())),
        1..6,
    )
    .prop_map(|decls| decls.join("\n"))
}

fn run(source: &str, backend: &Backend) -> Result<String, wrapgen::WrapError> {
    let externs = Arc::new(SymbolTable::new());
    generate_source(source, "prop_py", backend, &externs)
}

proptest! {
    #[test]
    fn prop_generation_is_deterministic(source in arb_overloaded_module()) {
        let backend = Backend::pybind11();
        prop_assert_eq!(run(&source, &backend), run(&source, &backend));
    }

    #[test]
    fn prop_distinct_names_always_generate(count in 1..6usize, seed in prop::collection::vec(arb_type(), 6)) {
        let source: String = (0..count)
            .map(|i| format!("{} fn{i}({} x);\n", seed[i], seed[(i + 1) % seed.len()]))
            .collect();
        let out = run(&source, &Backend::pybind11()).unwrap();
        for i in 0..count {
            let registration = format!("m_.def(\"fn{i}\",");
            prop_assert_eq!(out.matches(registration.as_str()).count(), 1);
        }
    }

    #[test]
    fn prop_expanded_defaults_register_every_arity(defaults in 0..4usize) {
        let params: Vec<String> = (0..4)
            .map(|i| if i >= 4 - defaults { format!("int p{i} = {i}") } else { format!("int p{i}") })
            .collect();
        let source = format!("void callee({});\n", params.join(", "));
        let backend = Backend::pybind11().with_default_args(DefaultArgs::Expand);
        let out = run(&source, &backend).unwrap();
        prop_assert_eq!(out.matches("m_.def(\"callee\",").count(), defaults + 1);
    }
}
