//! Fixture-based parser tests.
//!
//! Parses every interface file under tests/fixtures/ and checks the raw
//! declaration tree for the constructs each fixture exercises.

use std::path::Path;

use wrapgen::cst::{DefaultKind, Indirection, Item, Member};
use wrapgen::parse;

fn collect_idl_files(dir: &Path, files: &mut Vec<std::path::PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_idl_files(&path, files);
            } else if path.extension().is_some_and(|e| e == "i") {
                files.push(path);
            }
        }
    }
}

#[test]
fn parse_all_fixture_files() {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut files = Vec::new();
    collect_idl_files(&fixtures_dir, &mut files);
    files.sort();
    assert!(!files.is_empty(), "no fixtures found in {}", fixtures_dir.display());

    let mut failures = Vec::new();
    for path in &files {
        let source = std::fs::read_to_string(path).unwrap();
        if let Err(e) = parse(&source) {
            failures.push(format!("{}: {}", path.display(), e));
        }
    }
    assert!(failures.is_empty(), "parse failures:\n{}", failures.join("\n"));
}

#[test]
fn parse_class_members() {
    let module = parse(include_str!("fixtures/class.i")).unwrap();
    let test = module
        .items
        .iter()
        .find_map(|item| match item {
            Item::Class(c) if c.name.node == "Test" => Some(c),
            _ => None,
        })
        .expect("class Test");

    let ctors = test.members.iter().filter(|m| matches!(m, Member::Constructor(_))).count();
    assert_eq!(ctors, 2);
    let field = test
        .members
        .iter()
        .find_map(|m| match m {
            Member::Field(f) => Some(f),
            _ => None,
        })
        .expect("field");
    assert_eq!(field.name.node, "model_ptr");
    assert_eq!(field.ty.indirection, Indirection::Shared);
}

#[test]
fn parse_forward_declarations_and_typedef() {
    let module = parse(include_str!("fixtures/class.i")).unwrap();
    let forwards: Vec<String> = module
        .items
        .iter()
        .filter_map(|item| match item {
            Item::ForwardDecl(f) => Some(f.path.join("::")),
            _ => None,
        })
        .collect();
    assert_eq!(forwards, ["gtsam::noiseModel::Base", "gtsam::KeyFormatter", "gtsam::Pose2"]);
    assert!(module.items.iter().any(|item| matches!(item, Item::Typedef(t) if t.alias.node == "MyFactorPosePoint2")));
}

#[test]
fn parse_default_values_keep_source_text() {
    let module = parse(include_str!("fixtures/functions.i")).unwrap();
    let defaults: Vec<(String, DefaultKind)> = module
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Function(f) => Some(f),
            _ => None,
        })
        .flat_map(|f| f.params.iter())
        .filter_map(|p| p.default.as_ref())
        .map(|d| (d.text.clone(), d.kind))
        .collect();
    assert!(defaults.contains(&("123".to_string(), DefaultKind::Number)));
    assert!(defaults.contains(&("\"hello\"".to_string(), DefaultKind::String)));
    assert!(defaults.contains(&("{1, 2, 3}".to_string(), DefaultKind::Braced)));
    assert!(defaults.contains(&("gtsam::Pose3()".to_string(), DefaultKind::Call)));
    assert!(defaults.contains(&("false".to_string(), DefaultKind::Bool)));
    assert!(defaults.contains(&("gtsam::DefaultKeyFormatter".to_string(), DefaultKind::Name)));
}

#[test]
fn parse_nested_enums() {
    let module = parse(include_str!("fixtures/enum.i")).unwrap();
    let namespace = module
        .items
        .iter()
        .find_map(|item| match item {
            Item::Namespace(ns) => Some(ns),
            _ => None,
        })
        .expect("namespace gtsam");
    let mcu = namespace
        .items
        .iter()
        .find_map(|item| match item {
            Item::Class(c) => Some(c),
            _ => None,
        })
        .expect("class MCU");
    let enums: Vec<(&str, bool)> = mcu
        .members
        .iter()
        .filter_map(|m| match m {
            Member::Enum(e) => Some((e.name.node.as_str(), e.export_values)),
            _ => None,
        })
        .collect();
    assert_eq!(enums, [("Avengers", false), ("GotG", true)]);
}

#[test]
fn parse_dunder_methods() {
    let module = parse(include_str!("fixtures/container.i")).unwrap();
    let fast_set = module
        .items
        .iter()
        .find_map(|item| match item {
            Item::Namespace(ns) => ns.items.iter().find_map(|i| match i {
                Item::Class(c) => Some(c),
                _ => None,
            }),
            _ => None,
        })
        .expect("class FastSet");
    let dunders: Vec<(&str, usize)> = fast_set
        .members
        .iter()
        .filter_map(|m| match m {
            Member::Dunder(d) => Some((d.name.node.as_str(), d.params.len())),
            _ => None,
        })
        .collect();
    assert_eq!(dunders, [("len", 0), ("contains", 1), ("iter", 0)]);
}

#[test]
fn syntax_error_reports_line_and_column() {
    let err = parse("class A {\n  int f(;\n};\n").unwrap_err();
    assert_eq!(err.code(), "SyntaxError");
    let pos = err.span().start_pos("class A {\n  int f(;\n};\n");
    assert_eq!((pos.line, pos.column), (2, 9));
}

#[test]
fn nested_template_brackets_close_one_at_a_time() {
    let module = parse("void f(const std::vector<std::vector<int>>& nested);").unwrap();
    match &module.items[0] {
        Item::Function(f) => assert_eq!(f.params[0].ty.args.len(), 1),
        other => panic!("{other:?}"),
    }
}
