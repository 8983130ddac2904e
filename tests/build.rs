//! Build integration tests.
//!
//! Runs the file-level driver over temporary directories: glob discovery,
//! the shared extern table between modules, and atomic output.

use std::fs;
use std::path::Path;

use wrapgen::build::{build, build_from_sources, write_outputs, BuildError, WrapOptions};

fn write_fixture(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn glob_in(dir: &Path, pattern: &str) -> String {
    dir.join(pattern).to_string_lossy().into_owned()
}

#[test]
fn modules_see_each_others_classes() {
    let src = tempfile::tempdir().unwrap();
    write_fixture(src.path(), "geometry.i", include_str!("fixtures/geometry.i"));
    write_fixture(src.path(), "factors.i", include_str!("fixtures/factors.i"));

    let pattern = glob_in(src.path(), "*.i");
    let result = build(&[pattern.as_str()], &WrapOptions::default());
    let errors: Vec<String> = result.build_errors.iter().map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "{errors:?}");

    let names: Vec<&str> = result.modules.iter().map(|m| m.module_name.as_str()).collect();
    assert_eq!(names, ["factors", "geometry"]);
    let factors = &result.modules[0].output;
    assert!(factors.contains("py::init<size_t, const gtsam::Landmark&>(), py::arg(\"key\"), py::arg(\"prior\")"));
}

#[test]
fn module_alone_cannot_see_unpublished_classes() {
    let result = build_from_sources(
        &[("factors.i", include_str!("fixtures/factors.i"))],
        &WrapOptions::default(),
    );
    assert!(result.modules.is_empty());
    assert_eq!(result.build_errors.len(), 1);
    assert_eq!(result.build_errors[0].code(), "GenerateError.UnresolvedTypeError");
}

#[test]
fn externs_option_stands_in_for_other_modules() {
    let options = WrapOptions {
        externs: vec!["gtsam::Landmark".to_string()],
        ..WrapOptions::default()
    };
    let result = build_from_sources(&[("factors.i", include_str!("fixtures/factors.i"))], &options);
    assert!(result.build_errors.is_empty());
    assert_eq!(result.modules.len(), 1);
}

#[test]
fn failing_module_writes_nothing() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixture(src.path(), "good.i", "class Good {\n  Good();\n};\n");
    write_fixture(src.path(), "bad.i", "void f(int a);\nvoid f(int b);\n");
    write_fixture(src.path(), "notes.txt", "not an interface file");

    let pattern = glob_in(src.path(), "*");
    let result = build(&[pattern.as_str()], &WrapOptions::default());
    assert_eq!(result.modules.len(), 1);
    assert!(matches!(
        result.build_errors.as_slice(),
        [BuildError::GenerateError { .. }]
    ));

    let written = write_outputs(&result, out.path()).unwrap();
    assert_eq!(written, [out.path().join("good.cpp")]);
    let mut entries: Vec<String> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, ["good.cpp"]);
    let contents = fs::read_to_string(out.path().join("good.cpp")).unwrap();
    assert_eq!(contents, result.modules[0].output);
}

#[test]
fn module_name_override() {
    let options = WrapOptions {
        module_name: Some("geometry_py".into()),
        ..WrapOptions::default()
    };
    let result = build_from_sources(&[("geometry.i", include_str!("fixtures/geometry.i"))], &options);
    assert_eq!(result.modules[0].module_name, "geometry_py");
    assert!(result.modules[0].output.contains("PYBIND11_MODULE(geometry_py, m_) {"));
}

#[test]
fn duplicate_module_names_are_reported() {
    let result = build_from_sources(
        &[("a/geometry.i", "class A {};"), ("b/geometry.i", "class B {};")],
        &WrapOptions::default(),
    );
    assert_eq!(result.modules.len(), 1);
    assert_eq!(result.build_errors[0].code(), "DuplicateModule");
}

#[test]
fn invalid_glob_is_reported() {
    let result = build(&["[unclosed"], &WrapOptions::default());
    assert!(result.modules.is_empty());
    assert_eq!(result.build_errors[0].code(), "InvalidGlob");
}
