//! Multi-module build pipeline.
//!
//! Discovers IDL files via glob patterns, parses them all, publishes every
//! module's classes and enums into one read-only symbol table, then
//! generates each module on worker threads. A module that fails produces
//! no output; its error is recorded and the others continue.

pub mod error;

use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::codegen::{self, Backend};
use crate::cst;
use crate::diagnostics::{self, WrapError};
use crate::expand;
use crate::overload;
use crate::parser;
use crate::resolve::{self, SymbolTable};

pub use error::BuildError;

// ===== Build options =====

/// Configuration options for the build pipeline.
#[derive(Debug, Clone, Default)]
pub struct WrapOptions {
    /// Overrides the module name derived from the file stem. Only valid
    /// when exactly one input is built.
    pub module_name: Option<String>,
    pub backend: Backend,
    /// Qualified class names declared outside every input, e.g. `gtsam::Pose3`
    pub externs: Vec<String>,
}

// ===== Public types =====

pub struct ModuleResult {
    pub path: PathBuf,
    pub module_name: String,
    pub output: String,
}

pub struct BuildResult {
    pub modules: Vec<ModuleResult>,
    pub build_errors: Vec<BuildError>,
}

// ===== Internal types =====

struct ParsedModule<'a> {
    path: PathBuf,
    source: &'a str,
    module: cst::Module,
    module_name: String,
}

const IDL_EXTENSIONS: &[&str] = &["i", "h", "idl"];

// ===== Single module =====

/// Run the whole pipeline on one in-memory source.
pub fn generate_source(
    source: &str,
    module_name: &str,
    backend: &Backend,
    externs: &Arc<SymbolTable>,
) -> Result<String, WrapError> {
    let module = parser::parse(source)?;
    generate_module(&module, module_name, backend, externs)
}

fn generate_module(
    module: &cst::Module,
    module_name: &str,
    backend: &Backend,
    externs: &Arc<SymbolTable>,
) -> Result<String, WrapError> {
    let start = Instant::now();
    let resolved = resolve::resolve(module, module_name, externs)?;
    let concrete = expand::expand(&resolved, backend.naming)?;
    let planned = overload::plan(concrete, backend)?;
    let output = codegen::emit(&planned, backend);
    log::debug!("  generated {} in {:.2?}", module_name, start.elapsed());
    Ok(output)
}

// ===== Public API =====

/// Build all IDL modules matching the given glob patterns.
pub fn build(globs: &[&str], options: &WrapOptions) -> BuildResult {
    let build_start = Instant::now();
    let mut build_errors = Vec::new();

    // Phase 1: Glob resolution
    log::debug!("Phase 1: Resolving glob patterns: {:?}", globs);
    let phase_start = Instant::now();
    let paths = resolve_globs(globs, &mut build_errors);
    log::debug!(
        "Phase 1 complete: found {} files in {:.2?}",
        paths.len(),
        phase_start.elapsed()
    );
    for path in &paths {
        log::debug!("  discovered: {}", path.display());
    }

    // Phase 2: Read
    log::debug!("Phase 2: Reading source files");
    let phase_start = Instant::now();
    let mut sources = Vec::new();
    for path in &paths {
        match fs::read_to_string(path) {
            Ok(source) => {
                log::debug!("  read {} ({} bytes)", path.display(), source.len());
                sources.push((path.to_string_lossy().into_owned(), source));
            }
            Err(e) => {
                log::debug!("  failed to read {}: {}", path.display(), e);
                build_errors.push(BuildError::FileReadError {
                    path: path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    log::debug!(
        "Phase 2 complete: read {} source files in {:.2?}",
        sources.len(),
        phase_start.elapsed()
    );

    let source_refs: Vec<(&str, &str)> = sources
        .iter()
        .map(|(p, s)| (p.as_str(), s.as_str()))
        .collect();
    let mut result = build_from_sources(&source_refs, options);
    // File-level errors come before generation errors
    build_errors.append(&mut result.build_errors);
    result.build_errors = build_errors;

    log::debug!("Build finished in {:.2?}", build_start.elapsed());
    result
}

/// Build from pre-read `(path, source)` pairs.
pub fn build_from_sources(sources: &[(&str, &str)], options: &WrapOptions) -> BuildResult {
    let pipeline_start = Instant::now();
    let mut build_errors = Vec::new();

    if let Some(name) = &options.module_name {
        if sources.len() > 1 {
            build_errors.push(BuildError::ModuleNameConflict {
                module_name: name.clone(),
                count: sources.len(),
            });
            return BuildResult {
                modules: Vec::new(),
                build_errors,
            };
        }
    }

    // Phase 3: Parse all sources
    log::debug!("Phase 3: Parsing {} source files", sources.len());
    let phase_start = Instant::now();
    let mut parsed: Vec<ParsedModule> = Vec::new();
    let mut names: HashMap<String, PathBuf> = HashMap::new();
    for &(path, source) in sources {
        let path = PathBuf::from(path);
        let module_name = options
            .module_name
            .clone()
            .unwrap_or_else(|| module_name_from_path(&path));
        if let Some(existing) = names.get(&module_name) {
            build_errors.push(BuildError::DuplicateModule {
                module_name,
                path1: existing.clone(),
                path2: path,
            });
            continue;
        }
        match parser::parse(source) {
            Ok(module) => {
                log::debug!("  parsed {} as {}", path.display(), module_name);
                names.insert(module_name.clone(), path.clone());
                parsed.push(ParsedModule {
                    path,
                    source,
                    module,
                    module_name,
                });
            }
            Err(error) => build_errors.push(generate_error(path, source, error)),
        }
    }
    log::debug!(
        "Phase 3 complete: parsed {} modules in {:.2?}",
        parsed.len(),
        phase_start.elapsed()
    );

    // Phase 4: Publish declarations. The table is frozen before any
    // module is generated; workers only read it.
    let mut table = SymbolTable::from_externs(&options.externs);
    for pm in &parsed {
        table.register_module(&pm.module);
    }
    log::debug!("Phase 4: published {} symbols", table.local_len());
    let externs = Arc::new(table);

    // Phase 5: Generate (parallel, independent pipelines)
    let num_workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    log::debug!(
        "Phase 5: Generating {} modules (parallel, {} workers)",
        parsed.len(),
        num_workers
    );
    let phase_start = Instant::now();
    let work_queue = Mutex::new(parsed.iter());
    let results = Mutex::new(Vec::new());
    let errors = Mutex::new(Vec::new());
    std::thread::scope(|s| {
        let thread_count = num_workers.min(parsed.len());
        for _ in 0..thread_count {
            let work_queue = &work_queue;
            let results = &results;
            let errors = &errors;
            let externs = &externs;
            s.spawn(move || loop {
                let next = {
                    let mut q = work_queue.lock().unwrap_or_else(|e| e.into_inner());
                    q.next()
                };
                let Some(pm) = next else { break };
                match generate_module(&pm.module, &pm.module_name, &options.backend, externs) {
                    Ok(output) => {
                        log::debug!("  ok: {}", pm.module_name);
                        results
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .push(ModuleResult {
                                path: pm.path.clone(),
                                module_name: pm.module_name.clone(),
                                output,
                            });
                    }
                    Err(error) => {
                        log::debug!("  failed: {}: {}", pm.module_name, error.code());
                        errors
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .push(generate_error(pm.path.clone(), pm.source, error));
                    }
                }
            });
        }
    });

    let mut modules = results.into_inner().unwrap_or_else(|e| e.into_inner());
    modules.sort_by(|a, b| a.path.cmp(&b.path));
    let mut generate_errors = errors.into_inner().unwrap_or_else(|e| e.into_inner());
    generate_errors.sort_by(|a, b| error_path(a).cmp(&error_path(b)));
    build_errors.extend(generate_errors);
    log::debug!(
        "Phase 5 complete: generated {} modules in {:.2?}",
        modules.len(),
        phase_start.elapsed()
    );
    log::debug!("Pipeline finished in {:.2?}", pipeline_start.elapsed());

    BuildResult {
        modules,
        build_errors,
    }
}

/// Write every generated module to `<out_dir>/<module>.cpp`. Each file is
/// written to a temporary sibling first and renamed into place, so a
/// reader never sees a partially written module.
pub fn write_outputs(result: &BuildResult, out_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    fs::create_dir_all(out_dir).map_err(|e| BuildError::FileWriteError {
        path: out_dir.to_path_buf(),
        error: e.to_string(),
    })?;
    let mut written = Vec::with_capacity(result.modules.len());
    for module in &result.modules {
        let target = out_dir.join(format!("{}.cpp", module.module_name));
        write_atomic(&target, &module.output)?;
        log::debug!("  wrote {}", target.display());
        written.push(target);
    }
    Ok(written)
}

fn write_atomic(target: &Path, contents: &str) -> Result<(), BuildError> {
    let tmp = target.with_extension("cpp.tmp");
    let write = || -> std::io::Result<()> {
        let mut writer = BufWriter::new(fs::File::create(&tmp)?);
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        fs::rename(&tmp, target)
    };
    write().map_err(|e| {
        let _ = fs::remove_file(&tmp);
        BuildError::FileWriteError {
            path: target.to_path_buf(),
            error: e.to_string(),
        }
    })
}

// ===== Helpers =====

fn module_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn generate_error(path: PathBuf, source: &str, error: WrapError) -> BuildError {
    let rendered = diagnostics::render(&path.to_string_lossy(), source, &error);
    BuildError::GenerateError {
        pos: error.span().start_pos(source),
        path,
        error,
        rendered,
    }
}

fn error_path(error: &BuildError) -> Option<&Path> {
    match error {
        BuildError::GenerateError { path, .. } => Some(path),
        _ => None,
    }
}

fn resolve_globs(patterns: &[&str], errors: &mut Vec<BuildError>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for &pattern in patterns {
        match glob::glob(pattern) {
            Ok(entries) => {
                for entry in entries {
                    match entry {
                        Ok(path) => {
                            let is_idl = path
                                .extension()
                                .map_or(false, |ext| IDL_EXTENSIONS.iter().any(|e| ext == *e));
                            if is_idl {
                                paths.push(path);
                            }
                        }
                        Err(e) => errors.push(BuildError::FileReadError {
                            path: e.path().to_path_buf(),
                            error: e.to_string(),
                        }),
                    }
                }
            }
            Err(e) => errors.push(BuildError::InvalidGlob {
                pattern: pattern.to_string(),
                error: e.to_string(),
            }),
        }
    }
    paths.sort();
    paths.dedup();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_from_path() {
        assert_eq!(module_name_from_path(Path::new("idl/geometry.i")), "geometry");
        assert_eq!(module_name_from_path(Path::new("gtsam.h")), "gtsam");
    }

    #[test]
    fn test_generate_source_scenario_a() {
        let externs = Arc::new(SymbolTable::new());
        let out = generate_source(
            "class Counter { Counter(int start); int next(int step); };",
            "counter_py",
            &Backend::pybind11(),
            &externs,
        )
        .unwrap();
        assert!(out.contains("PYBIND11_MODULE(counter_py, m_) {"));
        assert_eq!(out.matches("py::init<").count(), 1);
        assert!(out.contains("py::init<int>(), py::arg(\"start\")"));
        assert!(out.contains("return self->next(step);"));
    }

    #[test]
    fn test_module_name_override_requires_single_input() {
        let options = WrapOptions {
            module_name: Some("one".into()),
            ..WrapOptions::default()
        };
        let result = build_from_sources(&[("a.i", "class A {};"), ("b.i", "class B {};")], &options);
        assert!(result.modules.is_empty());
        assert_eq!(result.build_errors[0].code(), "ModuleNameConflict");
    }
}
