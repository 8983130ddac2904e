use std::path::PathBuf;

use crate::ast::span::SourcePos;
use crate::diagnostics::WrapError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid glob pattern '{pattern}': {error}")]
    InvalidGlob { pattern: String, error: String },
    #[error("Failed to read file '{path}': {error}")]
    FileReadError { path: PathBuf, error: String },
    #[error("Failed to write file '{path}': {error}")]
    FileWriteError { path: PathBuf, error: String },
    #[error("{rendered}")]
    GenerateError {
        path: PathBuf,
        pos: SourcePos,
        error: WrapError,
        /// `path:line:column: Code: message`, plus a note for collisions
        rendered: String,
    },
    #[error("Duplicate module name '{module_name}' found in '{path1}' and '{path2}'")]
    DuplicateModule {
        module_name: String,
        path1: PathBuf,
        path2: PathBuf,
    },
    #[error("Module name '{module_name}' was given for {count} input files; it can only name a single module")]
    ModuleNameConflict { module_name: String, count: usize },
}

impl BuildError {
    pub fn code(&self) -> String {
        match self {
            BuildError::InvalidGlob { .. } => "InvalidGlob".into(),
            BuildError::FileReadError { .. } => "FileReadError".into(),
            BuildError::FileWriteError { .. } => "FileWriteError".into(),
            BuildError::GenerateError { error, .. } => format!("GenerateError.{}", error.code()),
            BuildError::DuplicateModule { .. } => "DuplicateModule".into(),
            BuildError::ModuleNameConflict { .. } => "ModuleNameConflict".into(),
        }
    }
}
