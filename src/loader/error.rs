use std::path::PathBuf;
use thiserror::Error;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reasons a module could not be loaded. Errors raised inside a module's own source are
/// flattened to `path:line: message` text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModuleError {
    #[error("module not found, probed [{}]", display_paths(.probed))]
    NotFound { probed: Vec<PathBuf> },
    #[error("no reader registered for extension '{extension}'")]
    NoReader { extension: String },
    #[error("could not read '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },
    #[error("{}", .messages.join("; "))]
    Parse { messages: Vec<String> },
    #[error("{message}")]
    Runtime { message: String },
}

impl ModuleError {
    pub fn code(&self) -> &'static str {
        match self {
            ModuleError::NotFound { .. } => "MD001",
            ModuleError::NoReader { .. } => "MD002",
            ModuleError::Io { .. } => "MD003",
            ModuleError::Parse { .. } => "MD004",
            ModuleError::Runtime { .. } => "MD005",
        }
    }
}
