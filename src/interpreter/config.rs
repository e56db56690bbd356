use crate::heap::GcConfig;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct InterpreterConfig {
    pub gc: GcConfig,
    /// Directories probed in order when resolving an import.
    pub search_paths: Vec<PathBuf>,
}

impl InterpreterConfig {
    pub fn with_gc(mut self, gc: GcConfig) -> Self {
        self.gc = gc;
        self
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }
}
