use super::ModuleError;
use crate::{heap::ObjectRef, value::Value};
use std::path::{Path, PathBuf};
use tracing::warn;

/// What a reader is asked to populate.
#[derive(Debug, Clone)]
pub struct ModuleRequest {
    /// Absolute path of the file that was found.
    pub path: PathBuf,
    /// Logical module name, e.g. `game.utils`.
    pub name: String,
    /// The module's top-level scope, already allocated and enclosed by the globals.
    pub environment: ObjectRef,
}

/// The side of the interpreter that readers are allowed to drive.
pub trait ModuleHost {
    /// Parses and executes source text with `environment` as the current scope.
    fn run_source(
        &mut self,
        source: &str,
        path: &Path,
        environment: ObjectRef,
    ) -> Result<(), ModuleError>;

    /// Binds a value in the given scope.
    fn define(&mut self, environment: ObjectRef, name: &str, value: Value);
}

/// Turns a file of one particular kind into the contents of a module scope.
pub trait ModuleReader: std::fmt::Debug {
    fn load(&self, request: &ModuleRequest, host: &mut dyn ModuleHost) -> Result<(), ModuleError>;
}

/// Reads source files of the language itself and runs them.
#[derive(Debug, Default)]
pub struct SourceReader;

impl ModuleReader for SourceReader {
    fn load(&self, request: &ModuleRequest, host: &mut dyn ModuleHost) -> Result<(), ModuleError> {
        let source = std::fs::read_to_string(&request.path).map_err(|e| ModuleError::Io {
            path: request.path.clone(),
            message: e.to_string(),
        })?;
        host.run_source(&source, &request.path, request.environment)
    }
}

/// Stands in for foreign modules that cannot be executed. The module scope only describes
/// the file: `path`, `name` and `kind`.
#[derive(Debug, Clone)]
pub struct PlaceholderReader {
    kind: &'static str,
}

impl PlaceholderReader {
    pub fn new(kind: &'static str) -> Self {
        Self { kind }
    }
}

impl ModuleReader for PlaceholderReader {
    fn load(&self, request: &ModuleRequest, host: &mut dyn ModuleHost) -> Result<(), ModuleError> {
        warn!(
            kind = self.kind,
            path = %request.path.display(),
            "{} modules are not executed, only their metadata is exposed",
            self.kind
        );
        let path = request.path.to_string_lossy();
        host.define(request.environment, "path", Value::String(path.as_ref().into()));
        host.define(request.environment, "name", Value::String(request.name.as_str().into()));
        host.define(request.environment, "kind", Value::String(self.kind.into()));
        Ok(())
    }
}
