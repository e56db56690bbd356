mod error;
mod reader;

pub use error::ModuleError;
pub use reader::{ModuleHost, ModuleReader, ModuleRequest, PlaceholderReader, SourceReader};

use crate::heap::ObjectRef;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    rc::Rc,
};
use tracing::debug;

/// The extension of the language's own source files.
pub const SOURCE_EXTENSION: &str = "cube";

const FOREIGN_READERS: [(&str, &str); 11] = [
    ("py", "python"),
    ("jl", "julia"),
    ("mod", "fortran"),
    ("h", "native"),
    ("hpp", "native"),
    ("cuh", "native"),
    ("cl", "native"),
    ("glsl", "shader"),
    ("hlsl", "shader"),
    ("metal", "shader"),
    ("spv", "shader"),
];

/// A module path that has been matched to a file and a reader.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    pub file: PathBuf,
    /// The module path without its explicit extension, if it had one.
    pub name: String,
    pub extension: String,
    pub reader: Rc<dyn ModuleReader>,
}

/// The last segment of a dotted module name.
pub fn binding_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Resolves dotted module paths to files and keeps the module objects of everything
/// imported so far. The cache is keyed by the path exactly as written in the import.
#[derive(Debug)]
pub struct ModuleLoader {
    search_paths: Vec<PathBuf>,
    readers: Vec<(String, Rc<dyn ModuleReader>)>,
    cache: HashMap<String, ObjectRef>,
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ModuleLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        let mut loader = Self {
            search_paths,
            readers: Vec::new(),
            cache: HashMap::new(),
        };
        loader.register_reader(SOURCE_EXTENSION, Rc::new(SourceReader));
        for (extension, kind) in FOREIGN_READERS {
            loader.register_reader(extension, Rc::new(PlaceholderReader::new(kind)));
        }
        loader
    }

    pub fn get_search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Registers a reader for an extension, replacing any reader already registered for it.
    /// New extensions are probed after the existing ones.
    pub fn register_reader(&mut self, extension: &str, reader: Rc<dyn ModuleReader>) {
        match self.readers.iter_mut().find(|(ext, _)| ext == extension) {
            Some(entry) => entry.1 = reader,
            None => self.readers.push((extension.to_string(), reader)),
        }
    }

    pub fn get_reader(&self, extension: &str) -> Option<Rc<dyn ModuleReader>> {
        self.readers
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, reader)| Rc::clone(reader))
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.readers.iter().map(|(ext, _)| ext.as_str())
    }

    pub fn get_cached(&self, module_path: &str) -> Option<ObjectRef> {
        let cached = self.cache.get(module_path).copied();
        if cached.is_some() {
            debug!(module = module_path, "module cache hit");
        }
        cached
    }

    pub fn cache_module(&mut self, module_path: &str, module: ObjectRef) {
        self.cache.insert(module_path.to_string(), module);
    }

    pub fn evict(&mut self, module_path: &str) -> Option<ObjectRef> {
        self.cache.remove(module_path)
    }

    /// Every cached module object. These are roots for the collector.
    pub fn cached_modules(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.cache.values().copied()
    }

    /// Finds the file for a dotted module path.
    ///
    /// Dots separate directories. When the final segment is a registered extension, only
    /// that extension is probed; otherwise every registered extension is tried in
    /// registration order inside every search path. The first regular file wins.
    pub fn resolve(&self, module_path: &str) -> Result<ResolvedModule, ModuleError> {
        let segments: Vec<&str> = module_path.split('.').collect();
        let explicit = match segments.as_slice() {
            [stem @ .., last] if !stem.is_empty() && self.get_reader(last).is_some() => {
                Some((stem, *last))
            }
            _ => None,
        };

        let (stem, extensions): (&[&str], Vec<&str>) = match explicit {
            Some((stem, extension)) => (stem, vec![extension]),
            None => (segments.as_slice(), self.extensions().collect()),
        };
        let base = stem.join("/");
        let name = stem.join(".");

        let mut probed = Vec::new();
        for directory in self.search_paths.iter() {
            for extension in extensions.iter() {
                let candidate = directory.join(format!("{base}.{extension}"));
                debug!(candidate = %candidate.display(), "probing for module");
                if candidate.is_file() {
                    let reader = self
                        .get_reader(extension)
                        .ok_or_else(|| ModuleError::NoReader {
                            extension: extension.to_string(),
                        })?;
                    return Ok(ResolvedModule {
                        file: absolute(&candidate),
                        name,
                        extension: extension.to_string(),
                        reader,
                    });
                }
                probed.push(candidate);
            }
        }

        // `a.b.ext` naming a file whose extension nobody reads
        if let [stem @ .., last] = segments.as_slice() {
            if explicit.is_none() && !stem.is_empty() {
                let base = stem.join("/");
                let exists = self
                    .search_paths
                    .iter()
                    .any(|directory| directory.join(format!("{base}.{last}")).is_file());
                if exists {
                    return Err(ModuleError::NoReader {
                        extension: last.to_string(),
                    });
                }
            }
        }

        Err(ModuleError::NotFound { probed })
    }
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_name_is_last_segment() {
        assert_eq!(binding_name("game.utils"), "utils");
        assert_eq!(binding_name("utils"), "utils");
    }

    #[test]
    fn default_readers_are_registered_in_order() {
        let loader = ModuleLoader::default();
        let extensions: Vec<&str> = loader.extensions().collect();
        assert_eq!(extensions.first(), Some(&"cube"));
        assert_eq!(extensions.len(), 12);
        assert!(loader.get_reader("glsl").is_some());
        assert!(loader.get_reader("txt").is_none());
    }

    #[test]
    fn register_reader_replaces_existing_extension() {
        let mut loader = ModuleLoader::default();
        loader.register_reader("py", Rc::new(SourceReader));
        loader.register_reader("txt", Rc::new(SourceReader));
        let extensions: Vec<&str> = loader.extensions().collect();
        assert_eq!(extensions.len(), 13);
        assert_eq!(extensions.last(), Some(&"txt"));
    }

    #[test]
    fn missing_module_lists_probed_files() {
        let loader = ModuleLoader::new(vec![PathBuf::from("does-not-exist")]);
        let Err(ModuleError::NotFound { probed }) = loader.resolve("nothing.here") else {
            panic!("expected a missing module");
        };
        assert_eq!(probed.len(), 12);
        assert_eq!(probed[0], PathBuf::from("does-not-exist/nothing/here.cube"));
    }

    #[test]
    fn explicit_extension_probes_only_that_extension() {
        let loader = ModuleLoader::new(vec![PathBuf::from("does-not-exist")]);
        let Err(ModuleError::NotFound { probed }) = loader.resolve("shaders.blur.glsl") else {
            panic!("expected a missing module");
        };
        assert_eq!(probed, vec![PathBuf::from("does-not-exist/shaders/blur.glsl")]);
    }
}
