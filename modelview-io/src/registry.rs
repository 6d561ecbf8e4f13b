//! Extension-based lookup of scene readers
//!
//! Each supported format implements [`SceneReader`]. The registry maps
//! lower-cased file extensions to readers so callers can open any
//! supported file without naming its format.

use std::collections::HashMap;
use std::path::Path;

use modelview_core::{Result, Scene};

use crate::error::ImportError;
use crate::gltf_reader::GltfReader;
use crate::obj_reader::ObjReader;

/// Trait for reading a scene graph from a file
pub trait SceneReader {
    /// Read the file at `path` into a scene without post-processing
    fn read_scene(&self, path: &Path) -> Result<Scene>;

    /// Get the format name this reader handles
    fn format_name(&self) -> &'static str;

    /// File extensions this reader claims, lower case without the dot
    fn extensions(&self) -> &'static [&'static str];
}

/// Registry of scene readers keyed by file extension
pub struct ImporterRegistry {
    readers: Vec<Box<dyn SceneReader>>,
    by_extension: HashMap<String, usize>,
}

impl ImporterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
            by_extension: HashMap::new(),
        }
    }

    /// Register a reader for every extension it claims.
    ///
    /// A later registration replaces an earlier one for the same extension.
    pub fn register(&mut self, reader: Box<dyn SceneReader>) {
        let index = self.readers.len();
        for extension in reader.extensions() {
            self.by_extension.insert(extension.to_lowercase(), index);
        }
        self.readers.push(reader);
    }

    /// Look up the reader for `path` by its extension
    pub fn reader_for(&self, path: &Path) -> std::result::Result<&dyn SceneReader, ImportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.by_extension
            .get(&extension)
            .map(|&index| self.readers[index].as_ref())
            .ok_or(ImportError::UnsupportedFormat { extension })
    }

    /// All registered extensions, sorted
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Whether some reader claims the extension of `path`
    pub fn can_read(&self, path: &Path) -> bool {
        self.reader_for(path).is_ok()
    }
}

impl Default for ImporterRegistry {
    /// Registry with the built-in OBJ and glTF readers
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ObjReader));
        registry.register(Box::new(GltfReader));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullReader;

    impl SceneReader for NullReader {
        fn read_scene(&self, _path: &Path) -> Result<Scene> {
            Ok(Scene::default())
        }

        fn format_name(&self) -> &'static str {
            "null"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["obj", "null"]
        }
    }

    #[test]
    fn test_default_extensions() {
        let registry = ImporterRegistry::default();
        assert_eq!(registry.supported_extensions(), vec!["glb", "gltf", "obj"]);
        assert!(registry.can_read(Path::new("model/backpack.OBJ")));
        assert_eq!(
            registry.reader_for(Path::new("a/b.glb")).unwrap().format_name(),
            "glTF"
        );
    }

    #[test]
    fn test_unknown_extension() {
        let registry = ImporterRegistry::default();
        let err = registry.reader_for(Path::new("scan.ply")).err().unwrap();
        assert!(matches!(err, ImportError::UnsupportedFormat { ref extension } if extension == "ply"));
        assert!(!registry.can_read(Path::new("no_extension")));
    }

    #[test]
    fn test_later_registration_wins() {
        let mut registry = ImporterRegistry::default();
        registry.register(Box::new(NullReader));
        assert_eq!(
            registry.reader_for(Path::new("x.obj")).unwrap().format_name(),
            "null"
        );
        assert_eq!(registry.supported_extensions().len(), 4);
    }
}
