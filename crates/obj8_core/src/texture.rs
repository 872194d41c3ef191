//! Texture path resolution.
//!
//! Texture directives name files relative to the OBJ's directory. Nothing is
//! loaded here; the resolver only probes which file exists, applying the
//! `.png` -> `.dds` fallback, and caches the answer per literal path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Extension tried when the literal path is missing, keyed by the original extension.
const FALLBACK_EXTENSIONS: &[(&str, &str)] = &[("png", "dds")];

/// Outcome of resolving one texture directive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TextureLookup {
    /// The literal path exists.
    Found(PathBuf),
    /// The literal path is missing but the fallback extension exists.
    Fallback(PathBuf),
    /// Neither exists.
    Missing,
}

impl TextureLookup {
    /// Path to use internally, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            TextureLookup::Found(p) | TextureLookup::Fallback(p) => Some(p),
            TextureLookup::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, TextureLookup::Missing)
    }
}

/// Resolves texture paths against a base directory.
#[derive(Debug, Default)]
pub struct TextureResolver {
    /// Directory relative paths are joined to
    base_dir: Option<PathBuf>,

    /// Previous lookups by literal path
    resolved: HashMap<String, TextureLookup>,
}

impl TextureResolver {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self {
            base_dir,
            resolved: HashMap::new(),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Resolve a literal texture path, trying the fallback extension.
    pub fn resolve(&mut self, literal: &str) -> TextureLookup {
        if let Some(lookup) = self.resolved.get(literal) {
            return lookup.clone();
        }

        let full_path = self.resolve_path(literal);
        let lookup = if full_path.is_file() {
            TextureLookup::Found(full_path)
        } else {
            match fallback_path(&full_path) {
                Some(alt) if alt.is_file() => {
                    log::debug!("Texture {} not found, using {}", literal, alt.display());
                    TextureLookup::Fallback(alt)
                }
                _ => TextureLookup::Missing,
            }
        };

        self.resolved.insert(literal.to_string(), lookup.clone());
        lookup
    }

    /// Number of distinct literals resolved so far.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    fn resolve_path(&self, literal: &str) -> PathBuf {
        let path = Path::new(literal);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

/// Same path with the documented fallback extension, if there is one.
fn fallback_path(path: &Path) -> Option<PathBuf> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    FALLBACK_EXTENSIONS
        .iter()
        .find(|(from, _)| *from == ext)
        .map(|(_, to)| path.with_extension(to))
}

/// Material name given to an object whose diffuse texture resolved.
pub fn material_name(object_name: &str) -> String {
    format!("Material_{}", object_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_found_literal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.png"), b"").unwrap();

        let mut resolver = TextureResolver::new(Some(dir.path().to_path_buf()));
        let lookup = resolver.resolve("foo.png");
        assert_eq!(lookup, TextureLookup::Found(dir.path().join("foo.png")));
    }

    #[test]
    fn test_png_falls_back_to_dds() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.dds"), b"").unwrap();

        let mut resolver = TextureResolver::new(Some(dir.path().to_path_buf()));
        let lookup = resolver.resolve("foo.png");
        assert_eq!(lookup, TextureLookup::Fallback(dir.path().join("foo.dds")));
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_missing_texture() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = TextureResolver::new(Some(dir.path().to_path_buf()));
        assert!(resolver.resolve("nothing.png").is_missing());
        // No fallback for other extensions
        fs::write(dir.path().join("other.png"), b"").unwrap();
        assert!(resolver.resolve("other.dds").is_missing());
    }

    #[test]
    fn test_material_name_from_object() {
        assert_eq!(material_name("cockpit"), "Material_cockpit");
    }
}
