//! Font data providers
//!
//! The engine asks for its font once, at construction, by symbolic name and
//! keeps the returned bytes alive for its whole lifetime: faces are built
//! from them lazily, per overlay type.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of raw font file bytes
pub trait FontProvider {
    /// Return the bytes for `name`, or `None` if the font is unavailable.
    fn load(&self, name: &str) -> Option<Arc<[u8]>>;
}

/// Looks fonts up by file name in an ordered list of directories
///
/// Absolute names are read directly.
#[derive(Debug, Clone, Default)]
pub struct FontDirectory {
    dirs: Vec<PathBuf>,
}

impl FontDirectory {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Search directories in priority order
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn candidates<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = PathBuf> + 'a> {
        let path = Path::new(name);
        if path.is_absolute() {
            Box::new(std::iter::once(path.to_path_buf()))
        } else {
            Box::new(self.dirs.iter().map(move |dir| dir.join(name)))
        }
    }
}

impl FontProvider for FontDirectory {
    fn load(&self, name: &str) -> Option<Arc<[u8]>> {
        for path in self.candidates(name) {
            if !path.is_file() {
                continue;
            }
            match std::fs::read(&path) {
                Ok(bytes) if bytes.is_empty() => {
                    tracing::warn!("Font file {} is empty", path.display());
                }
                Ok(bytes) => {
                    tracing::debug!("Loaded font {} ({} bytes)", path.display(), bytes.len());
                    return Some(bytes.into());
                }
                Err(e) => {
                    tracing::warn!("Failed to read font {}: {}", path.display(), e);
                }
            }
        }
        tracing::debug!("Font {} not found in {} directories", name, self.dirs.len());
        None
    }
}

/// A single in-memory font, served under one name
#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    name: String,
    data: Arc<[u8]>,
}

impl EmbeddedFont {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

impl EmbeddedFont {
    /// Name this font is served under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether there are any bytes to serve
    pub fn is_available(&self) -> bool {
        !self.data.is_empty()
    }
}

impl FontProvider for EmbeddedFont {
    fn load(&self, name: &str) -> Option<Arc<[u8]>> {
        (name == self.name && !self.data.is_empty()).then(|| Arc::clone(&self.data))
    }
}
