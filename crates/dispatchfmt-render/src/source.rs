//! Where dispatch templates come from.
//!
//! A [`TemplateSource`] maps a dispatch name to its template text. The
//! engine asks for a template the first time it is rendered and caches it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::RenderError;

/// Resolves dispatch names to template text.
pub trait TemplateSource: Send + Sync {
    /// Returns the template for `name`, or `None` if there is none.
    fn load(&self, name: &str) -> Result<Option<String>, RenderError>;
}

/// Templates stored as files in one directory.
///
/// The dispatch `news` is read from `<dir>/news`, falling back to
/// `<dir>/news.txt`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, name: &str) -> [PathBuf; 2] {
        let exact = self.root.join(name);
        let with_extension = self.root.join(format!("{name}.txt"));
        [exact, with_extension]
    }
}

impl TemplateSource for DirectorySource {
    fn load(&self, name: &str) -> Result<Option<String>, RenderError> {
        let Some(path) = self.candidates(name).into_iter().find(|p| p.is_file()) else {
            tracing::debug!(dispatch = name, root = %self.root.display(), "no template file");
            return Ok(None);
        };

        let text = std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(dispatch = name, path = %path.display(), "loaded template");
        Ok(Some(text))
    }
}

/// Templates held in memory.
///
/// ```rust
/// use dispatchfmt_render::{MemorySource, TemplateSource};
///
/// let source = MemorySource::new().with("welcome", "Hello {{ name }}");
/// assert_eq!(source.load("welcome").unwrap().as_deref(), Some("Hello {{ name }}"));
/// assert!(source.load("missing").unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, replacing any with the same name.
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(name.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<N, T> FromIterator<(N, T)> for MemorySource
where
    N: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (name, text) in iter {
            source.insert(name, text);
        }
        source
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, name: &str) -> Result<Option<String>, RenderError> {
        Ok(self.templates.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn directory_source_reads_exact_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("news"), "exact").unwrap();
        std::fs::write(dir.path().join("news.txt"), "fallback").unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.load("news").unwrap().as_deref(), Some("exact"));
    }

    #[test]
    fn directory_source_falls_back_to_txt() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("news.txt"), "fallback").unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.load("news").unwrap().as_deref(), Some("fallback"));
    }

    #[test]
    fn directory_source_missing_template() {
        let dir = TempDir::new().unwrap();
        let source = DirectorySource::new(dir.path());
        assert!(source.load("news").unwrap().is_none());
    }

    #[test]
    fn directory_is_not_a_template() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("news")).unwrap();
        let source = DirectorySource::new(dir.path());
        assert!(source.load("news").unwrap().is_none());
    }

    #[test]
    fn memory_source_from_iter() {
        let source: MemorySource = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(source.len(), 2);
        assert_eq!(source.load("b").unwrap().as_deref(), Some("2"));
    }
}
