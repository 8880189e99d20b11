//! Loading complex formatter declarations from a named source.
//!
//! A complex formatter source is identified by a path. What "loading" means
//! is up to the [`FormatterSource`]: the bundled [`ModuleTable`] maps paths to
//! registration functions compiled into the binary; other implementations
//! may open plugins or read manifests. Either way the source only fills a
//! [`FormatterRegistry`]; compiling the result is the compiler's job.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::HandlerError;
use crate::registry::FormatterRegistry;

/// Failure reported by a [`FormatterSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Nothing is known at the requested path.
    #[error("source not found")]
    NotFound,

    /// The source exists but could not be loaded.
    #[error(transparent)]
    Failed(HandlerError),
}

/// Something that can declare complex formatters for a source path.
pub trait FormatterSource {
    /// Declares the formatters found at `path` into `registry`.
    fn load(&self, path: &Path, registry: &mut FormatterRegistry) -> Result<(), SourceError>;
}

impl<F> FormatterSource for F
where
    F: Fn(&Path, &mut FormatterRegistry) -> Result<(), SourceError>,
{
    fn load(&self, path: &Path, registry: &mut FormatterRegistry) -> Result<(), SourceError> {
        self(path, registry)
    }
}

type Module = Box<dyn Fn(&mut FormatterRegistry)>;

/// Static registration table from source paths to registration functions.
///
/// ```rust
/// use std::path::Path;
///
/// use dispatchfmt_bbparser::{
///     formatter_fn, ComplexCompiler, ModuleTable, RenderContext, TagOptions,
/// };
///
/// let modules = ModuleTable::new().module("formatters/basic", |registry| {
///     registry.register_handler(
///         "em",
///         TagOptions::new(),
///         formatter_fn(|_, value, _, _, _| Ok(format!("*{value}*"))),
///     );
/// });
///
/// let mut compiler = ComplexCompiler::new();
/// let parser = compiler.build(Path::new("formatters/basic"), &modules).unwrap();
/// assert_eq!(parser.format("[em]x[/em]", &RenderContext::new()).unwrap(), "*x*");
/// ```
#[derive(Default)]
pub struct ModuleTable {
    modules: HashMap<PathBuf, Module>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module, replacing any module already at `path`.
    pub fn module(
        mut self,
        path: impl Into<PathBuf>,
        register: impl Fn(&mut FormatterRegistry) + 'static,
    ) -> Self {
        self.insert(path, register);
        self
    }

    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        register: impl Fn(&mut FormatterRegistry) + 'static,
    ) {
        self.modules.insert(path.into(), Box::new(register));
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.modules.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl FormatterSource for ModuleTable {
    fn load(&self, path: &Path, registry: &mut FormatterRegistry) -> Result<(), SourceError> {
        let module = self.modules.get(path).ok_or(SourceError::NotFound)?;
        module(registry);
        Ok(())
    }
}

impl fmt::Debug for ModuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&PathBuf> = self.modules.keys().collect();
        paths.sort();
        f.debug_struct("ModuleTable")
            .field("modules", &paths)
            .finish()
    }
}
