//! Pending complex formatter declarations.
//!
//! A [`FormatterRegistry`] collects formatter types and their options while a
//! formatter source is being loaded, then turns them into handler instances
//! in one [`drain`](FormatterRegistry::drain). The registry is an explicit
//! value owned by whoever compiles, so declarations from one compile can
//! never leak into another.
//!
//! ```rust
//! use dispatchfmt_bbparser::{
//!     ComplexFormatter, FormatterRegistry, HandlerError, ParentTag, RenderContext,
//!     TagAttributes, TagOptions,
//! };
//!
//! #[derive(Default)]
//! struct Shout;
//!
//! impl ComplexFormatter for Shout {
//!     fn format(
//!         &self,
//!         _tag: &str,
//!         value: &str,
//!         _options: &TagAttributes,
//!         _parent: Option<ParentTag<'_>>,
//!         _context: &RenderContext,
//!     ) -> Result<String, HandlerError> {
//!         Ok(value.to_uppercase())
//!     }
//! }
//!
//! let mut registry = FormatterRegistry::new();
//! registry.register::<Shout>("shout", TagOptions::new());
//!
//! let formatters = registry.drain().unwrap();
//! assert_eq!(formatters.len(), 1);
//! assert!(registry.is_empty());
//! ```

use crate::error::{FormatterLoadError, HandlerError};
use crate::formatter::ComplexFormatter;
use crate::options::TagOptions;
use crate::tokenizer::is_valid_tag_name;

type Constructor = Box<dyn FnOnce() -> Result<Box<dyn ComplexFormatter>, HandlerError>>;

struct PendingFormatter {
    tag_name: String,
    options: TagOptions,
    type_name: &'static str,
    construct: Constructor,
}

/// A complex formatter ready to be added to a parser.
pub struct LoadedFormatter {
    pub tag_name: String,
    pub options: TagOptions,
    pub handler: Box<dyn ComplexFormatter>,
}

impl std::fmt::Debug for LoadedFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFormatter")
            .field("tag_name", &self.tag_name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Collects complex formatter declarations until they are drained.
#[derive(Default)]
pub struct FormatterRegistry {
    pending: Vec<PendingFormatter>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a formatter type built with `Default`.
    pub fn register<F>(&mut self, tag_name: impl Into<String>, options: TagOptions) -> &mut Self
    where
        F: ComplexFormatter + Default + 'static,
    {
        self.register_with(tag_name, options, || Ok(F::default()))
    }

    /// Declares a formatter built by a fallible constructor.
    ///
    /// The constructor runs during [`drain`](Self::drain); its error aborts
    /// the drain with [`FormatterLoadError::Construct`].
    pub fn register_with<F, C>(
        &mut self,
        tag_name: impl Into<String>,
        options: TagOptions,
        construct: C,
    ) -> &mut Self
    where
        F: ComplexFormatter + 'static,
        C: FnOnce() -> Result<F, HandlerError> + 'static,
    {
        self.pending.push(PendingFormatter {
            tag_name: tag_name.into(),
            options,
            type_name: std::any::type_name::<F>(),
            construct: Box::new(move || {
                construct().map(|f| Box::new(f) as Box<dyn ComplexFormatter>)
            }),
        });
        self
    }

    /// Declares an existing handler value, such as a closure.
    pub fn register_handler<F>(
        &mut self,
        tag_name: impl Into<String>,
        options: TagOptions,
        handler: F,
    ) -> &mut Self
    where
        F: ComplexFormatter + 'static,
    {
        self.register_with(tag_name, options, move || Ok(handler))
    }

    /// Number of pending declarations.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending tag names in declaration order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|p| p.tag_name.as_str())
    }

    /// Drops all pending declarations.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Instantiates every pending formatter, in declaration order.
    ///
    /// The registry is empty afterwards whether or not this succeeds. When a
    /// tag name is declared twice the later declaration replaces the earlier
    /// one in place.
    pub fn drain(&mut self) -> Result<Vec<LoadedFormatter>, FormatterLoadError> {
        let pending = std::mem::take(&mut self.pending);
        let mut loaded: Vec<LoadedFormatter> = Vec::with_capacity(pending.len());

        for entry in pending {
            let tag_name = entry.tag_name.trim().to_lowercase();
            if !is_valid_tag_name(&tag_name) {
                return Err(FormatterLoadError::InvalidTagName {
                    tag: entry.tag_name,
                    type_name: entry.type_name,
                });
            }

            let handler = (entry.construct)().map_err(|source| FormatterLoadError::Construct {
                tag: tag_name.clone(),
                type_name: entry.type_name,
                source,
            })?;
            tracing::debug!(
                tag = %tag_name,
                formatter = entry.type_name,
                "initialized complex formatter"
            );

            let formatter = LoadedFormatter {
                tag_name,
                options: entry.options,
                handler,
            };
            match loaded.iter().position(|f| f.tag_name == formatter.tag_name) {
                Some(pos) => {
                    tracing::warn!(
                        tag = %formatter.tag_name,
                        "complex formatter declared twice, keeping the last"
                    );
                    loaded[pos] = formatter;
                }
                None => loaded.push(formatter),
            }
        }

        Ok(loaded)
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("pending", &self.tag_names().collect::<Vec<_>>())
            .finish()
    }
}
