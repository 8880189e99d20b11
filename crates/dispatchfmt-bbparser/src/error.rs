//! Error types for building and running tag parsers.
//!
//! Errors fall into two phases. Build-time errors ([`ConfigError`],
//! [`FormatterLoadError`], wrapped together as [`BuildError`]) abort
//! construction of a parser; no partial parser is ever returned. Format-time
//! errors ([`FormatError`]) come from handlers and propagate to the caller of
//! `format` untouched.
//!
//! Unregistered tags are never an error: they pass through as literal text.

use std::path::PathBuf;

/// Error type returned by complex formatter handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration problems the user can fix.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The complex formatter source path is unknown to the loader.
    #[error("complex formatter source file not found at \"{}\"", path.display())]
    SourceNotFound { path: PathBuf },

    /// The loader found the source but failed to run it.
    #[error("failed to load complex formatter source \"{}\": {source}", path.display())]
    SourceFailed {
        path: PathBuf,
        #[source]
        source: HandlerError,
    },

    /// A simple formatter entry has no `format_string`.
    #[error("simple formatter \"{tag}\" has no format_string")]
    MissingFormatString { tag: String },

    /// A simple formatter is keyed by a name the tokenizer can never match.
    #[error("invalid tag name \"{tag}\" for simple formatter")]
    InvalidTagName { tag: String },

    /// A simple formatter template could not be compiled.
    #[error("invalid format_string for simple formatter \"{tag}\": {reason}")]
    InvalidTemplate { tag: String, reason: String },
}

/// A registered complex formatter could not be turned into a handler.
#[derive(Debug, thiserror::Error)]
pub enum FormatterLoadError {
    /// The tag name cannot be matched by the tokenizer.
    #[error("formatter {type_name} was registered with invalid tag name \"{tag}\"")]
    InvalidTagName {
        tag: String,
        type_name: &'static str,
    },

    /// The handler constructor failed.
    #[error("failed to initialize formatter {type_name} for tag \"{tag}\": {source}")]
    Construct {
        tag: String,
        type_name: &'static str,
        #[source]
        source: HandlerError,
    },
}

/// Any error that aborts building a parser.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    FormatterLoad(#[from] FormatterLoadError),
}

/// Errors raised while formatting text.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// A complex formatter handler failed.
    #[error("formatter for tag \"{tag}\" failed: {source}")]
    Handler {
        tag: String,
        #[source]
        source: HandlerError,
    },

    /// A simple template references an attribute the tag does not carry.
    #[error("tag \"{tag}\" has no attribute \"{key}\" required by its format_string")]
    MissingTemplateKey { tag: String, key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_not_found_names_path() {
        let err = ConfigError::SourceNotFound {
            path: PathBuf::from("fmt/complex.rs"),
        };
        assert!(err.to_string().contains("fmt/complex.rs"));
    }

    #[test]
    fn load_error_names_type() {
        let err = FormatterLoadError::InvalidTagName {
            tag: "a]b".to_string(),
            type_name: "my::Formatter",
        };
        let msg = err.to_string();
        assert!(msg.contains("my::Formatter"));
        assert!(msg.contains("a]b"));
    }

    #[test]
    fn build_error_is_transparent() {
        let err: BuildError = ConfigError::MissingFormatString {
            tag: "b".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "simple formatter \"b\" has no format_string"
        );
    }
}
