//! Error types for dispatch rendering.
//!
//! [`RenderError`] covers every stage: loading configuration, rendering the
//! template and formatting the markup. Template engine errors are mapped by
//! kind so callers never match on MiniJinja types.

use std::path::PathBuf;

use dispatchfmt_bbparser::{BuildError, FormatError};

/// Error type for rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Template syntax error or failure while evaluating it.
    #[error("template error: {0}")]
    Template(String),

    /// No template source knows the requested name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// A markup formatter failed on the rendered text.
    #[error("markup error: {0}")]
    Markup(#[from] FormatError),

    /// The markup pipeline could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The simple formatter config file does not exist.
    #[error("simple formatter config file not found at \"{}\"", path.display())]
    ConfigNotFound { path: PathBuf },

    /// A template variable file does not exist.
    #[error("template variable file \"{}\" not found", path.display())]
    VarsNotFound { path: PathBuf },

    /// A config or variable file could not be deserialized.
    #[error("failed to parse \"{}\": {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// A group named by `--people-info-group` is not a template variable.
    #[error("people info variable group \"{0}\" not found")]
    PeopleInfoGroupNotFound(String),

    /// A group named by `--personnel-group` is not a template variable.
    #[error("personnel variable group \"{0}\" not found")]
    PersonnelGroupNotFound(String),

    /// A personnel entry names someone absent from every people info group.
    #[error("info for person \"{0}\" not found")]
    PersonNotFound(String),

    /// A people info or personnel group does not have the expected shape.
    #[error("variable group \"{group}\" is invalid: {reason}")]
    InvalidVarGroup { group: String, reason: String },

    #[error("I/O error on \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Other template engine failure.
    #[error("{0}")]
    Operation(String),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(err.to_string()),
            ErrorKind::SyntaxError
            | ErrorKind::BadEscape
            | ErrorKind::UndefinedError
            | ErrorKind::UnknownTest
            | ErrorKind::UnknownFunction
            | ErrorKind::UnknownFilter
            | ErrorKind::UnknownMethod
            | ErrorKind::MissingArgument
            | ErrorKind::TooManyArguments
            | ErrorKind::InvalidOperation => RenderError::Template(err.to_string()),
            _ => RenderError::Operation(err.to_string()),
        }
    }
}
