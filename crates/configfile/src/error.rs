//! Error types for configuration access, conversion and file handling.

use std::path::PathBuf;

use thiserror::Error;

use crate::ParseError;

/// The logical type a raw value was being read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Signed integer (`i64`).
    Int,
    /// Floating point (`f64`).
    Real,
    /// Single character.
    Char,
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarKind::Int => write!(f, "integer"),
            ScalarKind::Real => write!(f, "real"),
            ScalarKind::Char => write!(f, "character"),
        }
    }
}

/// A raw value could not be read as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read {raw:?} as {kind}")]
pub struct ConversionError {
    /// The type that was requested.
    pub kind: ScalarKind,
    /// The raw (escaped) text that failed to convert.
    pub raw: String,
}

impl ConversionError {
    pub(crate) fn new(kind: ScalarKind, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
        }
    }
}

/// Errors produced by [`Config`](crate::Config) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be opened for reading.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Any other I/O failure, including truncated binary input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The text input is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A name does not match `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid variable name {name:?}")]
    InvalidName { name: String },

    /// Programmatic insertion of a name that is already present.
    #[error("variable `{name}` already exists")]
    AlreadyExists { name: String },

    /// Access, update or removal of a name that is not present.
    #[error("variable `{name}` not found")]
    NotFound { name: String },

    /// A stored value could not be read as the requested type.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Nesting `name` would put blocks deeper than [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("nesting `{name}` exceeds {limit} levels", limit = crate::MAX_DEPTH)]
    TooDeep { name: String },

    /// Binary input decoded to something that is not a configuration.
    #[error("corrupt binary configuration: {reason}")]
    CorruptBinary { reason: String },
}

impl Error {
    pub(crate) fn not_found(name: &str) -> Self {
        Error::NotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn already_exists(name: &str) -> Self {
        Error::AlreadyExists {
            name: name.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
