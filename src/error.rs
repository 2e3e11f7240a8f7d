//! Error types for the state-space enumeration and simulation engine.

use thiserror::Error;

/// Result type used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;

/// Comprehensive error taxonomy, grouped by cause rather than by carrier
/// Validation and state errors are meant to fail fast; domain
/// errors raised while evaluating an expression unwind the firing step that
/// triggered them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// User-supplied structural input is invalid (bad identifier, negative
    /// multiplicity, unknown place referenced by a post-updater).
    #[error("validation error: {0}")]
    Validation(String),

    /// Expression lexing failed.
    #[error("lex error at {row}:{col}: {message}")]
    Lex {
        row: usize,
        col: usize,
        message: String,
    },

    /// Expression parsing failed.
    #[error("parse error at {row}:{col}: {message}")]
    Parse {
        row: usize,
        col: usize,
        message: String,
    },

    /// Expression evaluation hit an illegal operation (type mismatch,
    /// non-integer assignment in a `PostUpdater`, unbound identifier).
    #[error("runtime value error: {0}")]
    Runtime(String),

    /// An engine invariant was violated.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// A numeric precondition was violated (underflow, bad reset-set
    /// reference, partition masses not summing to 1).
    #[error("domain error: {0}")]
    Domain(String),

    /// A sampler that reads a file failed to do so.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

/// Engine invariant violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// An attempt was made to add a succession whose parent state is not yet
    /// bound to a node in the graph.
    #[error("dangling parent: succession's parent state is not in the graph")]
    DanglingParent,

    /// An attempt was made to set a second root on a `SuccessionGraph`.
    #[error("root already set")]
    RootAlreadySet,

    /// A required feature was absent on an object that needed it.
    #[error("missing feature: {0}")]
    MissingFeature(&'static str),

    /// A node identifier did not resolve to a node in the graph.
    #[error("unknown node")]
    UnknownNode,
}

/// A single (level, text) validation message, compared by value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationMessage {
    pub level: ValidationLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ValidationLevel {
    Error,
    Warning,
}

impl ValidationMessage {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: ValidationLevel::Error,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: ValidationLevel::Warning,
            text: text.into(),
        }
    }
}
