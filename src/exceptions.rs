//! Error types for apkg

use std::fmt;

/// Main error type for apkg operations
#[derive(Debug)]
pub enum ApkgError {
    /// Package layout is broken (missing control folder or config file)
    Layout(String),

    /// Package metadata could not be parsed or uses an unsupported format version
    Metadata(String),

    /// A required metadata field is missing, empty, or malformed
    FieldValidation(String),

    /// Archiving a directory tree failed
    Archive(String),

    /// Container file is corrupt or incomplete
    ContainerFormat(String),

    /// Operation exists but is not supported
    Unsupported(String),

    /// IO error
    Io(std::io::Error),

    /// JSON parsing error
    Json(serde_json::Error),
}

impl fmt::Display for ApkgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApkgError::Layout(msg) => write!(f, "Invalid layout: {msg}"),
            ApkgError::Metadata(msg) => write!(f, "Invalid metadata: {msg}"),
            ApkgError::FieldValidation(msg) => write!(f, "Invalid field: {msg}"),
            ApkgError::Archive(msg) => write!(f, "Archive error: {msg}"),
            ApkgError::ContainerFormat(msg) => write!(f, "Container error: {msg}"),
            ApkgError::Unsupported(msg) => write!(f, "function not support: {msg}"),
            ApkgError::Io(err) => write!(f, "IO error: {err}"),
            ApkgError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for ApkgError {}

impl From<std::io::Error> for ApkgError {
    fn from(err: std::io::Error) -> Self {
        ApkgError::Io(err)
    }
}

impl From<serde_json::Error> for ApkgError {
    fn from(err: serde_json::Error) -> Self {
        ApkgError::Json(err)
    }
}

/// Result type for apkg operations
pub type Result<T> = std::result::Result<T, ApkgError>;
