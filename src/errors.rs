//! Shared error types for the library

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sensorkit operations
#[derive(Debug, Error)]
pub enum Error {
    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A builder was saved with missing or inconsistent data
    #[error("Validation error: {0}")]
    Validation(String),

    /// A text range does not fit inside the file it targets
    #[error("Range out of bounds in {file}: {detail}")]
    OutOfBounds { file: PathBuf, detail: String },

    /// The same result was saved twice for one analysis
    #[error("Duplicate {what}: {key}")]
    Duplicate { what: &'static str, key: String },

    /// Coverage was reported for a test case that was never saved
    #[error("Unknown test case {name:?} in {file}")]
    UnknownTestCase { file: PathBuf, name: String },

    /// Coverage report errors
    #[error("Coverage report error: {0}")]
    Coverage(String),

    /// A sensor returned an error during execution
    #[error("Sensor {name} failed")]
    Sensor {
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create a file system error with path context
    pub fn file_system(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a duplicate-save error
    pub fn duplicate(what: &'static str, key: impl Into<String>) -> Self {
        Self::Duplicate {
            what,
            key: key.into(),
        }
    }

    /// Create an out-of-bounds error for a range in a file
    pub fn out_of_bounds(file: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::OutOfBounds {
            file: file.into(),
            detail: detail.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_error_names_key() {
        let err = Error::duplicate("measure", "ncloc on src/lib.rs");
        assert_eq!(err.to_string(), "Duplicate measure: ncloc on src/lib.rs");
    }

    #[test]
    fn test_context_wraps_message() {
        let err: Result<()> = Err(Error::validation("no metric set"));
        let wrapped = err.context("saving measure");
        let msg = wrapped.unwrap_err().to_string();
        assert!(msg.starts_with("saving measure"));
        assert!(msg.contains("no metric set"));
    }
}
