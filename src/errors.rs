//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for repo-quality operations
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

    /// Parsing errors (analyzer inputs, tool output, config files)
    #[error("Parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// Repository could not be cloned
    #[error("Clone of {url} failed: {message}")]
    Clone { url: String, message: String },

    /// External tool ran but failed
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// External tool is not installed
    #[error("{0} not found on PATH")]
    ToolUnavailable(String),

    /// External tool or clone exceeded its time budget
    #[error("{what} timed out after {secs}s")]
    Timeout { what: String, secs: u64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Analysis errors
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Git errors
    #[error(transparent)]
    Git(#[from] git2::Error),

    /// Directory walk errors
    #[error(transparent)]
    Walk(#[from] ignore::Error),
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

    /// Create a parse error for a file
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an external tool failure
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn timeout(what: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            secs,
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
