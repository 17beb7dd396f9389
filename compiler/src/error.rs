use brine_thrift_schema::ModelError;
use thiserror::Error;

/// Raised when literal text cannot be turned into a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    #[error("{0}")]
    Format(String),

    #[error("{0}")]
    Range(String),
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error reading {file}: {source}")]
    Io {
        file:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url:    String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{file}: parse error at line {line}, column {column}: {msg}")]
    ParseError {
        file:   String,
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("{file}: error at line {line}, column {column}: {source}")]
    ModelError {
        file:   String,
        line:   usize,
        column: usize,
        #[source]
        source: ModelError,
    },
}

impl CompileError {
    /// The file (or URL) the error was raised for.
    pub fn file(&self) -> &str {
        match self {
            CompileError::Io { file, .. }
            | CompileError::ParseError { file, .. }
            | CompileError::ModelError { file, .. } => file,
            CompileError::Fetch { url, .. } => url,
        }
    }
}
