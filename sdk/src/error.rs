use brine_thrift_compiler::CompileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// The genspec could not be located.
    #[error("Genspec error: {0}")]
    Genspec(String),

    /// A model or genspec failed to parse.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A generator entry is missing something it needs. The entry is skipped.
    #[error("{0}")]
    Config(String),

    #[error("Invalid generator \"{name}\" specified for target[generator] = {id} (known: {known})")]
    UnknownGenerator { name: String, id: String, known: String },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Backend(String),
}

impl GenError {
    /// Configuration problems are reported as warnings and only skip the
    /// current generator entry.
    pub fn is_config(&self) -> bool {
        matches!(self, GenError::Config(_))
    }

    /// Errors that end the whole run: a model or genspec that cannot be
    /// trusted to drive any generator.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GenError::Genspec(_) | GenError::Compile(_))
    }
}
