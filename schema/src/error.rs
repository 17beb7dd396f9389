use thiserror::Error;

/// Semantic errors raised while a model is being built. Any of these is
/// fatal to the model under construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Model \"{0}\" already exists")]
    DuplicateModel(String),

    #[error("Model \"{0}\" is included recursively")]
    CircularInclude(String),

    #[error("Type \"{0}\" already registered")]
    TypeAlreadyRegistered(String),

    #[error("Name \"{name}\" already defined by {by}")]
    NameAlreadyDefined { name: String, by: String },

    #[error("Duplicate namespace defined for generator \"{0}\"")]
    DuplicateNamespace(String),

    #[error("Duplicate field id ({id}) in \"{owner}\"")]
    DuplicateFieldId { id: i16, owner: String },

    #[error("Duplicate field name \"{name}\" in \"{owner}\"")]
    DuplicateFieldName { name: String, owner: String },

    #[error("Duplicate enum element name \"{name}\" in enum \"{owner}\"")]
    DuplicateEnumName { name: String, owner: String },

    #[error("Duplicate enum element id ({id}) in enum \"{owner}\"")]
    DuplicateEnumId { id: i32, owner: String },

    #[error("Enum element ids exhausted in enum \"{0}\"")]
    EnumIdOverflow(String),

    #[error("Duplicate function name \"{name}\" in \"{owner}\"")]
    DuplicateFunction { name: String, owner: String },

    #[error("Value outside range of type {ty}: {value}")]
    OutOfRange { ty: String, value: String },

    #[error("Value exceeds precision of double: {0}")]
    PrecisionLoss(i64),

    #[error("null not permitted for type {0}")]
    NullNotPermitted(String),

    #[error("Illegal value for type {ty}: {value}")]
    IllegalValue { ty: String, value: String },

    #[error("Object \"{name}\" is not a service: {found}")]
    NotAService { name: String, found: String },

    #[error("Service \"{0}\" not defined")]
    UnknownService(String),
}
