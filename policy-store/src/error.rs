use thiserror::Error;

pub type Result<T> = std::result::Result<T, PolicyStoreError>;

#[derive(Error, Debug)]
pub enum PolicyStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlParsing(#[from] serde_yaml::Error),

    #[error("Policy directory does not exist: {0}")]
    MissingDirectory(String),

    #[error("Duplicate {record_type} id: {id}")]
    DuplicateId { record_type: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}
