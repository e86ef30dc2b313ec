use thiserror::Error;

use crate::types::PageId;

/// Coarse classification of every [`DatabaseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    SchemaMismatch,
    InvalidValue,
    Storage,
    Config,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table '{name}' already exists")]
    TableAlreadyExists { name: String },

    #[error("Duplicate clustering key {key} in page {page_id} of table '{table}'")]
    DuplicateKey {
        table: String,
        page_id: PageId,
        key: String,
    },

    #[error("Table '{name}' not found")]
    TableNotFound { name: String },

    #[error("Page {page_id} of table '{table}' not found")]
    PageNotFound { table: String, page_id: PageId },

    #[error("No page at position {position} in table '{table}'")]
    PagePositionOutOfBounds { table: String, position: usize },

    #[error("Tuple with clustering key {key} not found")]
    TupleNotFound { key: String },

    #[error("Column '{name}' not found in table '{table}'")]
    ColumnNotFound { name: String, table: String },

    #[error("Schema mismatch: {details}")]
    SchemaMismatch { details: String },

    #[error("Invalid value: {details}")]
    InvalidValue { details: String },

    #[error("Serialization/deserialization error: {details}")]
    SerializationError { details: String },

    #[error("Corrupted record at {path}: {reason}")]
    CorruptedRecord { path: String, reason: String },

    #[error("Invalid configuration: {details}")]
    InvalidConfig { details: String },
}

impl DatabaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::TableAlreadyExists { .. } | DatabaseError::DuplicateKey { .. } => {
                ErrorKind::AlreadyExists
            }
            DatabaseError::TableNotFound { .. }
            | DatabaseError::PageNotFound { .. }
            | DatabaseError::PagePositionOutOfBounds { .. }
            | DatabaseError::TupleNotFound { .. } => ErrorKind::NotFound,
            DatabaseError::ColumnNotFound { .. } | DatabaseError::SchemaMismatch { .. } => {
                ErrorKind::SchemaMismatch
            }
            DatabaseError::InvalidValue { .. } => ErrorKind::InvalidValue,
            DatabaseError::Io(_)
            | DatabaseError::SerializationError { .. }
            | DatabaseError::CorruptedRecord { .. } => ErrorKind::Storage,
            DatabaseError::InvalidConfig { .. } => ErrorKind::Config,
        }
    }

    pub fn schema_mismatch(details: impl Into<String>) -> Self {
        DatabaseError::SchemaMismatch {
            details: details.into(),
        }
    }

    pub fn invalid_value(details: impl Into<String>) -> Self {
        DatabaseError::InvalidValue {
            details: details.into(),
        }
    }
}

impl From<bincode::error::EncodeError> for DatabaseError {
    fn from(err: bincode::error::EncodeError) -> Self {
        DatabaseError::SerializationError {
            details: err.to_string(),
        }
    }
}

impl From<bincode::error::DecodeError> for DatabaseError {
    fn from(err: bincode::error::DecodeError) -> Self {
        DatabaseError::SerializationError {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::SerializationError {
            details: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
