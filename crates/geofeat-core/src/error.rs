//! Error types for all geofeat decoding operations.

use std::io;
use thiserror::Error;

use crate::types::AttributeType;

/// Top-level error type for geofeat operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// True if this error means the stream cursor can no longer be trusted.
    pub fn is_stream_corruption(&self) -> bool {
        matches!(self, Error::Stream(_))
    }

    /// True if this error was raised for an attribute type with no wire rule.
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, Error::Schema(SchemaError::UnsupportedType { .. }))
    }
}

/// The underlying byte stream is truncated or malformed.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected end of stream at byte {position}")]
    UnexpectedEof { position: u64 },

    #[error("varint longer than {max_bytes} bytes at byte {position}")]
    VarintOverflow { max_bytes: usize, position: u64 },

    #[error("int value {0} does not fit in 32 bits")]
    IntOutOfRange(i64),

    #[error("negative length prefix: {0}")]
    NegativeLength(i64),

    #[error("length prefix exceeds maximum of {max} bytes (got {actual})")]
    LengthTooLarge { max: usize, actual: u64 },

    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,

    #[error("invalid boolean byte: {0:#04x}")]
    InvalidBool(u8),

    #[error("UUID blob must be 16 bytes (got {0})")]
    InvalidUuidLength(usize),

    #[error("invalid geometry text: {0}")]
    InvalidGeometry(String),
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no decode/skip rule registered for attribute '{field}' of type {attribute_type}")]
    UnsupportedType {
        field: String,
        attribute_type: AttributeType,
    },

    #[error("schema invariant violated: {0}")]
    InvariantViolation(String),

    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("field at position {0} has an empty name")]
    EmptyFieldName(usize),

    #[error("unknown attribute type name: {0}")]
    UnknownTypeName(String),

    #[error("malformed schema spec: {0}")]
    MalformedSpec(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
