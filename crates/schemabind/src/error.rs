//! Error types for binding, schema loading and snapshot encoding/decoding.

use thiserror::Error;

use crate::schema::Kind;

/// Error raised by a [`RowStore`](crate::store::RowStore) implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("no row or collection at {locator}")]
    NotFound { locator: String },

    #[error("store rejected {operation} at {locator}: {reason}")]
    Rejected {
        operation: &'static str,
        locator: String,
        reason: String,
    },

    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Error during a save, load or delete of a bound value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// A store operation was attempted on a value without a locator.
    /// Recoverable: bind a locator and retry.
    #[error("{context} requires a bound locator")]
    NotBound { context: &'static str },

    /// A schema kind that the backend cannot express. Indicates a schema
    /// or programming defect.
    #[error("unsupported schema kind {kind:?} in {context}")]
    UnsupportedType { kind: Kind, context: &'static str },

    #[error("value does not match schema in {context}: expected {expected:?}, found {found}")]
    TypeMismatch {
        expected: Kind,
        found: &'static str,
        context: &'static str,
    },

    #[error("union declares no {kind:?} branch named {name:?}")]
    BranchNotDeclared { kind: Kind, name: String },

    #[error("record has no field named {name:?}")]
    UnknownField { name: String },

    /// Snapshot counts are 32-bit slots.
    #[error("{context} has {len} entries, more than a snapshot count can hold")]
    CountOverflow { len: usize, context: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error while loading a schema descriptor from JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    InvalidJson(String),

    #[error("unknown type name {name:?}")]
    UnknownType { name: String },

    #[error("{context} is missing attribute {attribute:?}")]
    MissingAttribute {
        context: &'static str,
        attribute: &'static str,
    },

    #[error("attribute {attribute:?} of {context} has the wrong JSON type")]
    InvalidAttribute {
        context: &'static str,
        attribute: &'static str,
    },

    #[error("named type {name:?} is defined twice")]
    DuplicateName { name: String },

    #[error("named type {name:?} refers to itself")]
    RecursiveType { name: String },

    #[error("record {record:?} declares field {field:?} twice")]
    DuplicateField { record: String, field: String },

    #[error("a union cannot directly contain another union")]
    NestedUnion,

    #[error("{context} name {name:?} is not an identifier")]
    InvalidName { context: &'static str, name: String },
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::InvalidJson(e.to_string())
    }
}

/// Error during snapshot bundle decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("invalid magic bytes: expected SBND or SBNDZ, found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("unsupported bundle version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("invalid bool value: {value} (expected 0x00 or 0x01)")]
    InvalidBool { value: u8 },

    #[error("invalid slot tag: {tag}")]
    InvalidSlotTag { tag: u8 },

    #[error("slot {name:?} appears twice")]
    DuplicateSlot { name: String },

    #[error("int value {value} out of 32-bit range")]
    IntOutOfRange { value: i64 },

    #[error("{0} trailing bytes after bundle")]
    TrailingBytes(usize),

    #[error("zstd decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("decompressed size {actual} doesn't match declared {declared}")]
    UncompressedSizeMismatch { declared: usize, actual: usize },
}

/// Error during snapshot bundle encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("zstd compression failed: {0}")]
    CompressionFailed(String),
}
