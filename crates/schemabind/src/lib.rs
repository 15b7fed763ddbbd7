//! schemabind: schema-driven persistence of structured values.
//!
//! Values whose shape is described by a runtime-loaded schema are bound to
//! hierarchical resource locators and persisted through a row-oriented
//! store, or snapshotted into a flat string-keyed container that survives
//! short process interruptions.
//!
//! # Quick Start
//!
//! ```rust
//! use schemabind::{BoundValue, MemoryStore, RecordValue, ResourceLocator, SchemaType};
//!
//! let schema = SchemaType::parse_json(
//!     r#"{"type": "record", "name": "Person", "fields": [
//!         {"name": "age", "type": "int"},
//!         {"name": "tags", "type": {"type": "array", "items": "string"}}
//!     ]}"#,
//! )
//! .unwrap();
//!
//! let mut tags = schemabind::ArrayValue::of(SchemaType::STRING);
//! tags.push("x").unwrap();
//! tags.push("y").unwrap();
//!
//! let at = ResourceLocator::new("people/1");
//! let mut person = RecordValue::for_schema(&schema)
//!     .unwrap()
//!     .with("age", 30)
//!     .unwrap()
//!     .with("tags", tags)
//!     .unwrap()
//!     .with_locator(at.clone());
//!
//! let mut store = MemoryStore::new();
//! person.save(&mut store, "").unwrap();
//!
//! let mut loaded = RecordValue::for_schema(&schema).unwrap().with_locator(at);
//! loaded.load(&mut store, "").unwrap();
//! assert_eq!(loaded, person);
//! ```
//!
//! # Modules
//!
//! - [`schema`]: Type descriptors, JSON loading, record builder
//! - [`value`]: Record, Array, Map and Union values and their binding lifecycle
//! - [`store`]: The row store interface and an in-memory implementation
//! - [`snapshot`]: Snapshot containers and the in-memory [`Bundle`]
//! - [`codec`]: Binary encoding of bundles, with optional zstd compression
//! - [`naming`]: Deterministic slot and column names
//! - [`facade`]: Record model with dirty tracking, and per-field accessors
//! - [`error`]: Error types
//! - [`limits`]: Wire-format constants and decoder limits
//!
//! # Logging
//!
//! The crate emits `tracing` events (composite save/load/delete at `debug`,
//! individual columns and slots at `trace`, store read anomalies at `warn`)
//! and never installs a subscriber.

pub mod codec;
pub mod error;
pub mod facade;
pub mod limits;
pub mod locator;
pub mod naming;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod value;

// Re-export commonly used types at crate root
pub use codec::{
    decode_bundle, encode_bundle, encode_bundle_compressed, encode_bundle_with_options,
    EncodeOptions,
};
pub use error::{BindError, DecodeError, EncodeError, SchemaError, StoreError};
pub use facade::{FieldAccessor, FieldChange, RecordModel, ValueAccessor};
pub use locator::{ResourceLocator, RowId};
pub use schema::{Field, Kind, RecordSchemaBuilder, SchemaType};
pub use snapshot::{Bundle, SlotValue, SnapshotContainer};
pub use store::{Datum, MemoryStore, Row, RowStore, StoredRow};
pub use value::{ArrayValue, Binding, BoundValue, MapValue, RecordValue, UnionValue, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
