//! Schema model: runtime-loaded type descriptors.
//!
//! This module contains:
//! - The descriptor tree ([`SchemaType`], [`Field`], [`RecordSchema`], ...)
//! - JSON loading and rendering
//! - A builder for record descriptors

pub mod builder;
pub mod parse;
pub mod types;

pub use builder::RecordSchemaBuilder;
pub use types::{
    EnumSchema, Field, FixedSchema, Kind, Primitive, RecordSchema, SchemaType, UnionSchema,
};
