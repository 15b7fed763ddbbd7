//! Builder API for ergonomic record schema construction.
//!
//! # Example
//!
//! ```rust
//! use schemabind::schema::{RecordSchemaBuilder, SchemaType};
//!
//! let address = RecordSchemaBuilder::new("Address")
//!     .string("street")
//!     .int("number")
//!     .build()
//!     .unwrap();
//!
//! let person = RecordSchemaBuilder::new("Person")
//!     .int("age")
//!     .array("tags", SchemaType::STRING)
//!     .field("home", address)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(person.fields().unwrap().len(), 3);
//! ```

use crate::error::SchemaError;
use crate::schema::{Field, RecordSchema, SchemaType};

/// Builder for a record descriptor.
#[derive(Debug, Clone)]
pub struct RecordSchemaBuilder {
    name: String,
    fields: Vec<Field>,
    error: Option<SchemaError>,
}

impl RecordSchemaBuilder {
    /// Creates a builder for a record with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            error: None,
        }
    }

    /// Adds a field of any type.
    pub fn field(mut self, name: impl Into<String>, schema: SchemaType) -> Self {
        self.fields.push(Field::new(name, schema));
        self
    }

    // =========================================================================
    // Primitive Fields
    // =========================================================================

    pub fn boolean(self, name: impl Into<String>) -> Self {
        self.field(name, SchemaType::BOOLEAN)
    }

    pub fn int(self, name: impl Into<String>) -> Self {
        self.field(name, SchemaType::INT)
    }

    pub fn long(self, name: impl Into<String>) -> Self {
        self.field(name, SchemaType::LONG)
    }

    pub fn float(self, name: impl Into<String>) -> Self {
        self.field(name, SchemaType::FLOAT)
    }

    pub fn double(self, name: impl Into<String>) -> Self {
        self.field(name, SchemaType::DOUBLE)
    }

    pub fn string(self, name: impl Into<String>) -> Self {
        self.field(name, SchemaType::STRING)
    }

    pub fn bytes(self, name: impl Into<String>) -> Self {
        self.field(name, SchemaType::BYTES)
    }

    // =========================================================================
    // Composite Fields
    // =========================================================================

    /// Adds an array field with the given element type.
    pub fn array(self, name: impl Into<String>, element: SchemaType) -> Self {
        self.field(name, SchemaType::array(element))
    }

    /// Adds a string-keyed map field with the given value type.
    pub fn map(self, name: impl Into<String>, value: SchemaType) -> Self {
        self.field(name, SchemaType::map(value))
    }

    /// Adds a union field. An invalid branch list is reported by [`build`](Self::build).
    pub fn union(mut self, name: impl Into<String>, branches: Vec<SchemaType>) -> Self {
        match SchemaType::union(branches) {
            Ok(schema) => self.field(name, schema),
            Err(e) => {
                self.error.get_or_insert(e);
                self
            }
        }
    }

    /// Builds the record descriptor.
    pub fn build(self) -> Result<SchemaType, SchemaError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(SchemaType::record(RecordSchema::new(self.name, self.fields)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Kind;

    #[test]
    fn test_builder_preserves_field_order() {
        let schema = RecordSchemaBuilder::new("Person")
            .int("age")
            .string("name")
            .map("scores", SchemaType::DOUBLE)
            .build()
            .unwrap();

        let names: Vec<&str> = schema
            .fields()
            .unwrap()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["age", "name", "scores"]);
    }

    #[test]
    fn test_builder_union_field() {
        let schema = RecordSchemaBuilder::new("Event")
            .long("at")
            .union("payload", vec![SchemaType::NULL, SchemaType::STRING])
            .field("extra", SchemaType::BYTES)
            .build()
            .unwrap();
        assert_eq!(schema.fields().unwrap()[1].schema.kind(), Kind::Union);
    }

    #[test]
    fn test_builder_reports_invalid_union() {
        let result = RecordSchemaBuilder::new("Bad")
            .union("u", vec![SchemaType::INT, SchemaType::INT])
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateName { .. })));
    }

    #[test]
    fn test_builder_rejects_duplicate_fields() {
        let result = RecordSchemaBuilder::new("Dup").int("a").long("a").build();
        assert!(matches!(result, Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn test_builder_rejects_names_that_collide_with_derived_slots() {
        let result = RecordSchemaBuilder::new("Counts")
            .int("x.count")
            .array("x", SchemaType::INT)
            .build();
        assert_eq!(
            result,
            Err(SchemaError::InvalidName {
                context: "field",
                name: "x.count".to_string(),
            })
        );
    }
}
