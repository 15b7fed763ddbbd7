//! In-memory values and their binding to storage.
//!
//! Scalars are plain [`Value`] variants. Records, arrays, maps and unions
//! carry their schema and an optional resource locator, and implement
//! [`BoundValue`].

pub mod array;
pub mod binding;
pub(crate) mod dispatch;
pub mod map;
pub mod record;
pub(crate) mod scalar;
pub mod union;

pub use array::ArrayValue;
pub use binding::{Binding, BoundValue};
pub use map::MapValue;
pub use record::RecordValue;
pub use union::UnionValue;

use crate::error::BindError;
use crate::schema::{Kind, SchemaType};

/// A value conforming to some [`SchemaType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Enum(String),
    Fixed(Vec<u8>),
    Record(RecordValue),
    Array(ArrayValue),
    Map(MapValue),
    Union(Box<UnionValue>),
}

impl Value {
    /// Returns the empty value for `schema`: an unbound empty composite, or
    /// `Null` for scalars.
    pub fn empty_for(schema: &SchemaType) -> Value {
        match schema {
            SchemaType::Record(r) => Value::Record(RecordValue::new(r.clone())),
            SchemaType::Array(e) => Value::Array(ArrayValue::new(e.clone())),
            SchemaType::Map(v) => Value::Map(MapValue::new(v.clone())),
            SchemaType::Union(u) => Value::Union(Box::new(UnionValue::new(u.clone()))),
            _ => Value::Null,
        }
    }

    /// Short name of the variant, used in mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Fixed(_) => "fixed",
            Value::Record(_) => "record",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Union(_) => "union",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is a valid instance of `schema`.
    ///
    /// The check is shallow for composites: their schema must equal
    /// `schema`, and their contents were checked when they were built.
    pub fn conforms_to(&self, schema: &SchemaType) -> bool {
        match (self, schema) {
            (Value::Null, s) => s.kind() == Kind::Null,
            (Value::Boolean(_), s) => s.kind() == Kind::Boolean,
            (Value::Int(_), s) => s.kind() == Kind::Int,
            (Value::Long(_), s) => s.kind() == Kind::Long,
            (Value::Float(_), s) => s.kind() == Kind::Float,
            (Value::Double(_), s) => s.kind() == Kind::Double,
            (Value::String(_), s) => s.kind() == Kind::String,
            (Value::Bytes(_), s) => s.kind() == Kind::Bytes,
            (Value::Enum(symbol), SchemaType::Enum(e)) => e.has_symbol(symbol),
            (Value::Fixed(bytes), SchemaType::Fixed(f)) => bytes.len() == f.size,
            (Value::Record(r), s) => r.schema() == s,
            (Value::Array(a), s) => a.schema() == s,
            (Value::Map(m), s) => m.schema() == s,
            (Value::Union(u), s) => u.schema() == s,
            _ => false,
        }
    }

    /// Checks that the value can be stored where `schema` is declared.
    /// `Null` means "unset" and is accepted for scalars only; an unset
    /// composite is its empty value.
    pub(crate) fn check(
        &self,
        schema: &SchemaType,
        context: &'static str,
    ) -> Result<(), BindError> {
        if (self.is_null() && !schema.is_composite()) || self.conforms_to(schema) {
            Ok(())
        } else {
            Err(BindError::TypeMismatch {
                expected: schema.kind(),
                found: self.type_name(),
                context,
            })
        }
    }

    pub fn as_bound(&self) -> Option<&dyn BoundValue> {
        match self {
            Value::Record(r) => Some(r),
            Value::Array(a) => Some(a),
            Value::Map(m) => Some(m),
            Value::Union(u) => Some(u.as_ref()),
            _ => None,
        }
    }

    pub fn as_bound_mut(&mut self) -> Option<&mut dyn BoundValue> {
        match self {
            Value::Record(r) => Some(r),
            Value::Array(a) => Some(a),
            Value::Map(m) => Some(m),
            Value::Union(u) => Some(u.as_mut()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut RecordValue> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionValue> {
        match self {
            Value::Union(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i as i64),
            Value::Long(l) => Some(*l),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(l: i64) -> Self {
        Value::Long(l)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<RecordValue> for Value {
    fn from(r: RecordValue) -> Self {
        Value::Record(r)
    }
}

impl From<ArrayValue> for Value {
    fn from(a: ArrayValue) -> Self {
        Value::Array(a)
    }
}

impl From<MapValue> for Value {
    fn from(m: MapValue) -> Self {
        Value::Map(m)
    }
}

impl From<UnionValue> for Value {
    fn from(u: UnionValue) -> Self {
        Value::Union(Box::new(u))
    }
}

/// Converts a collection length to the `int` stored in its count slot.
pub(crate) fn snapshot_count(len: usize, context: &'static str) -> Result<i32, BindError> {
    i32::try_from(len).map_err(|_| BindError::CountOverflow { len, context })
}
