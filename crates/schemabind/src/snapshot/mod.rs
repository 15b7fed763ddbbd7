//! Flat key-value snapshot containers.
//!
//! A snapshot container holds typed slots keyed by string names. Values are
//! written into one so that they survive a short process interruption, and
//! restored from it later using only names derived from schema + prefix.

pub mod bundle;

pub use bundle::Bundle;

use crate::locator::ResourceLocator;

/// Typed payload of one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    BooleanArray(Vec<bool>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
    BytesArray(Vec<Vec<u8>>),
    Locator(ResourceLocator),
}

impl SlotValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SlotValue::Boolean(_) => "boolean",
            SlotValue::Int(_) => "int",
            SlotValue::Long(_) => "long",
            SlotValue::Float(_) => "float",
            SlotValue::Double(_) => "double",
            SlotValue::String(_) => "string",
            SlotValue::Bytes(_) => "bytes",
            SlotValue::BooleanArray(_) => "boolean[]",
            SlotValue::IntArray(_) => "int[]",
            SlotValue::LongArray(_) => "long[]",
            SlotValue::FloatArray(_) => "float[]",
            SlotValue::DoubleArray(_) => "double[]",
            SlotValue::StringArray(_) => "string[]",
            SlotValue::BytesArray(_) => "bytes[]",
            SlotValue::Locator(_) => "locator",
        }
    }
}

macro_rules! typed_slot {
    ($put:ident, $get:ident, $variant:ident, $ty:ty) => {
        fn $put(&mut self, name: &str, value: $ty) {
            self.put_slot(name, SlotValue::$variant(value));
        }

        fn $get(&self, name: &str) -> Option<&$ty> {
            match self.slot(name) {
                Some(SlotValue::$variant(v)) => Some(v),
                _ => None,
            }
        }
    };
}

/// String-keyed store of typed slots.
///
/// Implementors provide [`put_slot`](Self::put_slot) and [`slot`](Self::slot);
/// the typed accessors are derived from them. A typed getter returns `None`
/// both for a missing slot and for a slot of another type.
pub trait SnapshotContainer {
    fn put_slot(&mut self, name: &str, value: SlotValue);

    fn slot(&self, name: &str) -> Option<&SlotValue>;

    fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    typed_slot!(put_boolean, get_boolean, Boolean, bool);
    typed_slot!(put_int, get_int, Int, i32);
    typed_slot!(put_long, get_long, Long, i64);
    typed_slot!(put_float, get_float, Float, f32);
    typed_slot!(put_double, get_double, Double, f64);
    typed_slot!(put_string, get_string, String, String);
    typed_slot!(put_bytes, get_bytes, Bytes, Vec<u8>);
    typed_slot!(put_boolean_array, get_boolean_array, BooleanArray, Vec<bool>);
    typed_slot!(put_int_array, get_int_array, IntArray, Vec<i32>);
    typed_slot!(put_long_array, get_long_array, LongArray, Vec<i64>);
    typed_slot!(put_float_array, get_float_array, FloatArray, Vec<f32>);
    typed_slot!(put_double_array, get_double_array, DoubleArray, Vec<f64>);
    typed_slot!(put_string_array, get_string_array, StringArray, Vec<String>);
    typed_slot!(put_bytes_array, get_bytes_array, BytesArray, Vec<Vec<u8>>);
    typed_slot!(put_locator, get_locator, Locator, ResourceLocator);
}
