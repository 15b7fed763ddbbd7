//! Schema routing and scalar codecs shared by both backends.
//!
//! [`route`] is the single exhaustive match over schema kinds: every value
//! is either a scalar written inline, a composite with its own
//! save/load/delete, or a union resolved to one of its branches. Each
//! backend supplies a [`ScalarCodec`] for its cell type.

use crate::error::BindError;
use crate::schema::{EnumSchema, Kind, SchemaType, UnionSchema};
use crate::snapshot::SlotValue;
use crate::store::Datum;
use crate::value::Value;

/// Scalar kinds, with the schema details their codecs need.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scalar<'s> {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    Bytes,
    Enum(&'s EnumSchema),
    Fixed(usize),
}

impl Scalar<'_> {
    pub(crate) fn kind(self) -> Kind {
        match self {
            Scalar::Null => Kind::Null,
            Scalar::Boolean => Kind::Boolean,
            Scalar::Int => Kind::Int,
            Scalar::Long => Kind::Long,
            Scalar::Float => Kind::Float,
            Scalar::Double => Kind::Double,
            Scalar::String => Kind::String,
            Scalar::Bytes => Kind::Bytes,
            Scalar::Enum(_) => Kind::Enum,
            Scalar::Fixed(_) => Kind::Fixed,
        }
    }
}

/// How a schema node is persisted.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Route<'s> {
    Scalar(Scalar<'s>),
    /// Record, Array or Map: persisted through its own bound operations.
    Composite(Kind),
    Union(&'s UnionSchema),
}

pub(crate) fn route(schema: &SchemaType) -> Route<'_> {
    use crate::schema::Primitive;

    match schema {
        SchemaType::Primitive(p) => Route::Scalar(match p {
            Primitive::Null => Scalar::Null,
            Primitive::Boolean => Scalar::Boolean,
            Primitive::Int => Scalar::Int,
            Primitive::Long => Scalar::Long,
            Primitive::Float => Scalar::Float,
            Primitive::Double => Scalar::Double,
            Primitive::String => Scalar::String,
            Primitive::Bytes => Scalar::Bytes,
        }),
        SchemaType::Enum(e) => Route::Scalar(Scalar::Enum(e)),
        SchemaType::Fixed(f) => Route::Scalar(Scalar::Fixed(f.size)),
        SchemaType::Record(_) => Route::Composite(Kind::Record),
        SchemaType::Array(_) => Route::Composite(Kind::Array),
        SchemaType::Map(_) => Route::Composite(Kind::Map),
        SchemaType::Union(u) => Route::Union(u),
    }
}

pub(crate) fn mismatch(expected: Kind, found: &Value, context: &'static str) -> BindError {
    BindError::TypeMismatch {
        expected,
        found: found.type_name(),
        context,
    }
}

/// Per-backend conversion between scalar values and storage cells.
pub(crate) trait ScalarCodec {
    type Cell;

    /// Encodes a scalar. `None` means nothing needs to be written.
    fn encode(kind: Scalar<'_>, value: &Value) -> Result<Option<Self::Cell>, BindError>;

    /// Decodes a cell. `None` means the cell does not hold a value of `kind`.
    fn decode(kind: Scalar<'_>, cell: &Self::Cell) -> Option<Value>;
}

/// Row backend: one [`Datum`] column per scalar. Nulls are written explicitly.
pub(crate) struct RowCodec;

impl ScalarCodec for RowCodec {
    type Cell = Datum;

    fn encode(kind: Scalar<'_>, value: &Value) -> Result<Option<Datum>, BindError> {
        let datum = match (kind, value) {
            (_, Value::Null) => Datum::Null,
            (Scalar::Boolean, Value::Boolean(b)) => Datum::Boolean(*b),
            (Scalar::Int, Value::Int(i)) => Datum::Int(*i),
            (Scalar::Long, Value::Long(l)) => Datum::Long(*l),
            (Scalar::Float, Value::Float(f)) => Datum::Float(*f),
            (Scalar::Double, Value::Double(d)) => Datum::Double(*d),
            (Scalar::String, Value::String(s)) => Datum::Text(s.clone()),
            (Scalar::Bytes, Value::Bytes(b)) => Datum::Blob(b.clone()),
            (Scalar::Enum(_), Value::Enum(s)) => Datum::Text(s.clone()),
            (Scalar::Fixed(_), Value::Fixed(b)) => Datum::Blob(b.clone()),
            (kind, other) => return Err(mismatch(kind.kind(), other, "row column")),
        };
        Ok(Some(datum))
    }

    fn decode(kind: Scalar<'_>, cell: &Datum) -> Option<Value> {
        if cell.is_null() {
            return None;
        }
        match kind {
            Scalar::Null => None,
            Scalar::Boolean => cell.as_bool().map(Value::Boolean),
            Scalar::Int => cell.as_i64().and_then(|v| i32::try_from(v).ok()).map(Value::Int),
            Scalar::Long => cell.as_i64().map(Value::Long),
            Scalar::Float => cell.as_f64().map(|v| Value::Float(v as f32)),
            Scalar::Double => cell.as_f64().map(Value::Double),
            Scalar::String => cell.as_str().map(|s| Value::String(s.to_string())),
            Scalar::Bytes => cell.as_bytes().map(|b| Value::Bytes(b.to_vec())),
            Scalar::Enum(e) => cell
                .as_str()
                .filter(|s| e.has_symbol(s))
                .map(|s| Value::Enum(s.to_string())),
            Scalar::Fixed(size) => cell
                .as_bytes()
                .filter(|b| b.len() == size)
                .map(|b| Value::Fixed(b.to_vec())),
        }
    }
}

/// Snapshot backend: one typed slot per scalar. Nulls are simply absent.
pub(crate) struct SlotCodec;

impl ScalarCodec for SlotCodec {
    type Cell = SlotValue;

    fn encode(kind: Scalar<'_>, value: &Value) -> Result<Option<SlotValue>, BindError> {
        let slot = match (kind, value) {
            (_, Value::Null) => return Ok(None),
            (Scalar::Boolean, Value::Boolean(b)) => SlotValue::Boolean(*b),
            (Scalar::Int, Value::Int(i)) => SlotValue::Int(*i),
            (Scalar::Long, Value::Long(l)) => SlotValue::Long(*l),
            (Scalar::Float, Value::Float(f)) => SlotValue::Float(*f),
            (Scalar::Double, Value::Double(d)) => SlotValue::Double(*d),
            (Scalar::String, Value::String(s)) => SlotValue::String(s.clone()),
            (Scalar::Bytes, Value::Bytes(b)) => SlotValue::Bytes(b.clone()),
            (Scalar::Enum(_), Value::Enum(s)) => SlotValue::String(s.clone()),
            (Scalar::Fixed(_), Value::Fixed(b)) => SlotValue::Bytes(b.clone()),
            (kind, other) => return Err(mismatch(kind.kind(), other, "snapshot slot")),
        };
        Ok(Some(slot))
    }

    fn decode(kind: Scalar<'_>, cell: &SlotValue) -> Option<Value> {
        match (kind, cell) {
            (Scalar::Boolean, SlotValue::Boolean(b)) => Some(Value::Boolean(*b)),
            (Scalar::Int, SlotValue::Int(i)) => Some(Value::Int(*i)),
            (Scalar::Long, SlotValue::Long(l)) => Some(Value::Long(*l)),
            (Scalar::Float, SlotValue::Float(f)) => Some(Value::Float(*f)),
            (Scalar::Double, SlotValue::Double(d)) => Some(Value::Double(*d)),
            (Scalar::String, SlotValue::String(s)) => Some(Value::String(s.clone())),
            (Scalar::Bytes, SlotValue::Bytes(b)) => Some(Value::Bytes(b.clone())),
            (Scalar::Enum(_), SlotValue::String(s)) => Some(Value::Enum(s.clone())),
            (Scalar::Fixed(_), SlotValue::Bytes(b)) => Some(Value::Fixed(b.clone())),
            _ => None,
        }
    }
}

impl SlotCodec {
    /// Packs scalar elements into one homogeneous array slot. Null-typed
    /// arrays need no slot; their count says everything.
    pub(crate) fn encode_array(
        kind: Scalar<'_>,
        values: &[Value],
    ) -> Result<Option<SlotValue>, BindError> {
        macro_rules! collect {
            ($variant:ident, $pat:pat => $out:expr) => {
                values
                    .iter()
                    .map(|v| match v {
                        $pat => Ok($out),
                        other => Err(mismatch(kind.kind(), other, "snapshot array")),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(SlotValue::$variant)
            };
        }

        let slot = match kind {
            Scalar::Null => return Ok(None),
            Scalar::Boolean => collect!(BooleanArray, Value::Boolean(b) => *b)?,
            Scalar::Int => collect!(IntArray, Value::Int(i) => *i)?,
            Scalar::Long => collect!(LongArray, Value::Long(l) => *l)?,
            Scalar::Float => collect!(FloatArray, Value::Float(f) => *f)?,
            Scalar::Double => collect!(DoubleArray, Value::Double(d) => *d)?,
            Scalar::String => collect!(StringArray, Value::String(s) => s.clone())?,
            Scalar::Bytes => collect!(BytesArray, Value::Bytes(b) => b.clone())?,
            Scalar::Enum(_) => collect!(StringArray, Value::Enum(s) => s.clone())?,
            Scalar::Fixed(_) => collect!(BytesArray, Value::Fixed(b) => b.clone())?,
        };
        Ok(Some(slot))
    }

    /// Unpacks a homogeneous array slot written by [`encode_array`](Self::encode_array).
    pub(crate) fn decode_array(kind: Scalar<'_>, slot: &SlotValue) -> Option<Vec<Value>> {
        match (kind, slot) {
            (Scalar::Boolean, SlotValue::BooleanArray(v)) => {
                Some(v.iter().map(|b| Value::Boolean(*b)).collect())
            }
            (Scalar::Int, SlotValue::IntArray(v)) => {
                Some(v.iter().map(|i| Value::Int(*i)).collect())
            }
            (Scalar::Long, SlotValue::LongArray(v)) => {
                Some(v.iter().map(|l| Value::Long(*l)).collect())
            }
            (Scalar::Float, SlotValue::FloatArray(v)) => {
                Some(v.iter().map(|f| Value::Float(*f)).collect())
            }
            (Scalar::Double, SlotValue::DoubleArray(v)) => {
                Some(v.iter().map(|d| Value::Double(*d)).collect())
            }
            (Scalar::String, SlotValue::StringArray(v)) => {
                Some(v.iter().cloned().map(Value::String).collect())
            }
            (Scalar::Bytes, SlotValue::BytesArray(v)) => {
                Some(v.iter().cloned().map(Value::Bytes).collect())
            }
            (Scalar::Enum(_), SlotValue::StringArray(v)) => {
                Some(v.iter().cloned().map(Value::Enum).collect())
            }
            (Scalar::Fixed(_), SlotValue::BytesArray(v)) => {
                Some(v.iter().cloned().map(Value::Fixed).collect())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_is_exhaustive_over_kinds() {
        assert!(matches!(route(&SchemaType::INT), Route::Scalar(Scalar::Int)));
        assert!(matches!(
            route(&SchemaType::fixed("F", 4)),
            Route::Scalar(Scalar::Fixed(4))
        ));
        assert!(matches!(
            route(&SchemaType::array(SchemaType::INT)),
            Route::Composite(Kind::Array)
        ));
        let union = SchemaType::union(vec![SchemaType::NULL, SchemaType::INT]).unwrap();
        assert!(matches!(route(&union), Route::Union(_)));
    }

    #[test]
    fn test_row_codec_rejects_mismatch() {
        let result = RowCodec::encode(Scalar::Int, &Value::String("x".into()));
        assert!(matches!(
            result,
            Err(BindError::TypeMismatch { expected: Kind::Int, found: "string", .. })
        ));
    }

    #[test]
    fn test_row_codec_null_and_widening() {
        assert_eq!(RowCodec::encode(Scalar::Long, &Value::Null).unwrap(), Some(Datum::Null));
        assert_eq!(RowCodec::decode(Scalar::Long, &Datum::Int(7)), Some(Value::Long(7)));
        assert_eq!(RowCodec::decode(Scalar::Int, &Datum::Long(i64::MAX)), None);
        assert_eq!(RowCodec::decode(Scalar::Int, &Datum::Null), None);
    }

    #[test]
    fn test_row_codec_enum_checks_symbols() {
        let schema = EnumSchema {
            name: "Mood".into(),
            symbols: vec!["HAPPY".into()],
        };
        let kind = Scalar::Enum(&schema);
        assert_eq!(
            RowCodec::decode(kind, &Datum::Text("HAPPY".into())),
            Some(Value::Enum("HAPPY".into()))
        );
        assert_eq!(RowCodec::decode(kind, &Datum::Text("ANGRY".into())), None);
    }

    #[test]
    fn test_slot_codec_null_is_absent() {
        assert_eq!(SlotCodec::encode(Scalar::String, &Value::Null).unwrap(), None);
    }

    #[test]
    fn test_slot_array_codec() {
        let values = vec![Value::Long(1), Value::Long(-2)];
        let slot = SlotCodec::encode_array(Scalar::Long, &values).unwrap().unwrap();
        assert_eq!(slot, SlotValue::LongArray(vec![1, -2]));
        assert_eq!(SlotCodec::decode_array(Scalar::Long, &slot), Some(values));

        let mixed = vec![Value::Long(1), Value::Null];
        assert!(SlotCodec::encode_array(Scalar::Long, &mixed).is_err());
        assert_eq!(SlotCodec::encode_array(Scalar::Null, &[Value::Null]).unwrap(), None);
    }
}
