//! Shared schema and value strategies for the integration tests.

#![allow(dead_code)]

use proptest::prelude::*;
use schemabind::{ArrayValue, MapValue, RecordSchemaBuilder, RecordValue, SchemaType, Value};

pub fn item_schema() -> SchemaType {
    RecordSchemaBuilder::new("Item")
        .string("label")
        .double("weight")
        .build()
        .unwrap()
}

pub fn mood_schema() -> SchemaType {
    SchemaType::enumeration("Mood", vec!["HAPPY".into(), "SAD".into(), "CALM".into()])
}

pub fn digest_schema() -> SchemaType {
    SchemaType::fixed("Digest", 4)
}

/// A record touching every kind except unions.
pub fn profile_schema() -> SchemaType {
    RecordSchemaBuilder::new("Profile")
        .long("id")
        .string("name")
        .int("age")
        .boolean("active")
        .float("score")
        .field("mood", mood_schema())
        .field("digest", digest_schema())
        .bytes("avatar")
        .array("tags", SchemaType::STRING)
        .array("matrix", SchemaType::array(SchemaType::INT))
        .array("items", item_schema())
        .map("counters", SchemaType::LONG)
        .map("by_name", item_schema())
        .field("home", item_schema())
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn nullable<T: std::fmt::Debug + Clone + 'static>(
    inner: impl Strategy<Value = T> + 'static,
    wrap: fn(T) -> Value,
) -> BoxedStrategy<Value> {
    prop::option::of(inner)
        .prop_map(move |v| v.map(wrap).unwrap_or(Value::Null))
        .boxed()
}

pub fn arb_item() -> impl Strategy<Value = RecordValue> {
    (
        nullable("[a-z ]{0,12}", Value::String),
        nullable(-1.0e9f64..1.0e9, Value::Double),
    )
        .prop_map(|(label, weight)| {
            RecordValue::for_schema(&item_schema())
                .unwrap()
                .with("label", label)
                .unwrap()
                .with("weight", weight)
                .unwrap()
        })
}

pub fn arb_string_array() -> impl Strategy<Value = ArrayValue> {
    prop::collection::vec("[a-z0-9]{0,8}", 0..6).prop_map(|values| {
        let mut array = ArrayValue::of(SchemaType::STRING);
        for v in values {
            array.push(v).unwrap();
        }
        array
    })
}

pub fn arb_matrix() -> impl Strategy<Value = ArrayValue> {
    prop::collection::vec(prop::collection::vec(any::<i32>(), 0..5), 0..4).prop_map(|rows| {
        let mut matrix = ArrayValue::of(SchemaType::array(SchemaType::INT));
        for row in rows {
            let mut inner = ArrayValue::of(SchemaType::INT);
            for v in row {
                inner.push(v).unwrap();
            }
            matrix.push(inner).unwrap();
        }
        matrix
    })
}

pub fn arb_items() -> impl Strategy<Value = ArrayValue> {
    prop::collection::vec(arb_item(), 0..4).prop_map(|items| {
        let mut array = ArrayValue::of(item_schema());
        for item in items {
            array.push(item).unwrap();
        }
        array
    })
}

pub fn arb_counters() -> impl Strategy<Value = MapValue> {
    prop::collection::hash_map("[a-z]{1,6}", any::<i64>(), 0..6).prop_map(|entries| {
        let mut map = MapValue::of(SchemaType::LONG);
        for (k, v) in entries {
            map.insert(k, v).unwrap();
        }
        map
    })
}

pub fn arb_items_by_name() -> impl Strategy<Value = MapValue> {
    prop::collection::hash_map("[a-z]{1,6}", arb_item(), 0..4).prop_map(|entries| {
        let mut map = MapValue::of(item_schema());
        for (k, v) in entries {
            map.insert(k, v).unwrap();
        }
        map
    })
}

pub fn arb_profile() -> impl Strategy<Value = RecordValue> {
    let scalars = (
        any::<i64>(),
        nullable("[A-Za-z]{0,10}", Value::String),
        nullable(any::<i32>(), Value::Int),
        nullable(any::<bool>(), Value::Boolean),
        nullable(-1.0e6f32..1.0e6, Value::Float),
        nullable(
            prop_oneof![Just("HAPPY"), Just("SAD"), Just("CALM")].prop_map(str::to_string),
            Value::Enum,
        ),
        nullable(prop::collection::vec(any::<u8>(), 4), Value::Fixed),
        nullable(prop::collection::vec(any::<u8>(), 0..16), Value::Bytes),
    );
    let composites = (
        arb_string_array(),
        arb_matrix(),
        arb_items(),
        arb_counters(),
        arb_items_by_name(),
        arb_item(),
    );
    (scalars, composites).prop_map(
        |(
            (id, name, age, active, score, mood, digest, avatar),
            (tags, matrix, items, counters, by_name, home),
        )| {
            RecordValue::for_schema(&profile_schema())
                .unwrap()
                .with("id", id)
                .unwrap()
                .with("name", name)
                .unwrap()
                .with("age", age)
                .unwrap()
                .with("active", active)
                .unwrap()
                .with("score", score)
                .unwrap()
                .with("mood", mood)
                .unwrap()
                .with("digest", digest)
                .unwrap()
                .with("avatar", avatar)
                .unwrap()
                .with("tags", tags)
                .unwrap()
                .with("matrix", matrix)
                .unwrap()
                .with("items", items)
                .unwrap()
                .with("counters", counters)
                .unwrap()
                .with("by_name", by_name)
                .unwrap()
                .with("home", home)
                .unwrap()
        },
    )
}

/// Number of record, array and map values strictly beneath `value`.
pub fn composite_descendants(value: &Value) -> usize {
    let children: Vec<&Value> = match value {
        Value::Record(r) => r.iter().map(|(_, v)| v).collect(),
        Value::Array(a) => a.iter().collect(),
        Value::Map(m) => m.iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    };
    children
        .into_iter()
        .filter(|c| matches!(c, Value::Record(_) | Value::Array(_) | Value::Map(_)))
        .map(|c| 1 + composite_descendants(c))
        .sum()
}
