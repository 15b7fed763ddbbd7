//! Property tests: values survive both backends, and lifecycle operations
//! touch the store in the documented order.

mod common;

use std::collections::BTreeSet;

use common::*;
use proptest::prelude::*;
use schemabind::store::Operation;
use schemabind::{
    decode_bundle, encode_bundle, encode_bundle_compressed, ArrayValue, BindError, BoundValue,
    Bundle, Kind, MapValue, MemoryStore, RecordSchemaBuilder, RecordValue, ResourceLocator,
    SchemaType, UnionValue, Value,
};

fn saved(mut record: RecordValue, at: &ResourceLocator) -> (RecordValue, MemoryStore) {
    let mut store = MemoryStore::new();
    record.set_locator(at.clone());
    record.save(&mut store, "").unwrap();
    (record, store)
}

proptest! {
    /// Loading what was saved reproduces the record.
    #[test]
    fn store_round_trip(profile in arb_profile()) {
        let at = ResourceLocator::new("profiles/1");
        let (profile, mut store) = saved(profile, &at);

        let mut loaded = RecordValue::for_schema(&profile_schema()).unwrap().with_locator(at);
        loaded.load(&mut store, "").unwrap();
        prop_assert_eq!(loaded, profile);
    }

    /// Saving twice leaves no stale rows behind.
    #[test]
    fn store_save_is_idempotent(profile in arb_profile()) {
        let at = ResourceLocator::new("profiles/1");
        let (mut profile, mut store) = saved(profile, &at);
        let rows = store.len();
        profile.save(&mut store, "").unwrap();
        prop_assert_eq!(store.len(), rows);
    }

    /// A snapshot restores the record from slot names alone, also after
    /// going through the binary bundle format.
    #[test]
    fn snapshot_round_trip(profile in arb_profile(), compressed in any::<bool>()) {
        let profile = profile.with_locator(ResourceLocator::new("profiles/9"));
        let mut bundle = Bundle::new();
        profile.save_state(&mut bundle, "").unwrap();

        let bytes = if compressed {
            encode_bundle_compressed(&bundle, 3).unwrap()
        } else {
            encode_bundle(&bundle).unwrap()
        };
        let decoded = decode_bundle(&bytes).unwrap();

        let mut restored = RecordValue::for_schema(&profile_schema()).unwrap();
        restored.load_state(&decoded, "").unwrap();
        prop_assert_eq!(restored.locator(), profile.locator());
        prop_assert_eq!(restored, profile);
    }

    /// Array length and element order survive a store round trip.
    #[test]
    fn array_order_and_count(values in prop::collection::vec(any::<i64>(), 0..40)) {
        let at = ResourceLocator::new("series/1/points");
        let mut array = ArrayValue::of(SchemaType::LONG).with_locator(at.clone());
        for v in &values {
            array.push(*v).unwrap();
        }
        let mut store = MemoryStore::new();
        array.save(&mut store, "points").unwrap();

        let mut loaded = ArrayValue::of(SchemaType::LONG).with_locator(at);
        loaded.load(&mut store, "points").unwrap();
        prop_assert_eq!(loaded.len(), values.len());
        let loaded: Vec<i64> = loaded.iter().filter_map(Value::as_i64).collect();
        prop_assert_eq!(loaded, values);
    }

    /// Map keys survive a store round trip with no collisions.
    #[test]
    fn map_key_set(map in arb_items_by_name()) {
        let at = ResourceLocator::new("catalog/1/items");
        let mut map = map.with_locator(at.clone());
        let mut store = MemoryStore::new();
        map.save(&mut store, "items").unwrap();

        let mut loaded = MapValue::of(item_schema()).with_locator(at);
        loaded.load(&mut store, "items").unwrap();
        let expected: BTreeSet<&str> = map.keys().collect();
        let actual: BTreeSet<&str> = loaded.keys().collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(loaded.len(), map.len());
    }

    /// Deleting a record issues one delete per composite descendant plus
    /// one for the record, never deleting a child after its parent.
    #[test]
    fn delete_is_post_order(profile in arb_profile()) {
        let at = ResourceLocator::new("profiles/1");
        let (mut profile, mut store) = saved(profile, &at);
        let expected = composite_descendants(&Value::Record(profile.clone())) + 1;

        store.clear_journal();
        profile.delete(&mut store).unwrap();

        let deletes = store.deletes();
        prop_assert_eq!(deletes.len(), expected);
        prop_assert_eq!(deletes.last().copied(), Some(&at));
        for (i, earlier) in deletes.iter().enumerate() {
            let prefix = format!("{}/", earlier.as_str());
            for later in &deletes[i + 1..] {
                prop_assert!(
                    !later.as_str().starts_with(&prefix),
                    "{} deleted after {}",
                    later,
                    earlier
                );
            }
        }
        prop_assert!(store.is_empty());
    }

    /// Store operations on unbound composites fail before touching the store.
    #[test]
    fn unbound_guard(profile in arb_profile(), op in 0u8..3) {
        let mut store = MemoryStore::new();
        let mut values: Vec<Value> = vec![
            Value::Record(profile),
            Value::Array(ArrayValue::of(SchemaType::INT)),
            Value::Map(MapValue::of(SchemaType::STRING)),
        ];
        for value in &mut values {
            let bound = value.as_bound_mut().unwrap();
            let result = match op {
                0 => bound.save(&mut store, "").map(|_| ()),
                1 => bound.load(&mut store, ""),
                _ => bound.delete(&mut store),
            };
            let not_bound = matches!(result, Err(BindError::NotBound { .. }));
            prop_assert!(not_bound);
        }
        prop_assert_eq!(store.journal(), &[] as &[Operation]);
    }

    /// Same-kind union branches are told apart by name.
    #[test]
    fn union_disambiguation(
        first in "[A-Z][a-z]{1,6}",
        second in "[A-Z][a-z]{1,6}",
        pick_second in any::<bool>(),
    ) {
        prop_assume!(first != second);
        let a = RecordSchemaBuilder::new(first.as_str()).int("x").build().unwrap();
        let b = RecordSchemaBuilder::new(second.as_str()).int("x").build().unwrap();
        let union_schema = SchemaType::union(vec![a.clone(), b.clone()]).unwrap();

        let chosen = if pick_second { &b } else { &a };
        let mut union = UnionValue::for_schema(&union_schema).unwrap();
        union.set_value(RecordValue::for_schema(chosen).unwrap(), chosen).unwrap();

        let resolved = union.value_schema().unwrap();
        prop_assert_eq!(resolved.kind(), Kind::Record);
        prop_assert_eq!(resolved, chosen);
    }
}
