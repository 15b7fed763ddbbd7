//! Map values: string keys to values of one schema.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::BindError;
use crate::locator::{ResourceLocator, RowId};
use crate::naming::{
    count_name, indexed_name, map_key_name, map_value_name, type_locator_slot, KEY_COLUMN,
    VALUE_COLUMN,
};
use crate::schema::{Kind, SchemaType};
use crate::snapshot::SnapshotContainer;
use crate::store::{Datum, Row, RowStore};
use crate::value::dispatch::{self, Placement};
use crate::value::{snapshot_count, Binding, BoundValue, Value};

/// A map value. Entries have no defined order.
///
/// In the row backend the map is the collection at its locator, one row per
/// entry holding the `key` and `value` columns. Like arrays, maps are
/// rewritten wholesale on save.
#[derive(Debug, Clone)]
pub struct MapValue {
    value_type: Arc<SchemaType>,
    schema: SchemaType,
    binding: Binding,
    entries: FxHashMap<String, Value>,
}

impl MapValue {
    pub fn new(value_type: Arc<SchemaType>) -> Self {
        Self {
            schema: SchemaType::Map(value_type.clone()),
            value_type,
            binding: Binding::unbound(),
            entries: FxHashMap::default(),
        }
    }

    /// Creates an empty map with values of `value_type`.
    pub fn of(value_type: SchemaType) -> Self {
        Self::new(Arc::new(value_type))
    }

    pub fn for_schema(schema: &SchemaType) -> Result<Self, BindError> {
        match schema {
            SchemaType::Map(value_type) => Ok(Self::new(value_type.clone())),
            other => Err(BindError::TypeMismatch {
                expected: Kind::Map,
                found: other.kind().name(),
                context: "map construction",
            }),
        }
    }

    pub fn with_locator(mut self, locator: ResourceLocator) -> Self {
        self.binding.set(locator);
        self
    }

    pub fn value_type(&self) -> &SchemaType {
        &self.value_type
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts an entry, returning the value previously stored under `key`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, BindError> {
        let value = value.into();
        if !value.conforms_to(&self.value_type) {
            return Err(BindError::TypeMismatch {
                expected: self.value_type.kind(),
                found: value.type_name(),
                context: "map value",
            });
        }
        Ok(self.entries.insert(key.into(), value))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn sorted_keys(&self) -> Vec<&String> {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        keys
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.entries == other.entries
    }
}

impl BoundValue for MapValue {
    fn schema(&self) -> &SchemaType {
        &self.schema
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }

    fn save_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
        _field: &str,
    ) -> Result<Option<RowId>, BindError> {
        store.delete(at)?;
        for (key, value) in &mut self.entries {
            let row = store.insert(at, Row::new().with(KEY_COLUMN, Datum::Text(key.clone())))?;
            let mut staged = Row::new();
            dispatch::save_column(
                store,
                &self.value_type,
                value,
                VALUE_COLUMN,
                &row,
                Placement::Element,
                &mut staged,
            )?;
            if !staged.is_empty() {
                store.update(&row, staged)?;
            }
        }
        Ok(None)
    }

    fn load_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
        _field: &str,
    ) -> Result<(), BindError> {
        let rows = store.query(at)?;
        let mut entries = FxHashMap::default();
        for row in rows {
            let Some(key) = row.values.get(KEY_COLUMN).and_then(Datum::as_str) else {
                warn!(locator = %row.locator, "map row has no key, skipped");
                continue;
            };
            let value = dispatch::load_column(
                store,
                &self.value_type,
                &row.values,
                VALUE_COLUMN,
                &row.locator,
                Placement::Element,
            )?;
            entries.insert(key.to_string(), value);
        }
        self.entries = entries;
        Ok(())
    }

    fn delete_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
    ) -> Result<(), BindError> {
        for value in self.entries.values_mut() {
            dispatch::delete_child(store, value)?;
        }
        store.delete(at)?;
        Ok(())
    }

    fn save_state(
        &self,
        snapshot: &mut dyn SnapshotContainer,
        name: &str,
    ) -> Result<(), BindError> {
        if let Some(locator) = self.binding.get() {
            snapshot.put_locator(&type_locator_slot(name), locator.clone());
        }
        let count = snapshot_count(self.entries.len(), "map")?;
        snapshot.put_int(&count_name(name), count);

        let keys_base = map_key_name(name);
        let values_base = map_value_name(name);
        for (index, key) in self.sorted_keys().into_iter().enumerate() {
            snapshot.put_string(&indexed_name(&keys_base, index), key.clone());
            if let Some(value) = self.entries.get(key) {
                let slot = indexed_name(&values_base, index);
                dispatch::save_slot(snapshot, &self.value_type, value, &slot)?;
            }
        }
        Ok(())
    }

    fn load_state(
        &mut self,
        snapshot: &dyn SnapshotContainer,
        name: &str,
    ) -> Result<(), BindError> {
        if let Some(locator) = snapshot.get_locator(&type_locator_slot(name)) {
            self.binding.set(locator.clone());
        }
        let count = snapshot.get_int(&count_name(name)).copied().unwrap_or(0).max(0) as usize;

        let keys_base = map_key_name(name);
        let values_base = map_value_name(name);
        let mut entries = FxHashMap::default();
        for index in 0..count {
            let Some(key) = snapshot.get_string(&indexed_name(&keys_base, index)) else {
                warn!(slot = name, index, "map key slot missing, entry skipped");
                continue;
            };
            let slot = indexed_name(&values_base, index);
            let value = dispatch::load_slot(snapshot, &self.value_type, &slot)?;
            entries.insert(key.clone(), value);
        }
        self.entries = entries;
        Ok(())
    }
}
