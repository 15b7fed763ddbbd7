//! Record model facade and per-field accessors.
//!
//! [`RecordModel`] is what an editing screen holds: the current record,
//! the copy last loaded from (or written to) the store, and one dirty flag.
//! Field edits go through [`FieldAccessor`], whose
//! [`set_value`](ValueAccessor::set_value) returns a [`FieldChange`] and
//! marks the model dirty in the same call.

use tracing::debug;

use crate::error::BindError;
use crate::locator::{ResourceLocator, RowId};
use crate::naming::{dirty_flag_slot, record_full_name};
use crate::schema::SchemaType;
use crate::snapshot::SnapshotContainer;
use crate::store::{Row, RowStore};
use crate::value::{BoundValue, RecordValue, Value};

/// A field edit.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub previous: Value,
}

/// Per-field access used by views.
pub trait ValueAccessor {
    fn field_name(&self) -> &str;

    fn value(&self) -> &Value;

    /// Replaces the value. The owning model is marked dirty.
    fn set_value(&mut self, value: Value) -> Result<FieldChange, BindError>;

    /// Locator of the field's storage: the child's own locator for a
    /// composite field, the record's row for a scalar field.
    fn value_locator(&self) -> Result<ResourceLocator, BindError>;
}

/// A single field of a [`RecordModel`], borrowed mutably from it.
#[derive(Debug)]
pub struct FieldAccessor<'m> {
    record: &'m mut RecordValue,
    dirty: &'m mut bool,
    name: String,
    index: usize,
}

impl FieldAccessor<'_> {
    pub fn schema(&self) -> &SchemaType {
        &self.record.record_schema().fields()[self.index].schema
    }
}

impl ValueAccessor for FieldAccessor<'_> {
    fn field_name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> &Value {
        self.record.value_at(self.index)
    }

    fn set_value(&mut self, value: Value) -> Result<FieldChange, BindError> {
        let previous = self.record.set(&self.name, value)?;
        *self.dirty = true;
        Ok(FieldChange {
            field: self.name.clone(),
            previous,
        })
    }

    fn value_locator(&self) -> Result<ResourceLocator, BindError> {
        let locator = match self.value().as_bound() {
            Some(child) => child.locator(),
            None => self.record.locator(),
        };
        locator.cloned().ok_or(BindError::NotBound {
            context: "field locator",
        })
    }
}

/// An editable record with its persisted original and a dirty flag.
#[derive(Debug, Clone)]
pub struct RecordModel {
    current: RecordValue,
    original: Option<RecordValue>,
    dirty: bool,
}

impl RecordModel {
    /// A model for a record that does not exist in the store yet.
    pub fn new(schema: &SchemaType) -> Result<Self, BindError> {
        Ok(Self::from_value(RecordValue::for_schema(schema)?))
    }

    /// A model for the existing record at `locator`. Call
    /// [`load_data`](Self::load_data) to fetch it.
    pub fn open(schema: &SchemaType, locator: ResourceLocator) -> Result<Self, BindError> {
        Ok(Self::from_value(RecordValue::for_schema(schema)?.with_locator(locator)))
    }

    pub fn from_value(value: RecordValue) -> Self {
        Self {
            current: value,
            original: None,
            dirty: false,
        }
    }

    pub fn value(&self) -> &RecordValue {
        &self.current
    }

    pub fn into_value(self) -> RecordValue {
        self.current
    }

    /// The record as last loaded from or written to the store.
    pub fn original(&self) -> Option<&RecordValue> {
        self.original.as_ref()
    }

    pub fn locator(&self) -> Option<&ResourceLocator> {
        self.current.locator()
    }

    pub fn bind(&mut self, locator: ResourceLocator) {
        self.current.set_locator(locator);
    }

    /// Inserts an empty row into `collection` and binds the record to it.
    pub fn insert_into(
        &mut self,
        store: &mut dyn RowStore,
        collection: &ResourceLocator,
    ) -> Result<ResourceLocator, BindError> {
        let locator = store.insert(collection, Row::new())?;
        debug!(locator = %locator, "bound new record");
        self.current.set_locator(locator.clone());
        Ok(locator)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the model as having unsaved changes.
    pub fn on_changed(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.current.iter().map(|(name, _)| name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.current.get(name)
    }

    pub fn field(&mut self, name: &str) -> Result<FieldAccessor<'_>, BindError> {
        let index = self
            .current
            .record_schema()
            .field_index(name)
            .ok_or_else(|| BindError::UnknownField { name: name.to_string() })?;
        Ok(FieldAccessor {
            record: &mut self.current,
            dirty: &mut self.dirty,
            name: name.to_string(),
            index,
        })
    }

    /// Shorthand for `field(name)?.set_value(value)`.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<FieldChange, BindError> {
        self.field(name)?.set_value(value.into())
    }

    /// Replaces the current record with what the store holds.
    pub fn load_data(&mut self, store: &mut dyn RowStore) -> Result<(), BindError> {
        self.current.load(store, "")?;
        self.original = Some(self.current.clone());
        self.dirty = false;
        Ok(())
    }

    /// Writes the current record and makes it the new original.
    pub fn store_current_value(
        &mut self,
        store: &mut dyn RowStore,
    ) -> Result<Option<RowId>, BindError> {
        let id = self.current.save(store, "")?;
        self.original = Some(self.current.clone());
        self.dirty = false;
        Ok(id)
    }

    /// Writes the original record back, discarding the current edits.
    /// Does nothing for a record that was never loaded or stored.
    pub fn store_original_value(&mut self, store: &mut dyn RowStore) -> Result<(), BindError> {
        let Some(original) = self.original.as_mut() else {
            debug!("no original value to restore");
            return Ok(());
        };
        if original.locator().is_none() {
            if let Some(locator) = self.current.locator() {
                original.set_locator(locator.clone());
            }
        }
        original.save(store, "")?;
        self.current = original.clone();
        self.dirty = false;
        Ok(())
    }

    /// Snapshots the current record and the dirty flag.
    pub fn save_state(&self, snapshot: &mut dyn SnapshotContainer) -> Result<(), BindError> {
        self.current.save_state(snapshot, "")?;
        let dirty_slot = dirty_flag_slot(&record_full_name("", self.current.name()));
        snapshot.put_boolean(&dirty_slot, self.dirty);
        Ok(())
    }

    /// Restores what [`save_state`](Self::save_state) wrote.
    pub fn restore_state(&mut self, snapshot: &dyn SnapshotContainer) -> Result<(), BindError> {
        self.current.load_state(snapshot, "")?;
        self.dirty = snapshot
            .get_boolean(&dirty_flag_slot(&record_full_name("", self.current.name())))
            .copied()
            .unwrap_or(false);
        Ok(())
    }

    /// Deletes the record and all its composite children from the store.
    pub fn delete(&mut self, store: &mut dyn RowStore) -> Result<(), BindError> {
        self.current.delete(store)?;
        self.original = None;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecordSchemaBuilder;
    use crate::snapshot::Bundle;
    use crate::store::MemoryStore;
    use crate::value::ArrayValue;

    fn person_schema() -> SchemaType {
        RecordSchemaBuilder::new("Person")
            .string("name")
            .int("age")
            .array("tags", SchemaType::STRING)
            .build()
            .unwrap()
    }

    #[test]
    fn test_set_value_marks_dirty() {
        let mut model = RecordModel::new(&person_schema()).unwrap();
        assert!(!model.is_dirty());

        let change = model.field("age").unwrap().set_value(Value::Int(30)).unwrap();
        assert_eq!(
            change,
            FieldChange {
                field: "age".into(),
                previous: Value::Null
            }
        );
        assert!(model.is_dirty());

        model.mark_clean();
        assert!(model.field("age").unwrap().set_value(Value::from("x")).is_err());
        assert!(!model.is_dirty());
    }

    #[test]
    fn test_value_locator() {
        let mut model = RecordModel::new(&person_schema()).unwrap();
        assert_eq!(
            model.field("age").unwrap().value_locator(),
            Err(BindError::NotBound { context: "field locator" })
        );

        let mut store = MemoryStore::new();
        let people = ResourceLocator::new("people");
        let at = model.insert_into(&mut store, &people).unwrap();
        assert_eq!(model.field("age").unwrap().value_locator(), Ok(at.clone()));

        let mut tags = ArrayValue::of(SchemaType::STRING);
        tags.push("x").unwrap();
        model.set("tags", tags).unwrap();
        model.store_current_value(&mut store).unwrap();
        assert_eq!(model.field("tags").unwrap().value_locator(), Ok(at.child("tags")));
    }

    #[test]
    fn test_store_and_load() {
        let mut store = MemoryStore::new();
        let mut model = RecordModel::new(&person_schema()).unwrap();
        let at = model.insert_into(&mut store, &ResourceLocator::new("people")).unwrap();
        model.set("name", "Ada").unwrap();
        model.set("age", 36).unwrap();
        model.store_current_value(&mut store).unwrap();
        assert!(!model.is_dirty());

        let mut reopened = RecordModel::open(&person_schema(), at).unwrap();
        reopened.load_data(&mut store).unwrap();
        assert_eq!(reopened.value(), model.value());
        assert_eq!(reopened.original(), Some(model.value()));
    }

    #[test]
    fn test_store_original_value_reverts() {
        let mut store = MemoryStore::new();
        let mut model = RecordModel::new(&person_schema()).unwrap();
        model.insert_into(&mut store, &ResourceLocator::new("people")).unwrap();
        model.set("name", "Ada").unwrap();
        model.store_current_value(&mut store).unwrap();

        model.set("name", "Grace").unwrap();
        model.store_original_value(&mut store).unwrap();
        assert_eq!(model.get("name"), Some(&Value::from("Ada")));
        assert!(!model.is_dirty());

        let at = model.locator().cloned().unwrap();
        let mut reopened = RecordModel::open(&person_schema(), at).unwrap();
        reopened.load_data(&mut store).unwrap();
        assert_eq!(reopened.get("name"), Some(&Value::from("Ada")));
    }

    #[test]
    fn test_state_round_trip_keeps_dirty_flag() {
        let mut model =
            RecordModel::open(&person_schema(), ResourceLocator::new("people/7")).unwrap();
        model.set("name", "Ada").unwrap();

        let mut bundle = Bundle::new();
        model.save_state(&mut bundle).unwrap();
        assert_eq!(bundle.get_boolean("Person.dirty"), Some(&true));

        let mut restored = RecordModel::new(&person_schema()).unwrap();
        restored.restore_state(&bundle).unwrap();
        assert!(restored.is_dirty());
        assert_eq!(restored.value(), model.value());
        assert_eq!(restored.locator(), model.locator());
    }

    #[test]
    fn test_delete_requires_binding() {
        let mut store = MemoryStore::new();
        let mut model = RecordModel::new(&person_schema()).unwrap();
        assert_eq!(model.delete(&mut store), Err(BindError::NotBound { context: "delete" }));
        assert!(store.journal().is_empty());
    }
}
