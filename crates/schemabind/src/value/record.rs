//! Record values: one value per schema field, in declaration order.

use std::sync::Arc;

use tracing::warn;

use crate::error::BindError;
use crate::locator::{ResourceLocator, RowId};
use crate::naming::{field_full_name, record_full_name, type_locator_slot};
use crate::schema::{Kind, RecordSchema, SchemaType};
use crate::snapshot::SnapshotContainer;
use crate::store::{Row, RowStore};
use crate::value::dispatch::{self, Placement};
use crate::value::{Binding, BoundValue, Value};

/// A record value bound (or not yet bound) to a row.
///
/// Every schema field always has an entry. Scalar fields start as
/// [`Value::Null`], composite fields as empty unbound composites.
///
/// In the row backend the record owns the row at its locator: scalar fields
/// are columns of that row, and a composite field lives at
/// `<locator>/<field>`. Record-typed children additionally leave their row
/// identifier in the parent's column.
#[derive(Debug, Clone)]
pub struct RecordValue {
    record: Arc<RecordSchema>,
    schema: SchemaType,
    binding: Binding,
    values: Vec<Value>,
}

impl RecordValue {
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| Value::empty_for(&f.schema))
            .collect();
        Self {
            schema: SchemaType::Record(schema.clone()),
            record: schema,
            binding: Binding::unbound(),
            values,
        }
    }

    /// Creates an empty record for `schema`, which must be a record descriptor.
    pub fn for_schema(schema: &SchemaType) -> Result<Self, BindError> {
        match schema.as_record() {
            Some(record) => Ok(Self::new(record.clone())),
            None => Err(BindError::TypeMismatch {
                expected: Kind::Record,
                found: schema.kind().name(),
                context: "record construction",
            }),
        }
    }

    /// Binds the record to `locator`.
    pub fn with_locator(mut self, locator: ResourceLocator) -> Self {
        self.binding.set(locator);
        self
    }

    /// Sets a field, builder style.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, BindError> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn record_schema(&self) -> &RecordSchema {
        &self.record
    }

    pub fn name(&self) -> &str {
        self.record_schema().name()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.record_schema().field_index(name)?;
        self.values.get(index)
    }

    /// Value of the field at `index` in declaration order.
    pub(crate) fn value_at(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let index = self.record_schema().field_index(name)?;
        self.values.get_mut(index)
    }

    /// Replaces a field value, returning the previous one.
    ///
    /// The value must conform to the field's schema. `Null` unsets a scalar
    /// field; composite fields are cleared by setting their empty value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Value, BindError> {
        let value = value.into();
        let index = self
            .record_schema()
            .field_index(name)
            .ok_or_else(|| BindError::UnknownField { name: name.to_string() })?;
        value.check(&self.record_schema().fields()[index].schema, "record field")?;
        Ok(std::mem::replace(&mut self.values[index], value))
    }

    /// Iterates `(field name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record_schema()
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.values == other.values
    }
}

impl BoundValue for RecordValue {
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
        let schema = self.record.clone();
        let mut staged = Row::new();
        for (field, value) in schema.fields().iter().zip(self.values.iter_mut()) {
            dispatch::save_column(
                store,
                &field.schema,
                value,
                &field.name,
                &at.child(&field.name),
                Placement::Field,
                &mut staged,
            )?;
        }
        if !staged.is_empty() {
            store.update(at, staged)?;
        }
        Ok(store.identify(at))
    }

    fn load_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
        _field: &str,
    ) -> Result<(), BindError> {
        let mut rows = store.query(at)?;
        if rows.len() != 1 {
            warn!(
                locator = %at,
                rows = rows.len(),
                "expected exactly one row, record left unpopulated"
            );
            return Ok(());
        }
        let row = rows.remove(0);

        let schema = self.record.clone();
        for (index, field) in schema.fields().iter().enumerate() {
            self.values[index] = dispatch::load_column(
                store,
                &field.schema,
                &row.values,
                &field.name,
                &at.child(&field.name),
                Placement::Field,
            )?;
        }
        Ok(())
    }

    fn delete_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
    ) -> Result<(), BindError> {
        for value in &mut self.values {
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
        let full = record_full_name(name, self.name());
        if let Some(locator) = self.binding.get() {
            snapshot.put_locator(&type_locator_slot(&full), locator.clone());
        }
        for (field, value) in self.record_schema().fields().iter().zip(&self.values) {
            let slot = field_full_name(&full, &field.name);
            dispatch::save_slot(snapshot, &field.schema, value, &slot)?;
        }
        Ok(())
    }

    fn load_state(
        &mut self,
        snapshot: &dyn SnapshotContainer,
        name: &str,
    ) -> Result<(), BindError> {
        let full = record_full_name(name, self.name());
        if let Some(locator) = snapshot.get_locator(&type_locator_slot(&full)) {
            self.binding.set(locator.clone());
        }
        let schema = self.record.clone();
        for (index, field) in schema.fields().iter().enumerate() {
            let slot = field_full_name(&full, &field.name);
            self.values[index] = dispatch::load_slot(snapshot, &field.schema, &slot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecordSchemaBuilder;
    use crate::snapshot::Bundle;
    use crate::store::{Datum, MemoryStore, Operation};

    fn person_schema() -> SchemaType {
        RecordSchemaBuilder::new("Person")
            .string("name")
            .int("age")
            .array("tags", SchemaType::STRING)
            .build()
            .unwrap()
    }

    fn person() -> RecordValue {
        let mut tags = crate::value::ArrayValue::of(SchemaType::STRING);
        tags.push("x").unwrap();
        tags.push("y").unwrap();
        RecordValue::for_schema(&person_schema())
            .unwrap()
            .with("name", "Ada")
            .unwrap()
            .with("age", 30)
            .unwrap()
            .with("tags", tags)
            .unwrap()
    }

    #[test]
    fn test_set_checks_schema() {
        let mut record = RecordValue::for_schema(&person_schema()).unwrap();
        assert!(matches!(
            record.set("age", "thirty"),
            Err(BindError::TypeMismatch { expected: Kind::Int, .. })
        ));
        assert!(matches!(record.set("height", 1), Err(BindError::UnknownField { .. })));
        assert_eq!(record.set("age", 30).unwrap(), Value::Null);
        assert_eq!(record.get("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_composite_field_rejects_null() {
        let mut record = person();
        assert!(matches!(
            record.set("tags", Value::Null),
            Err(BindError::TypeMismatch { expected: Kind::Array, found: "null", .. })
        ));
        assert_eq!(
            record.get("tags").and_then(Value::as_array).map(|a| a.len()),
            Some(2)
        );

        // An unset composite is its empty value, which survives both backends.
        let at = ResourceLocator::new("people/1");
        let mut record = RecordValue::for_schema(&person_schema())
            .unwrap()
            .with("name", "Ada")
            .unwrap()
            .with_locator(at.clone());
        let mut store = MemoryStore::new();
        record.save(&mut store, "").unwrap();
        let mut loaded = RecordValue::for_schema(&person_schema()).unwrap().with_locator(at);
        loaded.load(&mut store, "").unwrap();
        assert_eq!(loaded, record);

        let mut bundle = Bundle::new();
        record.save_state(&mut bundle, "").unwrap();
        let mut restored = RecordValue::for_schema(&person_schema()).unwrap();
        restored.load_state(&bundle, "").unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_save_writes_columns_and_children() {
        let mut store = MemoryStore::new();
        let at = ResourceLocator::new("people/1");
        let mut record = person().with_locator(at.clone());

        record.save(&mut store, "").unwrap();

        let row = store.row(&at).unwrap();
        assert_eq!(row.get("name"), Some(&Datum::Text("Ada".into())));
        assert_eq!(row.get("age"), Some(&Datum::Int(30)));
        assert!(row.get("tags").is_none());

        let tags_at = at.child("tags");
        let tags = store.query(&tags_at).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(
            record.get("tags").and_then(Value::as_array).and_then(|a| a.locator()),
            Some(&tags_at)
        );
    }

    #[test]
    fn test_load_round_trip() {
        let mut store = MemoryStore::new();
        let at = ResourceLocator::new("people/1");
        let mut original = person().with_locator(at.clone());
        original.save(&mut store, "").unwrap();

        let mut loaded = RecordValue::for_schema(&person_schema()).unwrap().with_locator(at);
        loaded.load(&mut store, "").unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_row_leaves_record_unpopulated() {
        let mut store = MemoryStore::new();
        let mut record = person().with_locator(ResourceLocator::new("people/404"));
        record.load(&mut store, "").unwrap();
        assert_eq!(record.get("name"), Some(&Value::String("Ada".into())));
    }

    #[test]
    fn test_missing_column_loads_null() {
        let mut store = MemoryStore::new();
        let at = ResourceLocator::new("people/1");
        store.update(&at, Row::new().with("name", Datum::Text("Bob".into()))).unwrap();

        let mut record = RecordValue::for_schema(&person_schema()).unwrap().with_locator(at);
        record.load(&mut store, "").unwrap();
        assert_eq!(record.get("name"), Some(&Value::String("Bob".into())));
        assert_eq!(record.get("age"), Some(&Value::Null));
    }

    #[test]
    fn test_delete_children_first() {
        let mut store = MemoryStore::new();
        let at = ResourceLocator::new("people/1");
        let mut record = person().with_locator(at.clone());
        record.save(&mut store, "").unwrap();
        store.clear_journal();

        record.delete(&mut store).unwrap();
        assert_eq!(store.deletes(), vec![&at.child("tags"), &at]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_unbound_save_touches_nothing() {
        let mut store = MemoryStore::new();
        let mut record = person();
        assert_eq!(record.save(&mut store, ""), Err(BindError::NotBound { context: "save" }));
        assert!(store.journal().is_empty());
    }

    #[test]
    fn test_nested_record_id_in_parent_column() {
        let address = RecordSchemaBuilder::new("Address").string("city").build().unwrap();
        let schema = RecordSchemaBuilder::new("Person")
            .string("name")
            .field("home", address.clone())
            .build()
            .unwrap();

        let home = RecordValue::for_schema(&address).unwrap().with("city", "Oslo").unwrap();
        let mut record = RecordValue::for_schema(&schema)
            .unwrap()
            .with("name", "Ada")
            .unwrap()
            .with("home", home)
            .unwrap()
            .with_locator(ResourceLocator::new("people/1"));

        let mut store = MemoryStore::new();
        record.save(&mut store, "").unwrap();

        let home_at = ResourceLocator::new("people/1/home");
        let home_id = store.identify(&home_at).unwrap();
        let parent = store.row(&ResourceLocator::new("people/1")).unwrap();
        assert_eq!(parent.get("home"), Some(&Datum::Long(home_id)));
        assert!(store.journal().contains(&Operation::Update(home_at)));
    }

    #[test]
    fn test_snapshot_layout() {
        let mut bundle = Bundle::new();
        let record = person().with_locator(ResourceLocator::new("people/1"));
        record.save_state(&mut bundle, "").unwrap();

        assert_eq!(bundle.get_string("Person/name"), Some(&"Ada".to_string()));
        assert_eq!(bundle.get_int("Person/age"), Some(&30));
        assert_eq!(bundle.get_int("Person/tags.count"), Some(&2));
        assert_eq!(
            bundle.get_locator("Person.locator").map(|l| l.as_str()),
            Some("people/1")
        );

        let mut restored = RecordValue::for_schema(&person_schema()).unwrap();
        restored.load_state(&bundle, "").unwrap();
        assert_eq!(restored, record);
        assert_eq!(restored.locator(), record.locator());
    }
}
