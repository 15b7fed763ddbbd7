//! Array values: an ordered list of elements of one schema.

use std::sync::Arc;

use tracing::warn;

use crate::error::BindError;
use crate::locator::{ResourceLocator, RowId};
use crate::naming::{count_name, indexed_name, type_locator_slot, VALUE_COLUMN};
use crate::schema::{Kind, SchemaType};
use crate::snapshot::SnapshotContainer;
use crate::store::{Row, RowStore};
use crate::value::dispatch::{self, Placement};
use crate::value::scalar::{route, Route, SlotCodec};
use crate::value::{snapshot_count, Binding, BoundValue, Value};

/// An array value.
///
/// In the row backend the array is the collection at its locator, one row
/// per element with the element in the `value` column. Saving rewrites the
/// collection: existing rows are deleted and every element is re-inserted
/// in order.
#[derive(Debug, Clone)]
pub struct ArrayValue {
    element: Arc<SchemaType>,
    schema: SchemaType,
    binding: Binding,
    elements: Vec<Value>,
}

impl ArrayValue {
    pub fn new(element: Arc<SchemaType>) -> Self {
        Self {
            schema: SchemaType::Array(element.clone()),
            element,
            binding: Binding::unbound(),
            elements: Vec::new(),
        }
    }

    /// Creates an empty array of `element`.
    pub fn of(element: SchemaType) -> Self {
        Self::new(Arc::new(element))
    }

    pub fn for_schema(schema: &SchemaType) -> Result<Self, BindError> {
        match schema {
            SchemaType::Array(element) => Ok(Self::new(element.clone())),
            other => Err(BindError::TypeMismatch {
                expected: Kind::Array,
                found: other.kind().name(),
                context: "array construction",
            }),
        }
    }

    pub fn with_locator(mut self, locator: ResourceLocator) -> Self {
        self.binding.set(locator);
        self
    }

    pub fn element_type(&self) -> &SchemaType {
        &self.element
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.elements.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    /// Appends an element, which must conform to the element schema.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<(), BindError> {
        let value = value.into();
        if !value.conforms_to(&self.element) {
            return Err(BindError::TypeMismatch {
                expected: self.element.kind(),
                found: value.type_name(),
                context: "array element",
            });
        }
        self.elements.push(value);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<Value> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

impl PartialEq for ArrayValue {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.elements == other.elements
    }
}

impl BoundValue for ArrayValue {
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
        for value in &mut self.elements {
            let row = store.insert(at, Row::new())?;
            let mut staged = Row::new();
            dispatch::save_column(
                store,
                &self.element,
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
        let mut elements = Vec::with_capacity(rows.len());
        for row in rows {
            elements.push(dispatch::load_column(
                store,
                &self.element,
                &row.values,
                VALUE_COLUMN,
                &row.locator,
                Placement::Element,
            )?);
        }
        self.elements = elements;
        Ok(())
    }

    fn delete_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
    ) -> Result<(), BindError> {
        for value in &mut self.elements {
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
        let count = snapshot_count(self.elements.len(), "array")?;
        snapshot.put_int(&count_name(name), count);

        match route(&self.element) {
            Route::Scalar(kind) => {
                if let Some(slot) = SlotCodec::encode_array(kind, &self.elements)? {
                    snapshot.put_slot(name, slot);
                }
            }
            Route::Composite(_) | Route::Union(_) => {
                for (index, value) in self.elements.iter().enumerate() {
                    let slot = indexed_name(name, index);
                    dispatch::save_slot(snapshot, &self.element, value, &slot)?;
                }
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

        self.elements = match route(&self.element) {
            Route::Scalar(kind) => match snapshot.slot(name) {
                Some(slot) => SlotCodec::decode_array(kind, slot).unwrap_or_else(|| {
                    warn!(slot = name, found = slot.type_name(), "array slot has the wrong type");
                    Vec::new()
                }),
                None => vec![Value::Null; count],
            },
            Route::Composite(_) | Route::Union(_) => (0..count)
                .map(|index| {
                    dispatch::load_slot(snapshot, &self.element, &indexed_name(name, index))
                })
                .collect::<Result<_, _>>()?,
        };
        if self.elements.len() != count {
            warn!(
                slot = name,
                count,
                found = self.elements.len(),
                "array count does not match its elements"
            );
        }
        Ok(())
    }
}
