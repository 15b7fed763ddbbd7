//! The binding lifecycle shared by every composite value.
//!
//! A composite implements the `*_at` callbacks of [`BoundValue`], which
//! receive the locator explicitly. The provided methods
//! ([`save`](BoundValue::save), [`load`](BoundValue::load),
//! [`delete`](BoundValue::delete)) check that a locator is bound and fail
//! with [`BindError::NotBound`] before any store call otherwise. Snapshot
//! operations need no locator.

use tracing::debug;

use crate::error::BindError;
use crate::locator::{ResourceLocator, RowId};
use crate::schema::SchemaType;
use crate::snapshot::SnapshotContainer;
use crate::store::RowStore;

/// The optional resource locator of a composite value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    locator: Option<ResourceLocator>,
}

impl Binding {
    pub fn unbound() -> Self {
        Self { locator: None }
    }

    pub fn bound(locator: ResourceLocator) -> Self {
        Self {
            locator: Some(locator),
        }
    }

    pub fn get(&self) -> Option<&ResourceLocator> {
        self.locator.as_ref()
    }

    pub fn set(&mut self, locator: ResourceLocator) {
        self.locator = Some(locator);
    }

    pub fn clear(&mut self) {
        self.locator = None;
    }

    pub fn is_bound(&self) -> bool {
        self.locator.is_some()
    }

    /// Returns the bound locator, or `NotBound` naming the attempted operation.
    pub fn require(&self, context: &'static str) -> Result<ResourceLocator, BindError> {
        self.locator.clone().ok_or(BindError::NotBound { context })
    }
}

/// A composite value that can be persisted to a row store and to a snapshot.
pub trait BoundValue {
    fn schema(&self) -> &SchemaType;

    fn binding(&self) -> &Binding;

    fn binding_mut(&mut self) -> &mut Binding;

    /// Writes the value at `at`. `field` is the column the value occupies in
    /// its parent row, if any. Returns the row identifier the parent should
    /// record in that column.
    fn save_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
        field: &str,
    ) -> Result<Option<RowId>, BindError>;

    /// Replaces the in-memory data with what the store holds at `at`.
    fn load_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
        field: &str,
    ) -> Result<(), BindError>;

    /// Deletes the value and everything beneath it, children first.
    fn delete_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
    ) -> Result<(), BindError>;

    /// Writes the value into `snapshot` under `name`.
    fn save_state(&self, snapshot: &mut dyn SnapshotContainer, name: &str) -> Result<(), BindError>;

    /// Restores the value from the slots `save_state` wrote under `name`.
    fn load_state(&mut self, snapshot: &dyn SnapshotContainer, name: &str) -> Result<(), BindError>;

    fn locator(&self) -> Option<&ResourceLocator> {
        self.binding().get()
    }

    /// Binds (or rebinds) the value to `locator`.
    fn set_locator(&mut self, locator: ResourceLocator) {
        self.binding_mut().set(locator);
    }

    fn save(&mut self, store: &mut dyn RowStore, field: &str) -> Result<Option<RowId>, BindError> {
        let at = self.binding().require("save")?;
        debug!(locator = %at, kind = self.schema().kind().name(), "save");
        self.save_at(store, &at, field)
    }

    fn load(&mut self, store: &mut dyn RowStore, field: &str) -> Result<(), BindError> {
        let at = self.binding().require("load")?;
        debug!(locator = %at, kind = self.schema().kind().name(), "load");
        self.load_at(store, &at, field)
    }

    fn delete(&mut self, store: &mut dyn RowStore) -> Result<(), BindError> {
        let at = self.binding().require("delete")?;
        debug!(locator = %at, kind = self.schema().kind().name(), "delete");
        self.delete_at(store, &at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_unbound() {
        let binding = Binding::unbound();
        assert_eq!(binding.require("save"), Err(BindError::NotBound { context: "save" }));
    }

    #[test]
    fn test_rebind() {
        let mut binding = Binding::bound(ResourceLocator::new("a/1"));
        binding.set(ResourceLocator::new("a/2"));
        assert_eq!(binding.require("load").unwrap().as_str(), "a/2");
        binding.clear();
        assert!(!binding.is_bound());
    }
}
