//! Union values: at most one active branch at a time.

use std::sync::Arc;

use crate::error::BindError;
use crate::locator::{ResourceLocator, RowId};
use crate::schema::{Kind, SchemaType, UnionSchema};
use crate::snapshot::SnapshotContainer;
use crate::store::RowStore;
use crate::value::dispatch;
use crate::value::{Binding, BoundValue, Value};

#[derive(Debug, Clone, PartialEq)]
struct Active {
    kind: Kind,
    name: String,
    value: Value,
}

/// A union value.
///
/// The active branch is remembered by `(kind, type name)`, which is unique
/// among the declared branches, so two record branches of different names
/// are never confused. In the row backend the parent row carries the
/// branch name in a `<column>.branch` column next to the value itself.
/// Unions cannot be written to a snapshot.
#[derive(Debug, Clone)]
pub struct UnionValue {
    union: Arc<UnionSchema>,
    schema: SchemaType,
    binding: Binding,
    active: Option<Active>,
}

impl UnionValue {
    pub fn new(union: Arc<UnionSchema>) -> Self {
        Self {
            schema: SchemaType::Union(union.clone()),
            union,
            binding: Binding::unbound(),
            active: None,
        }
    }

    pub fn for_schema(schema: &SchemaType) -> Result<Self, BindError> {
        match schema {
            SchemaType::Union(union) => Ok(Self::new(union.clone())),
            other => Err(BindError::TypeMismatch {
                expected: Kind::Union,
                found: other.kind().name(),
                context: "union construction",
            }),
        }
    }

    pub fn with_locator(mut self, locator: ResourceLocator) -> Self {
        self.binding.set(locator);
        self
    }

    pub fn branches(&self) -> &[SchemaType] {
        self.union.branches()
    }

    /// Makes `branch` the active branch with `value`.
    ///
    /// Fails with [`BindError::BranchNotDeclared`] if the union declares no
    /// branch of that kind and name, leaving the union unchanged.
    pub fn set_value(
        &mut self,
        value: impl Into<Value>,
        branch: &SchemaType,
    ) -> Result<(), BindError> {
        let value = value.into();
        let kind = branch.kind();
        let name = branch.type_name();
        let declared = self
            .union
            .find_branch(kind, name)
            .ok_or_else(|| BindError::BranchNotDeclared {
                kind,
                name: name.to_string(),
            })?;
        if !value.conforms_to(declared) {
            return Err(BindError::TypeMismatch {
                expected: kind,
                found: value.type_name(),
                context: "union branch",
            });
        }
        self.active = Some(Active {
            kind,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    /// Activates the first declared branch that accepts `value`.
    pub fn set(&mut self, value: impl Into<Value>) -> Result<(), BindError> {
        let value = value.into();
        let branches = self.union.branches();
        let Some(branch) = branches.iter().find(|b| value.conforms_to(b)).cloned() else {
            return Err(BindError::TypeMismatch {
                expected: Kind::Union,
                found: value.type_name(),
                context: "union value",
            });
        };
        self.set_value(value, &branch)
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn is_set(&self) -> bool {
        self.active.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.active.as_ref().map(|a| &a.value)
    }

    pub fn value_mut(&mut self) -> Option<&mut Value> {
        self.active.as_mut().map(|a| &mut a.value)
    }

    /// Returns the declared schema of the active branch.
    pub fn value_schema(&self) -> Option<&SchemaType> {
        let active = self.active.as_ref()?;
        self.union.find_branch(active.kind, &active.name)
    }

    /// The active branch schema together with its value.
    pub(crate) fn active_mut(&mut self) -> Option<(SchemaType, &mut Value)> {
        let active = self.active.as_mut()?;
        let branch = self.union.find_branch(active.kind, &active.name)?.clone();
        Some((branch, &mut active.value))
    }
}

impl PartialEq for UnionValue {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.active == other.active
    }
}

impl BoundValue for UnionValue {
    fn schema(&self) -> &SchemaType {
        &self.schema
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }

    /// Saves a composite active value at the union's own locator. Scalar
    /// branches live in the parent row and have nothing to save here.
    fn save_at(
        &mut self,
        store: &mut dyn RowStore,
        at: &ResourceLocator,
        field: &str,
    ) -> Result<Option<RowId>, BindError> {
        match self.value_mut().and_then(Value::as_bound_mut) {
            Some(child) => {
                if child.locator().is_none() {
                    child.set_locator(at.clone());
                }
                child.save(store, field)
            }
            None => Ok(None),
        }
    }

    fn load_at(
        &mut self,
        store: &mut dyn RowStore,
        _at: &ResourceLocator,
        field: &str,
    ) -> Result<(), BindError> {
        match self.value_mut().and_then(Value::as_bound_mut) {
            Some(child) if child.locator().is_some() => child.load(store, field),
            _ => Ok(()),
        }
    }

    fn delete_at(
        &mut self,
        store: &mut dyn RowStore,
        _at: &ResourceLocator,
    ) -> Result<(), BindError> {
        match self.value_mut() {
            Some(value) => dispatch::delete_child(store, value),
            None => Ok(()),
        }
    }

    fn save_state(
        &self,
        _snapshot: &mut dyn SnapshotContainer,
        _name: &str,
    ) -> Result<(), BindError> {
        Err(BindError::UnsupportedType {
            kind: Kind::Union,
            context: "snapshot",
        })
    }

    fn load_state(
        &mut self,
        _snapshot: &dyn SnapshotContainer,
        _name: &str,
    ) -> Result<(), BindError> {
        Err(BindError::UnsupportedType {
            kind: Kind::Union,
            context: "snapshot",
        })
    }
}
