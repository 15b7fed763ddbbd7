//! Per-backend dispatch from a schema node to its read or write.
//!
//! Both tables go through [`route`]: scalars are handed to the backend's
//! [`ScalarCodec`], composites recurse through [`BoundValue`], and unions
//! are resolved to their active branch first.

use tracing::{trace, warn};

use crate::error::BindError;
use crate::locator::ResourceLocator;
use crate::naming::union_branch_name;
use crate::schema::{Kind, SchemaType};
use crate::snapshot::SnapshotContainer;
use crate::store::{Datum, Row, RowStore};
use crate::value::scalar::{mismatch, route, Route, RowCodec, ScalarCodec, SlotCodec};
use crate::value::{BoundValue, UnionValue, Value};

/// Where a composite child sits relative to the row that refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// A record field: the child lives at `base` and keeps any existing binding.
    Field,
    /// An array element or map value: the child lives under its element row
    /// at a per-kind sub-path and is rebound on every save.
    Element,
}

impl Placement {
    pub(crate) fn locate(self, base: &ResourceLocator, kind: Kind) -> ResourceLocator {
        match self {
            Placement::Field => base.clone(),
            Placement::Element => base.child(kind.name()),
        }
    }
}

// =============================================================================
// ROW BACKEND
// =============================================================================

/// Writes `value` as `column` of the row being staged, saving composite
/// children at their derived locators.
pub(crate) fn save_column(
    store: &mut dyn RowStore,
    schema: &SchemaType,
    value: &mut Value,
    column: &str,
    base: &ResourceLocator,
    placement: Placement,
    staged: &mut Row,
) -> Result<(), BindError> {
    match route(schema) {
        Route::Scalar(kind) => {
            if let Some(datum) = RowCodec::encode(kind, value)? {
                trace!(column, value = datum.type_name(), "stage column");
                staged.set(column, datum);
            }
        }
        Route::Composite(kind) => {
            let found = value.type_name();
            let child = match value.as_bound_mut() {
                Some(child) if child.schema().kind() == kind => child,
                _ => {
                    return Err(BindError::TypeMismatch {
                        expected: kind,
                        found,
                        context: "row column",
                    });
                }
            };
            if placement == Placement::Element || child.locator().is_none() {
                child.set_locator(placement.locate(base, kind));
            }
            if let Some(id) = child.save(store, column)? {
                staged.set(column, Datum::Long(id));
            }
        }
        Route::Union(_) => {
            let Value::Union(union) = value else {
                return Err(mismatch(Kind::Union, value, "row column"));
            };
            if placement == Placement::Element || union.locator().is_none() {
                union.set_locator(base.clone());
            }
            save_union_column(store, union, column, base, placement, staged)?;
        }
    }
    Ok(())
}

fn save_union_column(
    store: &mut dyn RowStore,
    union: &mut UnionValue,
    column: &str,
    base: &ResourceLocator,
    placement: Placement,
    staged: &mut Row,
) -> Result<(), BindError> {
    let branch_column = union_branch_name(column);
    let Some((branch, value)) = union.active_mut() else {
        staged.set(branch_column, Datum::Null);
        staged.set(column, Datum::Null);
        return Ok(());
    };
    staged.set(branch_column, Datum::Text(branch.type_name().to_string()));
    save_column(store, &branch, value, column, base, placement, staged)
}

/// Reads `column` of a loaded row, loading composite children from their
/// derived locators. Missing or unreadable scalar columns load as `Null`.
pub(crate) fn load_column(
    store: &mut dyn RowStore,
    schema: &SchemaType,
    row: &Row,
    column: &str,
    base: &ResourceLocator,
    placement: Placement,
) -> Result<Value, BindError> {
    match route(schema) {
        Route::Scalar(kind) => {
            let value = row
                .get(column)
                .and_then(|datum| RowCodec::decode(kind, datum))
                .unwrap_or(Value::Null);
            trace!(column, value = value.type_name(), "read column");
            Ok(value)
        }
        Route::Composite(kind) => {
            let mut child = Value::empty_for(schema);
            if let Some(bound) = child.as_bound_mut() {
                bound.set_locator(placement.locate(base, kind));
                bound.load(store, column)?;
            }
            Ok(child)
        }
        Route::Union(union_schema) => {
            let mut union = UnionValue::for_schema(schema)?;
            union.set_locator(base.clone());
            let tag = row.get(&union_branch_name(column)).and_then(Datum::as_str);
            if let Some(name) = tag {
                match union_schema.branches().iter().find(|b| b.type_name() == name) {
                    Some(branch) => {
                        let value = load_column(store, branch, row, column, base, placement)?;
                        if let Err(err) = union.set_value(value, branch) {
                            warn!(
                                column,
                                branch = name,
                                %err,
                                "stored union value does not match its branch"
                            );
                        }
                    }
                    None => warn!(column, branch = name, "stored union branch is not declared"),
                }
            }
            Ok(Value::Union(Box::new(union)))
        }
    }
}

/// Deletes a composite child. Scalars live in the parent row and unbound
/// children were never persisted, so both are skipped.
pub(crate) fn delete_child(store: &mut dyn RowStore, value: &mut Value) -> Result<(), BindError> {
    match value.as_bound_mut() {
        Some(child) if child.locator().is_some() => child.delete(store),
        _ => Ok(()),
    }
}

// =============================================================================
// SNAPSHOT BACKEND
// =============================================================================

pub(crate) fn save_slot(
    snapshot: &mut dyn SnapshotContainer,
    schema: &SchemaType,
    value: &Value,
    name: &str,
) -> Result<(), BindError> {
    match route(schema) {
        Route::Scalar(kind) => {
            if let Some(slot) = SlotCodec::encode(kind, value)? {
                trace!(slot = name, value = slot.type_name(), "put slot");
                snapshot.put_slot(name, slot);
            }
            Ok(())
        }
        Route::Composite(kind) => match value.as_bound() {
            Some(child) if child.schema().kind() == kind => child.save_state(snapshot, name),
            _ => Err(mismatch(kind, value, "snapshot slot")),
        },
        Route::Union(_) => Err(BindError::UnsupportedType {
            kind: Kind::Union,
            context: "snapshot",
        }),
    }
}

pub(crate) fn load_slot(
    snapshot: &dyn SnapshotContainer,
    schema: &SchemaType,
    name: &str,
) -> Result<Value, BindError> {
    match route(schema) {
        Route::Scalar(kind) => Ok(snapshot
            .slot(name)
            .and_then(|slot| SlotCodec::decode(kind, slot))
            .unwrap_or(Value::Null)),
        Route::Composite(_) => {
            let mut child = Value::empty_for(schema);
            if let Some(bound) = child.as_bound_mut() {
                bound.load_state(snapshot, name)?;
            }
            Ok(child)
        }
        Route::Union(_) => Err(BindError::UnsupportedType {
            kind: Kind::Union,
            context: "snapshot",
        }),
    }
}
