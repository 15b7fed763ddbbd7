//! Row-oriented persistent store interface.
//!
//! The binding engine talks to a store only through [`RowStore`]: query a
//! locator, insert a child row, update a row, delete a row or range. The
//! store's own semantics are assumed correct.

pub mod memory;

pub use memory::{MemoryStore, Operation};

use crate::error::StoreError;
use crate::locator::{ResourceLocator, RowId};

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Datum {
    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Datum::Null => "null",
            Datum::Boolean(_) => "boolean",
            Datum::Int(_) => "int",
            Datum::Long(_) => "long",
            Datum::Float(_) => "float",
            Datum::Double(_) => "double",
            Datum::Text(_) => "text",
            Datum::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    // Stores commonly widen integers and narrow booleans, so the readers
    // accept any integral representation.

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Boolean(b) => Some(*b),
            Datum::Int(i) => Some(*i != 0),
            Datum::Long(l) => Some(*l != 0),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::Int(i) => Some(*i as i64),
            Datum::Long(l) => Some(*l),
            Datum::Boolean(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Float(f) => Some(*f as f64),
            Datum::Double(d) => Some(*d),
            Datum::Int(i) => Some(*i as f64),
            Datum::Long(l) => Some(*l as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Datum::Blob(b) => Some(b),
            _ => None,
        }
    }
}

/// Column values of one row, in staging order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Datum)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, replacing any earlier value for the same name.
    pub fn set(&mut self, column: impl Into<String>, value: Datum) {
        let column = column.into();
        match self.columns.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, column: impl Into<String>, value: Datum) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Datum> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Copies every column of `other` into this row.
    pub fn merge(&mut self, other: Row) {
        for (column, value) in other.columns {
            self.set(column, value);
        }
    }
}

/// A row returned by [`RowStore::query`], with its own address.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub locator: ResourceLocator,
    pub id: RowId,
    pub values: Row,
}

/// Minimal interface to an external row store.
///
/// All calls are synchronous. Results are owned, so no cursor outlives the
/// call that produced it.
pub trait RowStore {
    /// Returns the row at `locator`, or the rows of the collection at `locator`
    /// in insertion order. Array element order depends on that order.
    fn query(&mut self, locator: &ResourceLocator) -> Result<Vec<StoredRow>, StoreError>;

    /// Inserts a row into the collection at `locator`, returning the new row's locator.
    fn insert(
        &mut self,
        locator: &ResourceLocator,
        values: Row,
    ) -> Result<ResourceLocator, StoreError>;

    /// Updates the row at `locator`, returning the number of rows touched.
    fn update(&mut self, locator: &ResourceLocator, values: Row) -> Result<usize, StoreError>;

    /// Deletes the row or row range at `locator`, returning the number of rows removed.
    fn delete(&mut self, locator: &ResourceLocator) -> Result<usize, StoreError>;

    /// Extracts a row identifier from a locator returned by this store.
    fn identify(&self, locator: &ResourceLocator) -> Option<RowId> {
        locator.trailing_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_set_replaces() {
        let mut row = Row::new().with("a", Datum::Int(1)).with("b", Datum::Null);
        row.set("a", Datum::Int(2));
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("a"), Some(&Datum::Int(2)));
    }

    #[test]
    fn test_row_merge() {
        let mut row = Row::new().with("a", Datum::Int(1));
        row.merge(Row::new().with("a", Datum::Int(5)).with("c", Datum::Text("x".into())));
        let cols: Vec<&str> = row.iter().map(|(c, _)| c).collect();
        assert_eq!(cols, ["a", "c"]);
        assert_eq!(row.get("a").and_then(Datum::as_i64), Some(5));
    }

    #[test]
    fn test_datum_widening() {
        assert_eq!(Datum::Int(3).as_i64(), Some(3));
        assert_eq!(Datum::Long(1).as_bool(), Some(true));
        assert_eq!(Datum::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Datum::Text("x".into()).as_i64(), None);
    }
}
