//! In-memory reference [`RowStore`].
//!
//! A locator addresses either a row (exact match) or the collection of
//! rows directly beneath it. Collections iterate in insertion order.
//! Every call is appended to a journal for inspection.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::error::StoreError;
use crate::locator::{ResourceLocator, RowId};
use crate::store::{Row, RowStore, StoredRow};

/// A store call recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Query(ResourceLocator),
    Insert(ResourceLocator),
    Update(ResourceLocator),
    Delete(ResourceLocator),
}

#[derive(Debug, Clone)]
struct Entry {
    id: RowId,
    seq: u64,
    values: Row,
}

/// Row store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    // Keyed by locator path so that a subtree is one contiguous range.
    rows: BTreeMap<String, Entry>,
    next_id: RowId,
    next_seq: u64,
    journal: Vec<Operation>,
    rejected: FxHashSet<ResourceLocator>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row stored exactly at `locator`.
    pub fn row(&self, locator: &ResourceLocator) -> Option<&Row> {
        self.rows.get(locator.as_str()).map(|e| &e.values)
    }

    /// Calls made so far, oldest first.
    pub fn journal(&self) -> &[Operation] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Locators passed to `delete`, in call order.
    pub fn deletes(&self) -> Vec<&ResourceLocator> {
        self.journal
            .iter()
            .filter_map(|op| match op {
                Operation::Delete(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    /// Makes every later `delete` at `locator` fail.
    pub fn reject_deletes_at(&mut self, locator: ResourceLocator) {
        self.rejected.insert(locator);
    }

    fn allocate(&mut self) -> (RowId, u64) {
        self.next_id += 1;
        self.next_seq += 1;
        (self.next_id, self.next_seq)
    }

    /// Keys strictly below `locator`, in path order.
    fn descendants<'a>(
        &'a self,
        locator: &ResourceLocator,
    ) -> impl Iterator<Item = (&'a String, &'a Entry)> {
        let lower = format!("{}/", locator.as_str());
        // '0' is the character right after '/'.
        let upper = format!("{}0", locator.as_str());
        self.rows.range(lower..upper)
    }
}

impl RowStore for MemoryStore {
    fn query(&mut self, locator: &ResourceLocator) -> Result<Vec<StoredRow>, StoreError> {
        self.journal.push(Operation::Query(locator.clone()));

        if let Some(entry) = self.rows.get(locator.as_str()) {
            return Ok(vec![StoredRow {
                locator: locator.clone(),
                id: entry.id,
                values: entry.values.clone(),
            }]);
        }

        let depth = locator.as_str().len() + 1;
        let mut children: Vec<(u64, StoredRow)> = self
            .descendants(locator)
            .filter(|(path, _)| !path[depth..].contains('/'))
            .map(|(path, entry)| {
                (
                    entry.seq,
                    StoredRow {
                        locator: ResourceLocator::new(path.clone()),
                        id: entry.id,
                        values: entry.values.clone(),
                    },
                )
            })
            .collect();
        children.sort_by_key(|(seq, _)| *seq);
        Ok(children.into_iter().map(|(_, row)| row).collect())
    }

    fn insert(
        &mut self,
        locator: &ResourceLocator,
        values: Row,
    ) -> Result<ResourceLocator, StoreError> {
        self.journal.push(Operation::Insert(locator.clone()));

        let (id, seq) = self.allocate();
        let child = locator.with_id(id);
        self.rows
            .insert(child.as_str().to_string(), Entry { id, seq, values });
        Ok(child)
    }

    fn update(&mut self, locator: &ResourceLocator, values: Row) -> Result<usize, StoreError> {
        self.journal.push(Operation::Update(locator.clone()));

        if let Some(entry) = self.rows.get_mut(locator.as_str()) {
            entry.values.merge(values);
            return Ok(1);
        }
        let (id, seq) = self.allocate();
        self.rows
            .insert(locator.as_str().to_string(), Entry { id, seq, values });
        Ok(1)
    }

    fn delete(&mut self, locator: &ResourceLocator) -> Result<usize, StoreError> {
        self.journal.push(Operation::Delete(locator.clone()));

        if self.rejected.contains(locator) {
            return Err(StoreError::Rejected {
                operation: "delete",
                locator: locator.to_string(),
                reason: "rejected by test hook".to_string(),
            });
        }

        let mut doomed: Vec<String> = self.descendants(locator).map(|(k, _)| k.clone()).collect();
        if self.rows.contains_key(locator.as_str()) {
            doomed.push(locator.as_str().to_string());
        }
        for key in &doomed {
            self.rows.remove(key);
        }
        Ok(doomed.len())
    }

    fn identify(&self, locator: &ResourceLocator) -> Option<RowId> {
        self.rows
            .get(locator.as_str())
            .map(|e| e.id)
            .or_else(|| locator.trailing_id())
    }
}
