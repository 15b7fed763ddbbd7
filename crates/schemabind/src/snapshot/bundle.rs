//! In-memory snapshot container.

use rustc_hash::FxHashMap;

use crate::snapshot::{SlotValue, SnapshotContainer};

/// A flat map of named slots. Encode it with
/// [`encode_bundle`](crate::codec::encode_bundle) to carry it across a
/// process restart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    slots: FxHashMap<String, SlotValue>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<SlotValue> {
        self.slots.remove(name)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Iterates slots in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SlotValue)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Slot names in lexicographic order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl SnapshotContainer for Bundle {
    fn put_slot(&mut self, name: &str, value: SlotValue) {
        self.slots.insert(name.to_string(), value);
    }

    fn slot(&self, name: &str) -> Option<&SlotValue> {
        self.slots.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::ResourceLocator;

    #[test]
    fn test_typed_accessors() {
        let mut bundle = Bundle::new();
        bundle.put_int("a", 3);
        bundle.put_string_array("b", vec!["x".into()]);
        bundle.put_locator("c", ResourceLocator::new("people/1"));

        assert_eq!(bundle.get_int("a"), Some(&3));
        assert_eq!(bundle.get_long("a"), None);
        assert_eq!(bundle.get_string_array("b").map(Vec::len), Some(1));
        assert_eq!(bundle.get_locator("c").map(|l| l.as_str()), Some("people/1"));
        assert!(!bundle.contains("d"));
    }

    #[test]
    fn test_put_overwrites() {
        let mut bundle = Bundle::new();
        bundle.put_int("a", 1);
        bundle.put_string("a", "now a string".into());
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.get_int("a"), None);
    }
}
