//! Hierarchical resource locators.
//!
//! A locator is an opaque `/`-separated address of a row or a collection
//! of rows in the persistent store.

use std::fmt;

/// Store-assigned row identifier.
pub type RowId = i64;

/// Address of a row or collection in a [`RowStore`](crate::store::RowStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocator(String);

impl ResourceLocator {
    /// Creates a locator, trimming any trailing separator.
    pub fn new(path: impl Into<String>) -> Self {
        let mut path = path.into();
        while path.ends_with('/') {
            path.pop();
        }
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the locator one segment below this one.
    pub fn child(&self, segment: &str) -> ResourceLocator {
        if self.0.is_empty() {
            return ResourceLocator(segment.to_string());
        }
        ResourceLocator(format!("{}/{}", self.0, segment))
    }

    /// Returns the locator of a row identified by `id` inside this collection.
    pub fn with_id(&self, id: RowId) -> ResourceLocator {
        self.child(&id.to_string())
    }

    /// Returns the enclosing locator, or `None` at the root.
    pub fn parent(&self) -> Option<ResourceLocator> {
        self.0
            .rfind('/')
            .map(|i| ResourceLocator(self.0[..i].to_string()))
    }

    /// Returns the final path segment.
    pub fn last_segment(&self) -> &str {
        match self.0.rfind('/') {
            Some(i) => &self.0[i + 1..],
            None => &self.0,
        }
    }

    /// Parses the final segment as a row identifier.
    pub fn trailing_id(&self) -> Option<RowId> {
        self.last_segment().parse().ok()
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceLocator {
    fn from(s: &str) -> Self {
        ResourceLocator::new(s)
    }
}

impl From<String> for ResourceLocator {
    fn from(s: String) -> Self {
        ResourceLocator::new(s)
    }
}
