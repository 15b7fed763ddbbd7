//! Deterministic slot and column names.
//!
//! Both backends derive every nested name from a base name plus a field
//! name or an index, so no index table is ever persisted. Field names are
//! schema identifiers (`[A-Za-z_][A-Za-z0-9_]*`), which never contain the
//! separator or a `.`, so nested names and suffixed names cannot collide.

/// Separator between a base name and a nested field name or index.
pub const SEP: char = '/';

const COUNT_SUFFIX: &str = ".count";
const KEY_SUFFIX: &str = ".key";
const VALUE_SUFFIX: &str = ".value";
const LOCATOR_SUFFIX: &str = ".locator";
const BRANCH_SUFFIX: &str = ".branch";
const DIRTY_SUFFIX: &str = ".dirty";

/// Column written for array elements and map values in the row backend.
pub const VALUE_COLUMN: &str = "value";

/// Column holding the key of a map entry in the row backend.
pub const KEY_COLUMN: &str = "key";

/// `base/name`, or just `name` when `base` is empty.
pub fn field_full_name(base: &str, name: &str) -> String {
    if base.is_empty() {
        return name.to_string();
    }
    let mut out = String::with_capacity(base.len() + 1 + name.len());
    out.push_str(base);
    out.push(SEP);
    out.push_str(name);
    out
}

/// Slot holding the element or entry count of a collection.
pub fn count_name(name: &str) -> String {
    format!("{name}{COUNT_SUFFIX}")
}

/// Slot of the `i`-th element below `name`.
pub fn indexed_name(name: &str, index: usize) -> String {
    format!("{name}{SEP}{index}")
}

/// Base name under which map keys are indexed.
pub fn map_key_name(name: &str) -> String {
    format!("{name}{KEY_SUFFIX}")
}

/// Base name under which map values are indexed.
pub fn map_value_name(name: &str) -> String {
    format!("{name}{VALUE_SUFFIX}")
}

/// Slot holding the resource locator of the composite stored at `name`.
pub fn type_locator_slot(name: &str) -> String {
    format!("{name}{LOCATOR_SUFFIX}")
}

/// Column holding the active branch name of a union stored at `name`.
pub fn union_branch_name(name: &str) -> String {
    format!("{name}{BRANCH_SUFFIX}")
}

/// Slot holding the unsaved-changes flag of a record model stored at `name`.
pub fn dirty_flag_slot(name: &str) -> String {
    format!("{name}{DIRTY_SUFFIX}")
}

/// Snapshot name of a record: the prefix, or the record's own name at the root.
pub fn record_full_name(prefix: &str, record_name: &str) -> String {
    if prefix.is_empty() {
        record_name.to_string()
    } else {
        prefix.to_string()
    }
}
