//! Diff of config values against their loaded snapshot

use std::collections::BTreeMap;

use serde_json::Value;

use crate::value::{Values, loose_eq};

/// `(old, new)` pairs keyed by value code.
pub type ChangeSet = BTreeMap<String, (Value, Value)>;

/// Computes the changes from `original` to `current`.
///
/// A code present in both is emitted when the values are not loosely equal.
/// A code only in `current` is emitted as `(null, new)`. Codes only in
/// `original` are not emitted; their removal still reaches storage on flush.
pub fn diff(original: &Values, current: &Values) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for (code, old) in original {
        if let Some(new) = current.get(code)
            && !loose_eq(old, new)
        {
            changes.insert(code.clone(), (old.clone(), new.clone()));
        }
    }

    for (code, new) in current {
        if !original.contains_key(code) {
            changes.insert(code.clone(), (Value::Null, new.clone()));
        }
    }

    changes
}

/// Layers `incoming` over `existing`, keeping the first observed old value
/// of each code.
pub fn merge_change_sets(existing: &mut ChangeSet, incoming: ChangeSet) {
    for (code, (old, new)) in incoming {
        match existing.get_mut(&code) {
            Some(entry) => entry.1 = new,
            None => {
                existing.insert(code, (old, new));
            }
        }
    }
}
