//! Structural diff between two snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::canonical::normalize_numbers;

/// A leaf whose value differs between snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub old: Value,
    pub new: Value,
}

/// Differences between two snapshots keyed by dotted path.
///
/// Paths join object keys with `.`; the document root is the empty path.
/// Arrays are compared as whole values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationDiff {
    pub added: BTreeMap<String, Value>,
    pub removed: BTreeMap<String, Value>,
    pub changed: BTreeMap<String, Change>,
}

/// Compare `old` against `new`.
///
/// Numbers are normalized first, so `10.0` and `10` are equal. A value
/// whose type differs between snapshots is a change, never an error.
pub fn diff(old: &Value, new: &Value) -> AllocationDiff {
    let (old, new) = (normalize_numbers(old), normalize_numbers(new));
    let mut out = AllocationDiff::default();

    match (&old, &new) {
        (Value::Object(a), Value::Object(b)) => out.walk("", a, b),
        _ if old != new => {
            out.changed.insert(String::new(), Change { old, new });
        }
        _ => {}
    }

    debug!(
        added = out.added.len(),
        removed = out.removed.len(),
        changed = out.changed.len(),
        "Snapshots compared"
    );
    out
}

impl AllocationDiff {
    fn walk(&mut self, prefix: &str, old: &Map<String, Value>, new: &Map<String, Value>) {
        for (key, value) in new {
            if !old.contains_key(key) {
                self.added.insert(format!("{prefix}{key}"), value.clone());
            }
        }
        for (key, value) in old {
            let path = format!("{prefix}{key}");
            let Some(next) = new.get(key) else {
                self.removed.insert(path, value.clone());
                continue;
            };
            match (value, next) {
                (Value::Object(a), Value::Object(b)) => self.walk(&format!("{path}."), a, b),
                _ if value != next => {
                    self.changed.insert(
                        path,
                        Change {
                            old: value.clone(),
                            new: next.clone(),
                        },
                    );
                }
                _ => {}
            }
        }
    }

    /// Returns true if the snapshots were equal.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of differing paths.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }

    /// Apply this diff to `old`: removals first, then changes, then
    /// additions. Missing intermediate objects are created, and a
    /// non-object in the way is replaced by one.
    pub fn apply(&self, old: &Value) -> Value {
        let mut doc = normalize_numbers(old);

        for path in self.removed.keys() {
            remove_path(&mut doc, path);
        }
        for (path, change) in &self.changed {
            set_path(&mut doc, path, change.new.clone());
        }
        for (path, value) in &self.added {
            set_path(&mut doc, path, value.clone());
        }
        doc
    }
}

fn remove_path(doc: &mut Value, path: &str) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };
    let mut cursor = doc;
    for segment in segments {
        match cursor.get_mut(segment) {
            Some(next) => cursor = next,
            None => return,
        }
    }
    if let Value::Object(map) = cursor {
        map.remove(last);
    }
}

fn set_path(doc: &mut Value, path: &str, value: Value) {
    if path.is_empty() {
        *doc = value;
        return;
    }
    let mut cursor = doc;
    for segment in path.split('.') {
        if !cursor.is_object() {
            *cursor = Value::Object(Map::new());
        }
        let Value::Object(map) = cursor else {
            return;
        };
        cursor = map.entry(segment).or_insert(Value::Null);
    }
    *cursor = value;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_diff_added_removed_changed() {
        let old = json!({
            "shared_allocations": {
                "dc1": {"db": {"cpu": 10, "mem": 10, "storage": 10}, "cache": {"cpu": 1, "mem": 1, "storage": 1}}
            }
        });
        let new = json!({
            "shared_allocations": {
                "dc1": {"db": {"cpu": 12, "mem": 10, "storage": 10}},
                "dc2": {"db": {"cpu": 12, "mem": 10, "storage": 10}}
            }
        });

        let diff = diff(&old, &new);
        assert_eq!(
            serde_json::to_value(&diff).unwrap(),
            json!({
                "added": {
                    "shared_allocations.dc2": {"db": {"cpu": 12, "mem": 10, "storage": 10}}
                },
                "removed": {
                    "shared_allocations.dc1.cache": {"cpu": 1, "mem": 1, "storage": 1}
                },
                "changed": {
                    "shared_allocations.dc1.db.cpu": {"old": 10, "new": 12}
                }
            })
        );
        assert_eq!(diff.len(), 3);
    }

    #[test]
    fn test_identical_documents_have_empty_diff() {
        let doc = json!({"a": {"b": [1, 2]}, "c": null});
        assert!(diff(&doc, &doc).is_empty());
    }

    #[test]
    fn test_integral_floats_equal_integers() {
        let old = json!({"dc1": {"db": {"cpu": 10}}});
        let new = json!({"dc1": {"db": {"cpu": 10.0}}});
        assert!(diff(&old, &new).is_empty());
    }

    #[test]
    fn test_type_mismatch_is_a_change() {
        let old = json!({"dc1": {"db": 5}});
        let new = json!({"dc1": {"db": {"cpu": 5}}});
        let diff = diff(&old, &new);
        assert_eq!(
            diff.changed["dc1.db"],
            Change {
                old: json!(5),
                new: json!({"cpu": 5})
            }
        );
    }

    #[test]
    fn test_arrays_are_leaves() {
        let diff = diff(&json!({"dcs": ["dc1", "dc2"]}), &json!({"dcs": ["dc1"]}));
        assert_eq!(diff.changed.keys().collect::<Vec<_>>(), vec!["dcs"]);
    }

    #[test]
    fn test_non_object_roots() {
        let diff = diff(&json!([1]), &json!({"a": 1}));
        assert_eq!(diff.changed.keys().collect::<Vec<_>>(), vec![""]);
        assert_eq!(diff.apply(&json!([1])), json!({"a": 1}));
    }

    #[test]
    fn test_apply_reconstructs_new() {
        let old = json!({"a": {"x": 1, "y": 2}, "b": 3, "c": {"deep": {"v": 1}}});
        let new = json!({"a": {"x": 1, "z": 4}, "b": {"nested": true}, "d": 5});
        assert_eq!(diff(&old, &new).apply(&old), new);
    }

    #[test]
    fn test_apply_creates_intermediate_objects() {
        let mut diff = AllocationDiff::default();
        diff.added.insert("p.q.r".to_string(), json!(1));
        assert_eq!(diff.apply(&json!({"p": 7})), json!({"p": {"q": {"r": 1}}}));
    }
}
