//! Dotted key-path utilities.
//!
//! Paths like `"a.b.c"` address nested values: mappings are descended by
//! key, arrays by numeric index. The flatten/unflatten pair converts between
//! nested trees and single-level maps keyed by path, and
//! [`conditional_unflatten`] is the merge engine's entry hook — setter keys
//! containing a separator are expanded into nested structure before any
//! operator logic inspects them.

use std::borrow::Cow;

use serde_json::{Map, Value};

// ── Reading ───────────────────────────────────────────────────────────────

/// Resolve a dotted path against a value. Mappings are descended by key
/// (numeric-looking keys included), arrays by index.
pub fn value_for_key_path<'a>(path: &str, data: &'a Value) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Every mapping path in the tree, branches included, depth first. Arrays
/// are opaque leaves.
pub fn all_key_paths(data: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_key_paths(data, "", &mut paths);
    paths
}

fn collect_key_paths(data: &Value, prefix: &str, out: &mut Vec<String>) {
    if let Value::Object(map) = data {
        for (key, value) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            out.push(path.clone());
            collect_key_paths(value, &path, out);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlatObjectOptions {
    /// Include intermediate mapping branches alongside the leaves.
    pub include_branches: bool,
}

/// Flatten a tree into a single-level map from dotted leaf path to value.
pub fn flat_object(data: &Value, options: FlatObjectOptions) -> Map<String, Value> {
    let mut flat = Map::new();
    for path in all_key_paths(data) {
        if let Some(value) = value_for_key_path(&path, data) {
            if options.include_branches || !value.is_object() {
                flat.insert(path, value.clone());
            }
        }
    }
    flat
}

// ── Writing ───────────────────────────────────────────────────────────────

/// Write `value` at `path`, creating missing containers along the way:
/// arrays (null-padded) for numeric segments, mappings otherwise. Existing
/// mappings accept numeric-looking keys as strings; any other incompatible
/// node is replaced.
pub fn set_value_for_key_path(value: Value, path: &str, data: &mut Value) {
    match path.split_once('.') {
        None => set_segment(data, path, value),
        Some((head, rest)) => {
            set_value_for_key_path(value, rest, descend_or_create(data, head));
        }
    }
}

fn set_segment(container: &mut Value, segment: &str, value: Value) {
    coerce_container(container, segment);
    match container {
        Value::Object(map) => {
            map.insert(segment.to_owned(), value);
        }
        Value::Array(items) => {
            // coerce_container guarantees the parse succeeds
            if let Ok(index) = segment.parse::<usize>() {
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                items[index] = value;
            }
        }
        _ => {}
    }
}

fn descend_or_create<'a>(container: &'a mut Value, segment: &str) -> &'a mut Value {
    coerce_container(container, segment);
    match container {
        Value::Object(map) => map.entry(segment.to_owned()).or_insert(Value::Null),
        Value::Array(items) => {
            let index = segment.parse::<usize>().unwrap_or(0);
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        other => other,
    }
}

/// Replace `container` with a fresh array or mapping when it cannot hold the
/// given segment.
fn coerce_container(container: &mut Value, segment: &str) {
    let numeric = segment.parse::<usize>().is_ok();
    let compatible = match container {
        Value::Object(_) => true,
        Value::Array(_) => numeric,
        _ => false,
    };
    if !compatible {
        *container = if numeric {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }
}

/// Remove the value at `path`. Returns whether anything was removed.
pub fn unset_key_path(path: &str, data: &mut Value) -> bool {
    match path.split_once('.') {
        None => match data {
            Value::Object(map) => map.shift_remove(path).is_some(),
            Value::Array(items) => match path.parse::<usize>() {
                Ok(index) if index < items.len() => {
                    items.remove(index);
                    true
                }
                _ => false,
            },
            _ => false,
        },
        Some((head, rest)) => {
            let child = match data {
                Value::Object(map) => map.get_mut(head),
                Value::Array(items) => head
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get_mut(index)),
                _ => None,
            };
            child.map_or(false, |c| unset_key_path(rest, c))
        }
    }
}

// ── Flatten / unflatten ───────────────────────────────────────────────────

/// Expand a flat map of dotted paths into a nested tree. Keys sharing a
/// prefix merge into the same branch; plain keys pass through.
pub fn unflatten(flat: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Value::Object(Map::new());
    for (path, value) in flat {
        set_value_for_key_path(value.clone(), path, &mut out);
    }
    match out {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Unflatten only when some key actually contains a separator; otherwise
/// borrow the input unchanged.
pub fn conditional_unflatten(setter: &Map<String, Value>) -> Cow<'_, Map<String, Value>> {
    if setter.keys().any(|k| k.contains('.')) {
        Cow::Owned(unflatten(setter))
    } else {
        Cow::Borrowed(setter)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
