//! Ordered-key maps with declared dependencies.
//!
//! An ordered-key map is a plain mapping whose entries may be wrapped as
//! `{ "require": <other key>, "value": <payload> }` to declare that the
//! entry must be processed after another key of the same map. Enumeration
//! honors declaration order when no entry declares a dependency and
//! topological order otherwise; a `require` cycle is a fatal configuration
//! error surfaced by the graph crate.
//!
//! A value counts as wrapped iff it is a mapping with exactly the two keys
//! `require` and `value` — a genuine payload of that exact shape is
//! indistinguishable from a wrapper, so callers must avoid it for ordinary
//! entries.

use depgraph::{DepGraph, GraphError};
use serde_json::{Map, Value};
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OlhmError {
    #[error("expected a keyed mapping")]
    Shape,
    #[error(transparent)]
    Graph(#[from] GraphError),
}

// ── Wrapped values ────────────────────────────────────────────────────────

/// True when `value` has the `{require, value}` wrapper shape.
pub fn is_olhv(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.len() == 2 && map.contains_key("require") && map.contains_key("value")
        }
        _ => false,
    }
}

/// Unwrap a wrapped entry; bare values pass through.
pub fn olhv_value(value: &Value) -> &Value {
    if is_olhv(value) {
        &value["value"]
    } else {
        value
    }
}

fn require_of(value: &Value) -> Option<String> {
    if !is_olhv(value) {
        return None;
    }
    let require = &value["require"];
    match require {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ── Ordering ──────────────────────────────────────────────────────────────

fn as_map(olhm: &Value) -> Result<Option<&Map<String, Value>>, OlhmError> {
    match olhm {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(OlhmError::Shape),
    }
}

/// Keys of the map in processing order: declaration order with no declared
/// dependencies, topological order otherwise.
fn ordered_keys(map: &Map<String, Value>) -> Result<Vec<String>, OlhmError> {
    // single entry needs no graph
    if map.len() < 2 {
        return Ok(map.keys().cloned().collect());
    }
    let mut graph = DepGraph::new();
    for key in map.keys() {
        graph.add_node(key.clone());
    }
    for (key, value) in map {
        if let Some(require) = require_of(value) {
            graph.add_dependency(key, &require)?;
        }
    }
    Ok(graph.overall_order()?)
}

/// The ordered sequence of unwrapped values. A null map reads as empty.
pub fn safe(olhm: &Value) -> Result<Vec<Value>, OlhmError> {
    let Some(map) = as_map(olhm)? else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(map.len());
    for key in ordered_keys(map)? {
        if let Some(entry) = map.get(&key) {
            out.push(olhv_value(entry).clone());
        }
    }
    Ok(out)
}

/// Transform each unwrapped value in processing order. The callback receives
/// `(value, key)`.
pub fn map<T, F>(olhm: &Value, mut f: F) -> Result<Vec<T>, OlhmError>
where
    F: FnMut(&Value, &str) -> T,
{
    let Some(map) = as_map(olhm)? else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(map.len());
    for key in ordered_keys(map)? {
        if let Some(entry) = map.get(&key) {
            out.push(f(olhv_value(entry), &key));
        }
    }
    Ok(out)
}

/// Transform values while keeping the ordered-key-map shape. A wrapped input
/// entry keeps its `require` unless the transform itself returns a wrapped
/// entry; enumeration follows the map's own declaration order.
pub fn okmap<F>(olhm: &Value, mut f: F) -> Result<Map<String, Value>, OlhmError>
where
    F: FnMut(&Value, &str) -> Value,
{
    let Some(map) = as_map(olhm)? else {
        return Ok(Map::new());
    };
    let mut out = Map::new();
    for (key, entry) in map {
        if is_olhv(entry) {
            let transformed = f(&entry["value"], key);
            if is_olhv(&transformed) {
                out.insert(key.clone(), transformed);
            } else {
                let mut wrapped = Map::new();
                wrapped.insert("value".to_owned(), transformed);
                wrapped.insert("require".to_owned(), entry["require"].clone());
                out.insert(key.clone(), Value::Object(wrapped));
            }
        } else {
            out.insert(key.clone(), f(entry, key));
        }
    }
    Ok(out)
}

/// Left fold over the [`safe`] order. The callback receives
/// `(accumulator, value, index)`.
pub fn reduce<T, F>(olhm: &Value, mut f: F, initial: T) -> Result<T, OlhmError>
where
    F: FnMut(T, &Value, usize) -> T,
{
    let mut acc = initial;
    for (index, value) in safe(olhm)?.iter().enumerate() {
        acc = f(acc, value, index);
    }
    Ok(acc)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrapper_detection_needs_exactly_two_keys() {
        assert!(is_olhv(&json!({"require": "a", "value": 1})));
        assert!(!is_olhv(&json!({"value": 1})));
        assert!(!is_olhv(&json!({"require": "a", "value": 1, "extra": 2})));
        assert!(!is_olhv(&json!("plain")));
    }

    #[test]
    fn safe_unwraps_in_declaration_order() {
        let olhm = json!({"a": 1, "b": {"require": "a", "value": 2}, "c": 3});
        assert_eq!(safe(&olhm).unwrap(), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn safe_reorders_for_dependencies() {
        let olhm = json!({
            "y": {"require": "x", "value": 2},
            "x": 1
        });
        assert_eq!(safe(&olhm).unwrap(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn safe_of_null_is_empty() {
        assert_eq!(safe(&json!(null)).unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn safe_rejects_non_mappings() {
        assert_eq!(safe(&json!([1, 2])).unwrap_err(), OlhmError::Shape);
    }

    #[test]
    fn single_entry_skips_the_graph() {
        // the lone `require` would be a missing node if a graph were built
        let olhm = json!({"only": {"require": "ghost", "value": 9}});
        assert_eq!(safe(&olhm).unwrap(), vec![json!(9)]);
    }

    #[test]
    fn require_cycle_is_fatal() {
        let olhm = json!({
            "x": {"require": "y", "value": 1},
            "y": {"require": "x", "value": 2}
        });
        assert!(matches!(
            safe(&olhm).unwrap_err(),
            OlhmError::Graph(GraphError::Cycle(_))
        ));
    }

    #[test]
    fn unknown_require_is_fatal() {
        let olhm = json!({
            "a": {"require": "ghost", "value": 1},
            "b": 2
        });
        assert_eq!(
            safe(&olhm).unwrap_err(),
            OlhmError::Graph(GraphError::MissingNode("ghost".to_string()))
        );
    }

    #[test]
    fn map_sees_keys_in_order() {
        let olhm = json!({
            "y": {"require": "x", "value": 20},
            "x": 10
        });
        let keys = map(&olhm, |_, k| k.to_owned()).unwrap();
        assert_eq!(keys, vec!["x", "y"]);
    }

    #[test]
    fn okmap_preserves_require() {
        let olhm = json!({
            "a": 1,
            "b": {"require": "a", "value": 2}
        });
        let out = okmap(&olhm, |v, _| json!(v.as_i64().unwrap() * 10)).unwrap();
        assert_eq!(
            Value::Object(out),
            json!({"a": 10, "b": {"value": 20, "require": "a"}})
        );
    }

    #[test]
    fn okmap_accepts_rewrapped_entries() {
        let olhm = json!({"a": 1, "b": {"require": "a", "value": 2}});
        let out = okmap(&olhm, |v, _| json!({"require": "a", "value": v.clone()})).unwrap();
        assert_eq!(out["b"], json!({"require": "a", "value": 2}));
    }

    #[test]
    fn reduce_folds_safe_order() {
        let olhm = json!({
            "b": {"require": "a", "value": 2},
            "a": 1,
            "c": {"require": "b", "value": 3}
        });
        let folded = reduce(
            &olhm,
            |mut acc: Vec<i64>, v, _| {
                acc.push(v.as_i64().unwrap_or(0));
                acc
            },
            Vec::new(),
        )
        .unwrap();
        assert_eq!(folded, vec![1, 2, 3]);
    }
}
