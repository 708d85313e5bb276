//! Shallow mapping helpers.

use serde_json::{Map, Value};

/// Shallow-assign every entry of `source` onto `target`, later writes
/// winning. Values are copied wholesale, never merged.
pub fn extend(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

/// [`extend`] over several sources in order.
pub fn extend_n<'a, I>(target: &mut Map<String, Value>, sources: I)
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    for source in sources {
        extend(target, source);
    }
}

/// Non-mutating shallow union of two mappings.
pub fn combine(a: &Map<String, Value>, b: &Map<String, Value>) -> Map<String, Value> {
    let mut out = a.clone();
    extend(&mut out, b);
    out
}

/// Non-mutating shallow union over several mappings in order.
pub fn combine_n<'a, I>(sources: I) -> Map<String, Value>
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    let mut out = Map::new();
    extend_n(&mut out, sources);
    out
}

/// Recursively remove mapping branches that are (or become) empty.
pub fn prune(data: &mut Value) {
    if let Value::Object(map) = data {
        for (_, value) in map.iter_mut() {
            prune(value);
        }
        map.retain(|_, value| !value.as_object().is_some_and(Map::is_empty));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
