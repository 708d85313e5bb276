//! Diffing plain values into `$set`/`$unset` modifiers and replaying them.
//!
//! A [`Modifier`] is the flat-path patch shape: `$set` maps dotted leaf
//! paths to their new values, `$unset` marks paths to delete. The `$set`
//! portion stays replayable through the merge engine's assignment operator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keypath::{
    flat_object, set_value_for_key_path, unset_key_path, value_for_key_path, FlatObjectOptions,
};

// ── Modifier ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(rename = "$set", default, skip_serializing_if = "Map::is_empty")]
    pub set: Map<String, Value>,
    #[serde(rename = "$unset", default, skip_serializing_if = "Map::is_empty")]
    pub unset: Map<String, Value>,
}

impl Modifier {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }
}

// ── Diffing ───────────────────────────────────────────────────────────────

/// `$set` entries only: every flat leaf path of `to` whose value differs
/// from `from` at the same path.
pub fn forward_diff_to_modifier(from: &Value, to: &Value) -> Modifier {
    let mut modifier = Modifier::default();
    for (path, value) in flat_object(to, FlatObjectOptions::default()) {
        if value_for_key_path(&path, from) != Some(&value) {
            modifier.set.insert(path, value);
        }
    }
    modifier
}

/// Forward diff plus `$unset: true` for every flat leaf path of `from` that
/// has no value in `to`. Paths shadowed by a `$set` ancestor are skipped —
/// the write already replaces the whole branch.
pub fn diff_to_modifier(from: &Value, to: &Value) -> Modifier {
    let mut modifier = forward_diff_to_modifier(from, to);
    for path in flat_object(from, FlatObjectOptions::default()).keys() {
        if value_for_key_path(path, to).is_none() && !has_set_ancestor(&modifier.set, path) {
            modifier.unset.insert(path.clone(), Value::Bool(true));
        }
    }
    modifier
}

fn has_set_ancestor(set: &Map<String, Value>, path: &str) -> bool {
    set.keys().any(|s| {
        path == s || (path.len() > s.len() && path.starts_with(s) && path.as_bytes()[s.len()] == b'.')
    })
}

// ── Applying ──────────────────────────────────────────────────────────────

/// Replay a modifier onto `target`: `$set` paths are written, then `$unset`
/// paths removed.
pub fn apply(target: &mut Value, modifier: &Modifier) {
    for (path, value) in &modifier.set {
        set_value_for_key_path(value.clone(), path, target);
    }
    for path in modifier.unset.keys() {
        unset_key_path(path, target);
    }
}

/// Materialize a modifier as a fresh tree: `$set` paths are written into an
/// empty mapping, `$unset` entries simply stay absent.
pub fn modifier_to_obj(modifier: &Modifier) -> Value {
    let mut obj = Value::Object(Map::new());
    for (path, value) in &modifier.set {
        set_value_for_key_path(value.clone(), path, &mut obj);
    }
    obj
}

// ── Tests ─────────────────────────────────────────────────────────────────
