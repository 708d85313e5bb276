//! In-place set algebra over JSON arrays.
//!
//! These are the primitives behind the merge engine's array operators. All
//! of them mutate their first argument; membership is deep value equality,
//! never identity.

use serde_json::Value;

use crate::check::truthy_or_number;

// ── Membership ────────────────────────────────────────────────────────────

/// Deep-equality membership test.
pub fn contains(set: &[Value], item: &Value) -> bool {
    set.iter().any(|v| v == item)
}

/// Coerce a value into an array: arrays pass through as their elements,
/// everything else becomes a singleton.
pub fn arrayify(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

// ── Mutating set operations ───────────────────────────────────────────────

/// Replace the contents of `target` wholesale.
pub fn assign(target: &mut Vec<Value>, incoming: &[Value]) {
    target.clear();
    target.extend_from_slice(incoming);
}

/// Append every incoming element, keeping duplicates.
pub fn concat(target: &mut Vec<Value>, incoming: &[Value]) {
    target.extend_from_slice(incoming);
}

/// Remove every element that also appears in `incoming`.
pub fn subtract(target: &mut Vec<Value>, incoming: &[Value]) {
    target.retain(|v| !contains(incoming, v));
}

/// Symmetric difference by presence: elements of `target` absent from
/// `incoming`, followed by elements of `incoming` absent from the original
/// `target`. Duplicates within either side are kept.
pub fn difference(target: &mut Vec<Value>, incoming: &[Value]) {
    let original = target.clone();
    target.retain(|v| !contains(incoming, v));
    for item in incoming {
        if !contains(&original, item) {
            target.push(item.clone());
        }
    }
}

/// Keep only elements that also appear in `incoming`.
pub fn intersect(target: &mut Vec<Value>, incoming: &[Value]) {
    target.retain(|v| contains(incoming, v));
}

/// Append incoming elements not already present.
pub fn union(target: &mut Vec<Value>, incoming: &[Value]) {
    for item in incoming {
        if !contains(target, item) {
            target.push(item.clone());
        }
    }
}

/// Deduplicated symmetric difference: every element that appears in exactly
/// one of the two arrays, each at most once.
pub fn xor(target: &mut Vec<Value>, incoming: &[Value]) {
    let mut out: Vec<Value> = Vec::new();
    for item in target.iter() {
        if !contains(incoming, item) && !contains(&out, item) {
            out.push(item.clone());
        }
    }
    for item in incoming {
        if !contains(target, item) && !contains(&out, item) {
            out.push(item.clone());
        }
    }
    *target = out;
}

/// Pairwise filter: for each index, `choose` picks between the existing and
/// incoming element (missing incoming slots read as null) and the chosen
/// value is kept when truthy or a number.
pub fn compare_and_filter<F>(target: &mut Vec<Value>, incoming: &[Value], choose: F)
where
    F: Fn(&Value, &Value) -> Value,
{
    let mut out = Vec::with_capacity(target.len());
    for (i, existing) in target.iter().enumerate() {
        let other = incoming.get(i).unwrap_or(&Value::Null);
        let chosen = choose(existing, other);
        if truthy_or_number(&chosen) {
            out.push(chosen);
        }
    }
    *target = out;
}

// ── Tests ─────────────────────────────────────────────────────────────────
