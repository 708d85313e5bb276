//! The merge engine: a small operator algebra over JSON values.
//!
//! A *setter* is merged into a target under an active operator (`|` by
//! default). Setters may embed *directive keys* — two-character mapping keys
//! like `"<+"` — that switch the operator for their payload's subtree, and a
//! mapping built out of directive keys (a *constructor*) reduces to a single
//! value before being merged. Dispatch is driven by the runtime type of the
//! target: arrays get set algebra, mappings get per-key recursion, and
//! primitives are assigned.
//!
//! The engine mutates a mapping or array target in place and returns a fresh
//! value otherwise; callers must not rely on which of the two happens.
//! Setters are never mutated.

use serde_json::{Map, Value};

use crate::arrays;
use crate::check::{truthy, truthy_or_number, type_class};
use crate::keypath::conditional_unflatten;

mod types;
pub use types::{MergeError, MergeState, Operator};

// ── Entry points ──────────────────────────────────────────────────────────

/// Merge `setter` into `target` under the default `|` operator, leaving the
/// result in `target`. A computed result that is falsy and non-numeric is
/// discarded and `target` keeps its previous value.
pub fn merge(target: &mut Value, setter: &Value) -> Result<(), MergeError> {
    merge_with(target, setter, MergeState::default())
}

/// [`merge`] under an explicit state.
pub fn merge_with(
    target: &mut Value,
    setter: &Value,
    state: MergeState,
) -> Result<(), MergeError> {
    if let Some(result) = merge_or_assign(Some(&mut *target), setter, state)? {
        if truthy_or_number(&result) {
            *target = result;
        }
    }
    Ok(())
}

/// Merge each mapping setter into `target` in order, skipping anything that
/// is not a mapping.
pub fn merge_n<'a, I>(target: &mut Value, setters: I) -> Result<(), MergeError>
where
    I: IntoIterator<Item = &'a Value>,
{
    for setter in setters {
        if setter.is_object() {
            merge(target, setter)?;
        }
    }
    Ok(())
}

/// Resolve a setter against no existing value: constructors reduce, plain
/// mappings rebuild, arrays normalize their elements. Returns `None` when
/// the result is absent or would be discarded by the retention rule.
pub fn resolve(setter: &Value) -> Result<Option<Value>, MergeError> {
    resolve_with(setter, MergeState::default())
}

/// [`resolve`] under an explicit state.
pub fn resolve_with(setter: &Value, state: MergeState) -> Result<Option<Value>, MergeError> {
    Ok(merge_or_assign(None, setter, state)?.filter(truthy_or_number))
}

// ── Directive keys and constructors ───────────────────────────────────────

/// A directive key is exactly two characters: `<` followed by an operator
/// tag.
pub fn is_directive_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next() == Some('<') && chars.next().is_some() && chars.next().is_none()
}

/// Parse a key into its directive operator, if it is one. A directive-shaped
/// key with an unrecognized tag is fatal.
fn directive(key: &str) -> Result<Option<Operator>, MergeError> {
    let mut chars = key.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('<'), Some(tag), None) => Operator::from_tag(tag)
            .map(Some)
            .ok_or(MergeError::UnhandledOperator(tag)),
        _ => Ok(None),
    }
}

/// A mapping is a constructor when at least one key is directive-shaped.
pub fn is_constructor(map: &Map<String, Value>) -> bool {
    map.keys().any(|k| is_directive_key(k))
}

/// Reduce a constructor: fold its directive keys in declaration order into
/// an accumulator that starts absent, keeping each step's result only when
/// it is truthy or a number. Non-directive keys are ignored.
pub fn construct(
    constructor: &Map<String, Value>,
    state: MergeState,
) -> Result<Option<Value>, MergeError> {
    let mut data: Option<Value> = None;
    for (key, payload) in constructor {
        let Some(operator) = directive(key)? else {
            continue;
        };
        let next = state.with_operator(operator);
        if let Some(result) = merge_or_assign(data.as_mut(), payload, next)? {
            if truthy_or_number(&result) {
                data = Some(result);
            }
        }
    }
    Ok(data)
}

// ── Dispatch ──────────────────────────────────────────────────────────────

/// Core recursion. Mutates a mapping or array `lhs` in place and returns
/// `None`; otherwise returns the value to assign over `lhs`. `None` also
/// means "prune": callers skip the write entirely.
fn merge_or_assign(
    lhs: Option<&mut Value>,
    rhs: &Value,
    state: MergeState,
) -> Result<Option<Value>, MergeError> {
    match lhs {
        Some(Value::Array(items)) => {
            merge_lhs_array(items, rhs, state)?;
            Ok(None)
        }
        Some(data) if data.is_object() => {
            if let Value::Object(setter) = rhs {
                merge_lhs_object(data, setter, state)?;
                Ok(None)
            } else {
                Ok(scalar_over_mapping(data, rhs, state))
            }
        }
        // absent or primitive target
        lhs => match rhs {
            Value::Object(setter) => {
                if is_constructor(setter) {
                    match construct(setter, state)? {
                        Some(built) => merge_or_assign(lhs, &built, state),
                        None => Ok(None),
                    }
                } else {
                    guard_type_change(lhs.as_deref(), rhs, state)?;
                    // never adopt the setter by reference: rebuild it under
                    // assignment so nested directives resolve
                    let mut fresh = Value::Object(Map::new());
                    merge_or_assign(
                        Some(&mut fresh),
                        rhs,
                        state.with_operator(Operator::Assign),
                    )?;
                    Ok(Some(fresh))
                }
            }
            Value::Array(items) => {
                guard_type_change(lhs.as_deref(), rhs, state)?;
                let mut normalized = items.clone();
                normalize_elements(&mut normalized, state)?;
                Ok(Some(Value::Array(normalized)))
            }
            scalar => {
                guard_type_change(lhs.as_deref(), scalar, state)?;
                Ok(Some(scalar.clone()))
            }
        },
    }
}

/// Array targets: set algebra against a normalized incoming array, an
/// operator-switch chain when the setter is a mapping with directive keys,
/// or singleton coercion for anything else.
fn merge_lhs_array(
    lhs: &mut Vec<Value>,
    rhs: &Value,
    state: MergeState,
) -> Result<(), MergeError> {
    match rhs {
        Value::Object(setter) => {
            let setter = conditional_unflatten(setter);
            let mut chained = false;
            for (key, payload) in setter.iter() {
                if let Some(operator) = directive(key)? {
                    chained = true;
                    merge_lhs_array(lhs, payload, state.with_operator(operator))?;
                }
            }
            if chained {
                return Ok(());
            }
        }
        Value::Array(items) => {
            let mut incoming = items.clone();
            normalize_elements(&mut incoming, state)?;
            apply_set_operator(lhs, &incoming, state.operator);
            return Ok(());
        }
        _ => {}
    }
    // a bare scalar or a directive-free mapping coerces to a singleton —
    // except under assignment, which refuses to drop the array shape
    if state.operator == Operator::Assign {
        return Err(MergeError::TypeReplacement);
    }
    apply_set_operator(lhs, &arrays::arrayify(rhs), state.operator);
    Ok(())
}

fn apply_set_operator(lhs: &mut Vec<Value>, incoming: &[Value], operator: Operator) {
    match operator {
        Operator::Assign => arrays::assign(lhs, incoming),
        Operator::Concat => arrays::concat(lhs, incoming),
        Operator::Subtract => arrays::subtract(lhs, incoming),
        Operator::Difference => arrays::difference(lhs, incoming),
        Operator::Intersect => arrays::intersect(lhs, incoming),
        Operator::Union => arrays::union(lhs, incoming),
        Operator::Xor => arrays::xor(lhs, incoming),
        Operator::Filter => arrays::compare_and_filter(lhs, incoming, |existing, incoming| {
            if truthy(existing) {
                incoming.clone()
            } else {
                existing.clone()
            }
        }),
        Operator::Select => arrays::compare_and_filter(lhs, incoming, |existing, incoming| {
            if truthy(incoming) {
                existing.clone()
            } else {
                incoming.clone()
            }
        }),
    }
}

/// Mapping targets merged with a mapping setter: per-key recursion under the
/// active operator, with directive keys re-merging the whole mapping under
/// their own operator.
fn merge_lhs_object(
    data: &mut Value,
    setter: &Map<String, Value>,
    state: MergeState,
) -> Result<(), MergeError> {
    let setter = conditional_unflatten(setter);
    for (key, rhs) in setter.iter() {
        if let Some(operator) = directive(key)? {
            let assignment = merge_or_assign(Some(&mut *data), rhs, state.with_operator(operator))?;
            if let (Some(assignment), Value::Object(map)) = (assignment, &mut *data) {
                map.insert(key.clone(), assignment);
            }
        } else if let Value::Object(map) = &mut *data {
            match state.operator {
                Operator::Assign | Operator::Concat | Operator::Union | Operator::Xor => {
                    do_merge(map, key, rhs, state)?;
                }
                Operator::Difference => {
                    // first write wins
                    if !map.contains_key(key) {
                        do_merge(map, key, rhs, state)?;
                    }
                }
                Operator::Filter | Operator::Intersect | Operator::Select => {
                    // only touch keys that already hold something truthy
                    if map.get(key).is_some_and(truthy) {
                        do_merge(map, key, rhs, state)?;
                    }
                }
                Operator::Subtract => {
                    map.shift_remove(key);
                }
            }
            // retention pass: assignment keeps exactly the setter's keys,
            // the both-sides operators keep keys the setter confirms truthy
            match state.operator {
                Operator::Assign => {
                    map.retain(|k, _| setter.contains_key(k));
                }
                Operator::Intersect | Operator::Select => {
                    map.retain(|k, _| setter.get(k).is_some_and(truthy));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn do_merge(
    map: &mut Map<String, Value>,
    key: &str,
    rhs: &Value,
    state: MergeState,
) -> Result<(), MergeError> {
    let Some(assignment) = merge_or_assign(map.get_mut(key), rhs, state)? else {
        return Ok(());
    };
    // xor toggles: assigning a value the key already holds deletes it
    if state.operator == Operator::Xor && map.get(key) == Some(&assignment) {
        map.shift_remove(key);
    } else {
        map.insert(key.to_owned(), assignment);
    }
    Ok(())
}

/// A scalar setter over a mapping target. Under `-` (and `&`/`*` with a
/// non-null scalar) the truthy scalar names a key to delete; any other
/// operator assigns the scalar over the mapping.
fn scalar_over_mapping(data: &mut Value, rhs: &Value, state: MergeState) -> Option<Value> {
    match state.operator {
        Operator::Intersect | Operator::Select if rhs.is_null() => None,
        Operator::Intersect | Operator::Select | Operator::Subtract => {
            if truthy(rhs) {
                if let Value::Object(map) = data {
                    map.shift_remove(&scalar_key(rhs));
                }
            }
            None
        }
        _ => Some(rhs.clone()),
    }
}

fn scalar_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Self-merge every element against an absent target under assignment,
/// resolving embedded constructors and rebuilding nested mappings.
fn normalize_elements(items: &mut [Value], state: MergeState) -> Result<(), MergeError> {
    let state = state.with_operator(Operator::Assign);
    for item in items.iter_mut() {
        if let Some(resolved) = merge_or_assign(None, item, state)? {
            *item = resolved;
        }
    }
    Ok(())
}

fn guard_type_change(
    lhs: Option<&Value>,
    rhs: &Value,
    state: MergeState,
) -> Result<(), MergeError> {
    if !state.strict_types {
        return Ok(());
    }
    let Some(lhs) = lhs else {
        return Ok(());
    };
    let (from, to) = (type_class(lhs), type_class(rhs));
    if from != to {
        return Err(MergeError::ImplicitConversion {
            lhs: from,
            operator: state.operator.tag(),
            rhs: to,
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────
