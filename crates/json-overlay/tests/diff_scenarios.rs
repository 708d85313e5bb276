//! Diff/apply round-trips over deeply nested fixtures.

use json_overlay::{apply, diff_to_modifier, forward_diff_to_modifier};
use serde_json::{json, Value};

fn mess_a() -> Value {
    json!({
        "string": "alpha",
        "nestedA": {
            "array": [
                1, 2, 3,
                {"nO1": "v1", "nA": [0, 1, 2]},
                [3, 2, 1]
            ],
            "nestedB": {
                "string": "beta",
                "array": [
                    3, 2,
                    {"nO1": "v2", "nA": [0, 2]},
                    {"anotherKey": true},
                    [1, 2, [1, {"two": 2}]]
                ]
            }
        }
    })
}

fn mess_b() -> Value {
    json!({
        "nestedA": {
            "array": [
                3, 2,
                {"nO1": "v2", "nA": [0, 2]},
                {"anotherKey": true},
                [1, 2, [1, {"two": 2}]]
            ],
            "nestedB": {
                "array": [
                    1, 2, 3,
                    {"nO1": "v1", "nA": [0, 1, 2]},
                    [3, 2, 1]
                ],
                "string": "it's a delta"
            }
        }
    })
}

#[test]
fn complex_diff_applies_back() {
    let mut target = mess_a();
    let modifier = diff_to_modifier(&target, &mess_b());
    apply(&mut target, &modifier);
    assert_eq!(target, mess_b());
}

#[test]
fn diff_does_not_mutate_its_inputs() {
    let a = mess_a();
    let b = mess_b();
    diff_to_modifier(&a, &b);
    assert_eq!(a, mess_a());
    assert_eq!(b, mess_b());
}

#[test]
fn complex_diff_unsets_removed_branches() {
    let modifier = diff_to_modifier(&mess_a(), &mess_b());
    assert_eq!(modifier.unset.get("string"), Some(&json!(true)));
    // arrays are opaque leaves: the nested arrays land in $set wholesale
    assert!(modifier.set.contains_key("nestedA.array"));
    assert!(modifier.set.contains_key("nestedA.nestedB.array"));
    assert!(modifier.set.contains_key("nestedA.nestedB.string"));
}

#[test]
fn forward_diff_of_disjoint_objects_sets_everything() {
    let modifier = forward_diff_to_modifier(&json!({}), &mess_b());
    let mut rebuilt = json!({});
    apply(&mut rebuilt, &modifier);
    assert_eq!(rebuilt, mess_b());
}

#[test]
fn self_diff_is_empty() {
    let modifier = diff_to_modifier(&mess_a(), &mess_a());
    assert!(modifier.is_empty());
}
