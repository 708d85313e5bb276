//! Cascade scenario matrix: keyword universes, selector sets, and the trees
//! they flatten to.

use json_overlay::{cascade, cascade_shallow, select};
use serde_json::{json, Value};

const KEYWORDS: [&str; 11] = [
    "win", "mac", "linux", "ios", "android", "x64", "x86", "simulator", "clang", "gcc", "clion",
];

fn accel_tree() -> Value {
    json!({
        "useAccel": 0,
        "win, linux": {
            "useAccel": 1,
            "x86": {"useAccel": 2},
            "x64": {"useAccel": 3}
        },
        "mac, ios": {
            "useAccel": 4,
            "x86": {"useAccel": 5},
            "x64": {"useAccel": 6}
        }
    })
}

fn build_tree() -> Value {
    json!({
        "mac, ios": {"flag": true},
        "other": "setting",
        "build": {
            "with": "error A",
            "mac, ios": {"sources": ["apple.c"]},
            "mac": {"with": "cmake"}
        },
        "x64": {
            "build": {
                "with": "error C",
                "mac": {
                    "with": "ninja",
                    "clion": {"with": "cmake"}
                }
            }
        },
        "win": {
            "build": {
                "with": {"x64": "clang", "x86": "gcc"}
            }
        }
    })
}

#[test]
fn select_or_and_matrix() {
    assert!(select(&["apple"], "apple"));
    assert!(select(&["ios", "mac", "win"], "x86, mac, win"));
    assert!(select(&["apple", "bananna"], "apple bananna"));
    assert!(!select(&["apple", "bananna"], "x86"));
    assert!(!select(&["apple"], "apple bananna"));
    assert!(!select(&["bananna"], "apple, bananna orange"));
}

#[test]
fn shallow_accel_selection() {
    let cases: [(&[&str], Value); 3] = [
        (&["mac", "x64"], json!({"useAccel": 6})),
        (&["win"], json!({"useAccel": 1})),
        (&["win", "x64"], json!({"useAccel": 3})),
    ];
    for (selectors, expected) in cases {
        let result = cascade_shallow(&accel_tree(), &KEYWORDS, selectors).unwrap();
        assert_eq!(result, expected, "selectors {selectors:?}");
    }
}

#[test]
fn deep_build_selection() {
    let cases: [(&[&str], Value); 4] = [
        (
            &["mac", "x64"],
            json!({
                "flag": true,
                "other": "setting",
                "build": {"with": "ninja", "sources": ["apple.c"]}
            }),
        ),
        (
            &["mac", "x64", "clion"],
            json!({
                "flag": true,
                "other": "setting",
                "build": {"with": "cmake", "sources": ["apple.c"]}
            }),
        ),
        (
            &["win"],
            json!({"build": {"with": "error A"}, "other": "setting"}),
        ),
        (
            &["win", "x64"],
            json!({"build": {"with": "clang"}, "other": "setting"}),
        ),
    ];
    for (selectors, expected) in cases {
        let result = cascade(&build_tree(), &KEYWORDS, selectors).unwrap();
        assert_eq!(result, expected, "selectors {selectors:?}");
    }
}

#[test]
fn shallow_arch_selection() {
    let tree = json!({
        "clang": {
            "ios": {"arch": "arm64"},
            "arch": "x86"
        }
    });
    let result = cascade_shallow(&tree, &KEYWORDS, &["ios", "clang"]).unwrap();
    assert_eq!(result, json!({"arch": "arm64"}));
    let result = cascade_shallow(&tree, &KEYWORDS, &["linux", "gcc"]).unwrap();
    assert_eq!(result, json!({}));
}

#[test]
fn arrays_union_across_levels() {
    let conf = json!({
        "sources": ["main.c"],
        "mac": {"sources": ["mac.c"]}
    });
    let result = cascade(&conf, &["mac"], &["mac"]).unwrap();
    assert_eq!(result, json!({"sources": ["main.c", "mac.c"]}));
}

#[test]
fn more_specific_selector_replaces_less_specific() {
    let conf = json!({
        "build": {
            "with": "ninja",
            "sources": {
                "mac x64": ["main.c"],
                "mac": ["mac.c"]
            }
        },
        "x64": {
            "build": {
                "sources": {"mac": ["x64.c"]}
            }
        }
    });
    let result = cascade(&conf, &["mac", "x64"], &["mac", "x64"]).unwrap();
    assert_eq!(
        result,
        json!({"build": {"with": "ninja", "sources": ["main.c", "x64.c"]}})
    );
}
