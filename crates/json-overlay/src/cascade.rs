//! Keyword-selected overlay flattening.
//!
//! Configuration trees may nest overlay branches under *selector keys* —
//! mapping keys built entirely out of known keywords, like `"mac, ios"` or
//! `"win x64"`. Cascading resolves such a tree against the active selectors:
//! matching branches are flattened into their parent through the merge
//! engine, non-matching branches disappear, and plain data keys pass
//! through. Selector strings are comma-separated alternatives of
//! space-separated AND-terms.
//!
//! Among the branches matching at one level only the most specific apply
//! (specificity = matched term count), in declaration order, so `"mac x64"`
//! beats a plain `"mac"` and later branches override earlier ones.

use serde_json::{Map, Value};

use crate::merge::{merge, MergeError};

// ── Selector matching ─────────────────────────────────────────────────────

/// True when some comma-separated alternative of `selector` has all of its
/// space-separated terms among `active`.
pub fn select<S: AsRef<str>>(active: &[S], selector: &str) -> bool {
    match_specificity(active, selector).is_some()
}

/// The best match among the alternatives: the highest AND-term count of any
/// fully matched alternative.
fn match_specificity<S: AsRef<str>>(active: &[S], selector: &str) -> Option<usize> {
    let mut best = None;
    for alternative in selector.split(',') {
        let terms: Vec<&str> = alternative.split_whitespace().collect();
        if terms.is_empty() {
            continue;
        }
        if terms
            .iter()
            .all(|t| active.iter().any(|a| a.as_ref() == *t))
        {
            best = Some(terms.len().max(best.unwrap_or(0)));
        }
    }
    best
}

/// A key counts as a selector only when every token is a known keyword;
/// anything else is ordinary data.
fn is_selector_key<S: AsRef<str>>(keywords: &[S], key: &str) -> bool {
    let mut tokens = key.split(',').flat_map(str::split_whitespace).peekable();
    if tokens.peek().is_none() {
        return false;
    }
    tokens.all(|t| keywords.iter().any(|k| k.as_ref() == t))
}

// ── Cascading ─────────────────────────────────────────────────────────────

/// Resolve every selector branch in the tree, recursing through plain data
/// values as well. The input is never mutated.
pub fn cascade<S: AsRef<str>>(
    tree: &Value,
    keywords: &[S],
    selectors: &[S],
) -> Result<Value, MergeError> {
    cascade_inner(tree, keywords, selectors, true)
}

/// Like [`cascade`], but only selector branches are recursed; values under
/// plain data keys are copied untouched.
pub fn cascade_shallow<S: AsRef<str>>(
    tree: &Value,
    keywords: &[S],
    selectors: &[S],
) -> Result<Value, MergeError> {
    cascade_inner(tree, keywords, selectors, false)
}

fn cascade_inner<S: AsRef<str>>(
    tree: &Value,
    keywords: &[S],
    selectors: &[S],
    deep: bool,
) -> Result<Value, MergeError> {
    let Value::Object(map) = tree else {
        return Ok(tree.clone());
    };

    let mut base = Map::new();
    let mut matched: Vec<(&Value, usize)> = Vec::new();
    for (key, value) in map {
        if is_selector_key(keywords, key) {
            if let Some(specificity) = match_specificity(selectors, key) {
                matched.push((value, specificity));
            }
        } else {
            let resolved = if deep {
                cascade_inner(value, keywords, selectors, deep)?
            } else {
                value.clone()
            };
            // a branch stripped down to nothing disappears with its key
            let emptied = resolved.as_object().is_some_and(Map::is_empty)
                && value.as_object().is_some_and(|m| !m.is_empty());
            if !emptied {
                base.insert(key.clone(), resolved);
            }
        }
    }

    let mut result = Value::Object(base);
    if let Some(max) = matched.iter().map(|(_, s)| *s).max() {
        for (value, specificity) in matched {
            if specificity == max {
                let branch = cascade_inner(value, keywords, selectors, deep)?;
                merge(&mut result, &branch)?;
            }
        }
    }
    Ok(result)
}

// ── Tests ─────────────────────────────────────────────────────────────────
