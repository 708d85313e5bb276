//! json-overlay — declarative merging, diffing, and selective composition of
//! JSON-shaped data.
//!
//! Layered configuration is resolved by embedding *merge directives*
//! (single-character operator tags) inside the data itself; the
//! [`merge`] engine interprets them recursively. Around the engine sit the
//! [`cascade`] selector layer (keyword-matched overlay flattening), the
//! [`diff`] modifier layer (`$set`/`$unset` patches), the [`olhm`]
//! ordered-key map (declaration order unless entries declare dependencies),
//! and the generic helpers they share ([`arrays`], [`keypath`],
//! [`containers`], [`check`]).
//!
//! ```
//! use serde_json::json;
//!
//! let mut config = json!({"sources": ["main.c"], "defines": {"DEBUG": 1}});
//! json_overlay::merge(
//!     &mut config,
//!     &json!({"sources": ["mac.c"], "defines": {"TARGET": "mac"}}),
//! )
//! .unwrap();
//! assert_eq!(config["sources"], json!(["main.c", "mac.c"]));
//! assert_eq!(config["defines"]["TARGET"], json!("mac"));
//! ```

pub mod arrays;
pub mod cascade;
pub mod check;
pub mod containers;
pub mod diff;
pub mod keypath;
pub mod merge;
pub mod olhm;

pub use cascade::{cascade, cascade_shallow, select};
pub use check::{json_type, truthy, truthy_or_number, JsonType};
pub use diff::{apply, diff_to_modifier, forward_diff_to_modifier, modifier_to_obj, Modifier};
pub use keypath::{
    all_key_paths, conditional_unflatten, flat_object, set_value_for_key_path, unflatten,
    unset_key_path, value_for_key_path, FlatObjectOptions,
};
pub use merge::{
    construct, is_constructor, is_directive_key, merge, merge_n, merge_with, resolve,
    resolve_with, MergeError, MergeState, Operator,
};
pub use olhm::OlhmError;

// The graph backing `olhm` is useful on its own.
pub use depgraph::{DepGraph, GraphError};
