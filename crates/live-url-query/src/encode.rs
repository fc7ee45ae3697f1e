//! Nested value → flat bracketed pairs.

use live_url_util::as_query_text;
use serde_json::{Map, Value};
use tracing::trace;

use crate::decode::MAX_DEPTH;
use crate::percent::{encode_key, encode_value, escape_segment};
use crate::types::{ListStyle, PathStep, QueryPair};
use crate::util::push_step;

/// Flatten `value` under the root key `base_key`.
///
/// Scalars emit one pair. Lists and mappings recurse with `[i]` (or `[]`,
/// per `style`) and `[k]` suffixes, in traversal order. A `null` root emits
/// `(base_key, "")` so an explicitly empty field stays distinguishable from
/// an absent one; nested `null`s emit nothing. Empty lists and mappings
/// emit nothing at any depth.
///
/// Keys are structural (see [`crate::percent`]): brackets, `%` and
/// position-like digits inside names are escaped. Members with an empty
/// name and anything nested deeper than [`MAX_DEPTH`] cannot be addressed
/// and are skipped.
///
/// # Example
///
/// ```
/// use live_url_query::{encode, ListStyle};
/// use serde_json::json;
///
/// let pairs = encode(&json!({"foo": 1, "bar": [true, null]}), "p", ListStyle::Indexed);
/// assert_eq!(
///     pairs,
///     vec![
///         ("p[foo]".to_string(), "1".to_string()),
///         ("p[bar][0]".to_string(), "true".to_string()),
///     ]
/// );
/// ```
pub fn encode(value: &Value, base_key: &str, style: ListStyle) -> Vec<QueryPair> {
    let mut out = Vec::new();
    encode_into(value, escape_segment(base_key), 0, style, &mut out);
    out
}

fn encode_into(value: &Value, key: String, depth: usize, style: ListStyle, out: &mut Vec<QueryPair>) {
    let nested = matches!(value, Value::Array(items) if !items.is_empty())
        || matches!(value, Value::Object(map) if !map.is_empty());
    if nested && depth >= MAX_DEPTH {
        trace!(target: "live_url_query::encode", key = key.as_str(), "skipping members nested too deep");
        return;
    }
    match value {
        Value::Null => {
            if depth == 0 {
                out.push((key, String::new()));
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                let step = match style {
                    ListStyle::Indexed => PathStep::Index(idx),
                    ListStyle::Repeated => PathStep::Append,
                };
                encode_into(item, child_key(&key, &step), depth + 1, style, out);
            }
        }
        Value::Object(map) => {
            for (member, item) in map {
                if member.is_empty() {
                    trace!(target: "live_url_query::encode", key = key.as_str(), "skipping member with an empty name");
                    continue;
                }
                let step = PathStep::Key(member.clone());
                encode_into(item, child_key(&key, &step), depth + 1, style, out);
            }
        }
        scalar => {
            if let Some(text) = as_query_text(scalar) {
                out.push((key, text));
            }
        }
    }
}

fn child_key(key: &str, step: &PathStep) -> String {
    let mut child = key.to_string();
    push_step(&mut child, step);
    child
}

/// Flatten every root of a decoded tree, in the tree's order.
pub fn encode_tree(tree: &Map<String, Value>, style: ListStyle) -> Vec<QueryPair> {
    let mut out = Vec::new();
    for (name, value) in tree {
        encode_into(value, escape_segment(name), 0, style, &mut out);
    }
    out
}

/// Serialize pairs as query text (no leading `?`).
pub fn to_query_string(pairs: &[QueryPair]) -> String {
    let mut out = String::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(&encode_key(key));
        out.push('=');
        out.push_str(&encode_value(value));
    }
    out
}
