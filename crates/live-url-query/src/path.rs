//! Dotted property paths into a model value (`address.city`, `items.0`).

use serde_json::{Map, Value};

use crate::decode::MAX_DEPTH;

/// Split a dotted property path into its components.
pub fn split_property_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split('.').collect()
}

/// Get a value from a model by dotted path.
///
/// Numeric components index into lists. Returns `None` if any component is
/// missing.
///
/// # Example
///
/// ```
/// use live_url_query::path::get_path;
/// use serde_json::json;
///
/// let model = json!({"address": {"city": "Lyon"}, "tags": ["a", "b"]});
/// assert_eq!(get_path(&model, "address.city"), Some(&json!("Lyon")));
/// assert_eq!(get_path(&model, "tags.1"), Some(&json!("b")));
/// assert_eq!(get_path(&model, "address.zip"), None);
/// ```
pub fn get_path<'a>(model: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = model;
    for step in split_property_path(path) {
        current = match current {
            Value::Object(map) => map.get(step)?,
            Value::Array(items) => items.get(step.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Whether the dotted path resolves, even to an explicit `null`.
pub fn has_path(model: &Value, path: &str) -> bool {
    get_path(model, path).is_some()
}

/// Write `value` at a dotted path, creating mappings along the way.
///
/// Intermediate scalars are replaced by mappings. A numeric component
/// addresses an existing list position, or appends when it equals the
/// list length; any other component on a list is ignored.
pub fn set_path(model: &mut Value, path: &str, value: Value) {
    let steps = split_property_path(path);
    let Some((last, parents)) = steps.split_last() else {
        *model = value;
        return;
    };
    let mut current = model;
    for step in parents {
        if !current.is_object() && !current.is_array() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(step.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => match list_slot(items, step) {
                Some(slot) => slot,
                None => return,
            },
            _ => return,
        };
    }
    if !current.is_object() && !current.is_array() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
        }
        Value::Array(items) => {
            if let Some(slot) = list_slot(items, last) {
                *slot = value;
            }
        }
        _ => {}
    }
}

fn list_slot<'a>(items: &'a mut Vec<Value>, step: &str) -> Option<&'a mut Value> {
    let idx = step.parse::<usize>().ok()?;
    if idx == items.len() {
        items.push(Value::Null);
    }
    items.get_mut(idx)
}

/// Expand a value into the `(path, value)` pairs of its leaves.
///
/// Mappings are walked member by member and joined with dots onto `base`;
/// lists and scalars are leaves, as is an empty mapping. The order follows
/// the mapping's own order. A mapping [`MAX_DEPTH`] levels below `value` is
/// returned whole as a leaf.
///
/// # Example
///
/// ```
/// use live_url_query::path::leaf_paths;
/// use serde_json::json;
///
/// let leaves = leaf_paths("prop", &json!({"foo": "a", "bar": {"baz": [1]}}));
/// assert_eq!(
///     leaves,
///     vec![
///         ("prop.foo".to_string(), json!("a")),
///         ("prop.bar.baz".to_string(), json!([1])),
///     ]
/// );
/// ```
pub fn leaf_paths(base: &str, value: &Value) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    collect_leaves(base.to_string(), value, 0, &mut out);
    out
}

fn collect_leaves(path: String, value: &Value, depth: usize, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() && depth < MAX_DEPTH => {
            for (member, item) in map {
                let child = if path.is_empty() {
                    member.clone()
                } else {
                    format!("{path}.{member}")
                };
                collect_leaves(child, item, depth + 1, out);
            }
        }
        leaf => out.push((path, leaf.clone())),
    }
}
