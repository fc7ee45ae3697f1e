//! Flat bracketed pairs → nested value.

use serde_json::{Map, Value};
use tracing::trace;

use crate::percent::{decode_component, decode_key};
use crate::types::{PathStep, QueryPair};
use crate::util::parse_key;

/// Largest gap a positional key may open past the end of a list.
///
/// `items[5]=x` on an empty list pads with nulls; `items[500]=x` turns the
/// list into a mapping keyed `"500"` instead of allocating the gap.
pub const MAX_INDEX_GAP: usize = 20;

/// Deepest key, in bracket steps below the root, that is decoded or encoded.
///
/// Deeper keys are dropped, so no query text can make the tree walks recurse
/// without bound.
pub const MAX_DEPTH: usize = 128;

/// Split raw query text into pairs of structural key and decoded value.
///
/// A leading `?` is ignored, empty segments are skipped and a segment with
/// no `=` has an empty value. Keys are split on their literal brackets
/// before decoding (see [`decode_key`]). Pairs whose key or value is not
/// valid UTF-8 once percent-decoded are dropped.
pub fn parse_query(query: &str) -> Vec<QueryPair> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let (raw_key, raw_value) = segment.split_once('=').unwrap_or((segment, ""));
            match (decode_key(raw_key), decode_component(raw_value)) {
                (Some(key), Some(value)) => Some((key, value)),
                _ => {
                    trace!(target: "live_url_query::decode", segment, "dropping undecodable pair");
                    None
                }
            }
        })
        .collect()
}

/// Rebuild the nested tree described by flat pairs.
///
/// The result is always a mapping from root names to values, in first-seen
/// order. Root keys keep empty values; nested empty values are skipped.
/// Pairs with unaddressable keys (see [`parse_key`]) or more than
/// [`MAX_DEPTH`] steps are dropped. Later
/// pairs overwrite earlier ones at the same position, and pairs sharing a
/// root merge into one structure.
///
/// # Example
///
/// ```
/// use live_url_query::decode;
/// use serde_json::json;
///
/// let pairs = vec![
///     ("prop[foo]".to_string(), "a".to_string()),
///     ("prop[bar]".to_string(), "b".to_string()),
///     ("items[]".to_string(), "x".to_string()),
///     ("items[]".to_string(), "y".to_string()),
/// ];
/// assert_eq!(
///     decode(&pairs),
///     json!({"prop": {"foo": "a", "bar": "b"}, "items": ["x", "y"]})
/// );
/// ```
pub fn decode(pairs: &[QueryPair]) -> Value {
    let mut root = Map::new();
    for (key, value) in pairs {
        let Some((name, steps)) = parse_key(key) else {
            trace!(target: "live_url_query::decode", key = key.as_str(), "dropping malformed key");
            continue;
        };
        if steps.len() > MAX_DEPTH {
            trace!(target: "live_url_query::decode", root = name.as_str(), depth = steps.len(), "dropping key nested too deep");
            continue;
        }
        if steps.is_empty() {
            root.insert(name, Value::String(value.clone()));
            continue;
        }
        if value.is_empty() {
            continue;
        }
        let slot = root.entry(name).or_insert(Value::Null);
        insert_at(slot, &steps, value.clone());
    }
    Value::Object(root)
}

/// Parse and decode raw query text in one step.
pub fn decode_query(query: &str) -> Value {
    decode(&parse_query(query))
}

fn insert_at(slot: &mut Value, steps: &[PathStep], leaf: String) {
    let Some((step, rest)) = steps.split_first() else {
        *slot = Value::String(leaf);
        return;
    };
    if !accepts(slot, step) {
        *slot = reshape(std::mem::take(slot), step);
    }
    match slot {
        Value::Array(items) => {
            let idx = match step {
                PathStep::Index(idx) => *idx,
                _ => items.len(),
            };
            if idx >= items.len() {
                items.resize(idx + 1, Value::Null);
            }
            insert_at(&mut items[idx], rest, leaf);
        }
        Value::Object(map) => {
            let member = match step {
                PathStep::Key(key) => key.clone(),
                PathStep::Index(idx) => idx.to_string(),
                PathStep::Append => first_free_member(map),
            };
            insert_at(map.entry(member).or_insert(Value::Null), rest, leaf);
        }
        _ => {}
    }
}

/// The lowest numeric member name, counting up from the mapping's size,
/// that is not taken yet.
fn first_free_member(map: &Map<String, Value>) -> String {
    (map.len()..)
        .map(|n| n.to_string())
        .find(|name| !map.contains_key(name))
        .unwrap_or_default()
}

/// Whether `slot` can hold a child addressed by `step` as it is.
fn accepts(slot: &Value, step: &PathStep) -> bool {
    match (slot, step) {
        (Value::Object(_), _) => true,
        (Value::Array(_), PathStep::Append) => true,
        (Value::Array(items), PathStep::Index(idx)) => *idx <= items.len() + MAX_INDEX_GAP,
        _ => false,
    }
}

/// Build a container able to hold `step`, keeping what a list already held.
fn reshape(previous: Value, step: &PathStep) -> Value {
    match previous {
        Value::Array(items) => Value::Object(
            items
                .into_iter()
                .enumerate()
                .filter(|(_, item)| !item.is_null())
                .map(|(idx, item)| (idx.to_string(), item))
                .collect(),
        ),
        _ => match step {
            PathStep::Append => Value::Array(Vec::new()),
            PathStep::Index(idx) if *idx <= MAX_INDEX_GAP => Value::Array(Vec::new()),
            _ => Value::Object(Map::new()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(list: &[(&str, &str)]) -> Vec<QueryPair> {
        list.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_query() {
        assert_eq!(
            parse_query("?a=1&b=two+words&&c&d=%2C"),
            pairs(&[("a", "1"), ("b", "two words"), ("c", ""), ("d", ",")])
        );
        assert!(parse_query("").is_empty());
        assert!(parse_query("?").is_empty());
    }

    #[test]
    fn test_parse_query_decodes_keys() {
        assert_eq!(parse_query("p%5Bfoo%5D=1"), pairs(&[("p[foo]", "1")]));
    }

    #[test]
    fn test_parse_query_keeps_escaped_brackets_in_members() {
        assert_eq!(
            parse_query("p[a%5Db]=1&p[%30]=2"),
            pairs(&[("p[a%5Db]", "1"), ("p[%30]", "2")])
        );
        assert_eq!(
            decode_query("p[a%5Db]=1&p[%30]=2"),
            json!({"p": {"a]b": "1", "0": "2"}})
        );
    }

    #[test]
    fn test_parse_query_drops_invalid_utf8() {
        assert_eq!(parse_query("a=%FF&b=ok"), pairs(&[("b", "ok")]));
    }

    #[test]
    fn test_value_containing_equals() {
        assert_eq!(parse_query("expr=a%3Db=c"), pairs(&[("expr", "a=b=c")]));
    }

    #[test]
    fn test_decode_root_values() {
        assert_eq!(decode(&pairs(&[("a", "1"), ("b", "")])), json!({"a": "1", "b": ""}));
    }

    #[test]
    fn test_decode_indexed_list() {
        assert_eq!(
            decode(&pairs(&[("items[0]", "foo"), ("items[1]", "bar")])),
            json!({"items": ["foo", "bar"]})
        );
    }

    #[test]
    fn test_decode_out_of_order_indices() {
        assert_eq!(
            decode(&pairs(&[("items[1]", "bar"), ("items[0]", "foo")])),
            json!({"items": ["foo", "bar"]})
        );
    }

    #[test]
    fn test_decode_nested_empty_values_are_skipped() {
        assert_eq!(
            decode(&pairs(&[("prop[foo]", ""), ("prop[bar]", "b")])),
            json!({"prop": {"bar": "b"}})
        );
        assert_eq!(decode(&pairs(&[("prop[foo]", "")])), json!({}));
    }

    #[test]
    fn test_decode_deep_nesting() {
        assert_eq!(
            decode(&pairs(&[("a[b][0][c]", "x"), ("a[b][0][d]", "y"), ("a[b][1][c]", "z")])),
            json!({"a": {"b": [{"c": "x", "d": "y"}, {"c": "z"}]}})
        );
    }

    #[test]
    fn test_decode_drops_malformed_keys() {
        assert_eq!(
            decode(&pairs(&[("prop[foo", "x"), ("]", "y"), ("ok", "1")])),
            json!({"ok": "1"})
        );
    }

    #[test]
    fn test_decode_mixed_shapes_merge_into_mapping() {
        assert_eq!(
            decode(&pairs(&[("prop", "1"), ("prop[a]", "2"), ("prop[0]", "3")])),
            json!({"prop": {"a": "2", "0": "3"}})
        );
        assert_eq!(
            decode(&pairs(&[("prop[0]", "x"), ("prop[k]", "y")])),
            json!({"prop": {"0": "x", "k": "y"}})
        );
    }

    #[test]
    fn test_decode_large_index_becomes_key() {
        assert_eq!(
            decode(&pairs(&[("p[500]", "x")])),
            json!({"p": {"500": "x"}})
        );
        assert_eq!(decode(&pairs(&[("p[2]", "x")])), json!({"p": [null, null, "x"]}));
    }

    #[test]
    fn test_append_to_mapping_takes_a_free_member() {
        assert_eq!(
            decode(&pairs(&[("p[2]", "a"), ("p[40]", "x"), ("p[]", "c")])),
            json!({"p": {"2": "a", "40": "x", "3": "c"}})
        );
        assert_eq!(
            decode(&pairs(&[("p[k]", "a"), ("p[1]", "b"), ("p[]", "c"), ("p[]", "d")])),
            json!({"p": {"k": "a", "1": "b", "2": "c", "3": "d"}})
        );
    }

    #[test]
    fn test_decode_drops_over_deep_keys() {
        let deep = format!("p{}", "[a]".repeat(10_000));
        assert_eq!(decode(&pairs(&[(deep.as_str(), "x"), ("ok", "1")])), json!({"ok": "1"}));

        let limit = format!("p{}", "[0]".repeat(MAX_DEPTH));
        let tree = decode(&pairs(&[(limit.as_str(), "x")]));
        let mut node = &tree["p"];
        for _ in 0..MAX_DEPTH {
            node = &node[0];
        }
        assert_eq!(node, &json!("x"));

        let over = format!("p{}", "[0]".repeat(MAX_DEPTH + 1));
        assert_eq!(decode(&pairs(&[(over.as_str(), "x")])), json!({}));
    }

    #[test]
    fn test_decode_root_overrides_structure() {
        assert_eq!(
            decode(&pairs(&[("prop[a]", "1"), ("prop", "flat")])),
            json!({"prop": "flat"})
        );
    }

    #[test]
    fn test_decode_query() {
        assert_eq!(
            decode_query("?prop[foo]=a+b&prop[bar]=1,2"),
            json!({"prop": {"foo": "a b", "bar": "1,2"}})
        );
    }
}
