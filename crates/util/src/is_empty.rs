use serde_json::Value;

/// Check if a value is deep-empty.
///
/// A value is deep-empty when it is `null`, the empty string, or a list or
/// mapping whose every member is itself deep-empty. Booleans and numbers are
/// never empty, so `0` and `false` count as content.
///
/// # Examples
///
/// ```
/// use live_url_util::is_empty::is_deep_empty;
/// use serde_json::json;
///
/// assert!(is_deep_empty(&json!({"foo": null, "bar": ""})));
/// assert!(!is_deep_empty(&json!({"foo": null, "bar": 0})));
/// assert!(is_deep_empty(&json!([])));
/// assert!(is_deep_empty(&json!([null])));
/// ```
pub fn is_deep_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
        Value::Array(items) => items.iter().all(is_deep_empty),
        Value::Object(map) => map.values().all(is_deep_empty),
    }
}
