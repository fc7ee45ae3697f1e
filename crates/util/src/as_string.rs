use serde_json::{Number, Value};

/// Largest integer magnitude an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Canonical query-string text for a scalar value.
///
/// Strings pass through, booleans render as `true`/`false` and numbers use
/// their shortest decimal form, with integral floats printed without a
/// fractional part (`2.0` renders as `2`). Returns `None` for `null`, lists
/// and mappings, which have no scalar text.
///
/// # Examples
///
/// ```
/// use live_url_util::as_string::as_query_text;
/// use serde_json::json;
///
/// assert_eq!(as_query_text(&json!("foo bar")), Some("foo bar".to_string()));
/// assert_eq!(as_query_text(&json!(42)), Some("42".to_string()));
/// assert_eq!(as_query_text(&json!(2.0)), Some("2".to_string()));
/// assert_eq!(as_query_text(&json!(true)), Some("true".to_string()));
/// assert_eq!(as_query_text(&json!(null)), None);
/// ```
pub fn as_query_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_text(n)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            format!("{}", f as i64)
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
