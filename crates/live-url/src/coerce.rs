//! Coercion of decoded URL values to a binding's declared type.

use live_url_util::as_query_text;
use serde_json::{Number, Value};
use thiserror::Error;

use crate::config::ValueType;
use crate::mapping::FieldBinding;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("parameter {param:?} expects {expected}, found {found}")]
pub struct CoercionError {
    pub param: String,
    pub expected: ValueType,
    pub found: String,
}

/// Convert a decoded value to the binding's declared type.
///
/// Untyped bindings get the value back unchanged. For every declared type
/// other than `string`, an empty text (`name=`) becomes `null`.
///
/// # Example
///
/// ```
/// use live_url::{coerce, MappingTable};
/// use serde_json::json;
///
/// let table = MappingTable::from_json(r#"{"page": {"type": "int"}}"#).unwrap();
/// let page = table.by_param("page").unwrap();
/// assert_eq!(coerce(page, json!("42")).unwrap(), json!(42));
/// assert_eq!(coerce(page, json!("")).unwrap(), json!(null));
/// assert!(coerce(page, json!("4x")).is_err());
/// ```
pub fn coerce(binding: &FieldBinding, value: Value) -> Result<Value, CoercionError> {
    let Some(expected) = binding.value_type else {
        return Ok(value);
    };
    coerce_to(&binding.param_name, expected, binding.collection_type, value)
}

fn coerce_to(
    param: &str,
    expected: ValueType,
    collection_type: Option<ValueType>,
    value: Value,
) -> Result<Value, CoercionError> {
    let fail = |found: &Value| CoercionError {
        param: param.to_string(),
        expected,
        found: describe(found),
    };
    if expected != ValueType::String && value.as_str() == Some("") {
        return Ok(Value::Null);
    }
    match expected {
        _ if value.is_null() => Ok(Value::Null),
        ValueType::String => match as_query_text(&value) {
            Some(text) => Ok(Value::String(text)),
            None => Err(fail(&value)),
        },
        ValueType::Bool => match scalar_text(&value).as_deref().and_then(parse_bool) {
            Some(flag) => Ok(Value::Bool(flag)),
            None => Err(fail(&value)),
        },
        ValueType::Int => match scalar_text(&value).and_then(|text| text.parse::<i64>().ok()) {
            Some(n) => Ok(Value::from(n)),
            None => Err(fail(&value)),
        },
        ValueType::Float => match scalar_text(&value)
            .and_then(|text| text.parse::<f64>().ok())
            .and_then(Number::from_f64)
        {
            Some(n) => Ok(Value::Number(n)),
            None => Err(fail(&value)),
        },
        ValueType::Array => {
            let items = match value {
                Value::Array(items) => items,
                Value::Object(map) => map.into_iter().map(|(_, item)| item).collect(),
                other => return Err(fail(&other)),
            };
            match collection_type {
                Some(element) => items
                    .into_iter()
                    .map(|item| coerce_to(param, element, None, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                None => Ok(Value::Array(items)),
            }
        }
        ValueType::Object => match value {
            Value::Object(_) => Ok(value),
            other => Err(fail(&other)),
        },
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(_) | Value::Object(_) => None,
        scalar => as_query_text(scalar),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Array(_) => "a list".to_string(),
        Value::Object(_) => "a mapping".to_string(),
        scalar => format!("{:?}", as_query_text(scalar).unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn binding(value_type: Option<ValueType>, collection_type: Option<ValueType>) -> FieldBinding {
        FieldBinding {
            property_path: "prop".to_string(),
            param_name: "p".to_string(),
            keep: false,
            history: false,
            value_type,
            collection_type,
        }
    }

    #[test]
    fn test_untyped_passes_through() {
        let b = binding(None, None);
        assert_eq!(coerce(&b, json!({"a": ["1"]})).unwrap(), json!({"a": ["1"]}));
        assert_eq!(coerce(&b, json!("")).unwrap(), json!(""));
    }

    #[test]
    fn test_string() {
        let b = binding(Some(ValueType::String), None);
        assert_eq!(coerce(&b, json!("foo")).unwrap(), json!("foo"));
        assert_eq!(coerce(&b, json!("")).unwrap(), json!(""));
        assert_eq!(coerce(&b, json!(3)).unwrap(), json!("3"));
        assert!(coerce(&b, json!(["a"])).is_err());
    }

    #[test]
    fn test_int() {
        let b = binding(Some(ValueType::Int), None);
        assert_eq!(coerce(&b, json!("42")).unwrap(), json!(42));
        assert_eq!(coerce(&b, json!("-7")).unwrap(), json!(-7));
        assert_eq!(coerce(&b, json!("")).unwrap(), json!(null));
        let err = coerce(&b, json!("4.2")).unwrap_err();
        assert_eq!(
            err,
            CoercionError {
                param: "p".to_string(),
                expected: ValueType::Int,
                found: "\"4.2\"".to_string(),
            }
        );
    }

    #[test]
    fn test_float() {
        let b = binding(Some(ValueType::Float), None);
        assert_eq!(coerce(&b, json!("1.5")).unwrap(), json!(1.5));
        assert_eq!(coerce(&b, json!("2")).unwrap(), json!(2.0));
        assert!(coerce(&b, json!("inf")).is_err());
        assert!(coerce(&b, json!("NaN")).is_err());
    }

    #[test]
    fn test_bool() {
        let b = binding(Some(ValueType::Bool), None);
        for text in ["1", "true", "on", "yes", "TRUE"] {
            assert_eq!(coerce(&b, json!(text)).unwrap(), json!(true), "{text}");
        }
        for text in ["0", "false", "off", "no"] {
            assert_eq!(coerce(&b, json!(text)).unwrap(), json!(false), "{text}");
        }
        assert!(coerce(&b, json!("maybe")).is_err());
    }

    #[test]
    fn test_array() {
        let b = binding(Some(ValueType::Array), Some(ValueType::Int));
        assert_eq!(coerce(&b, json!(["1", "2"])).unwrap(), json!([1, 2]));
        assert_eq!(coerce(&b, json!({"0": "1", "5": "2"})).unwrap(), json!([1, 2]));
        assert_eq!(coerce(&b, json!("")).unwrap(), json!(null));
        assert!(coerce(&b, json!("1")).is_err());
        assert!(coerce(&b, json!(["1", "x"])).is_err());

        let untyped = binding(Some(ValueType::Array), None);
        assert_eq!(coerce(&untyped, json!(["a", "b"])).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn test_object() {
        let b = binding(Some(ValueType::Object), None);
        assert_eq!(coerce(&b, json!({"a": "1"})).unwrap(), json!({"a": "1"}));
        let err = coerce(&b, json!(["a"])).unwrap_err();
        assert_eq!(err.found, "a list");
        assert_eq!(err.to_string(), "parameter \"p\" expects object, found a list");
    }
}
