use live_url_util::{as_query_text, is_deep_empty};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,3}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..4).prop_map(|entries| {
                let mut map = Map::new();
                for (k, v) in entries {
                    map.insert(k, v);
                }
                Value::Object(map)
            }),
        ]
    })
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
        Value::Array(items) => items.iter().any(has_content),
        Value::Object(map) => map.values().any(has_content),
    }
}

proptest! {
    #[test]
    fn deep_empty_is_absence_of_content(value in arb_value()) {
        prop_assert_eq!(is_deep_empty(&value), !has_content(&value));
    }

    #[test]
    fn wrapping_preserves_emptiness(value in arb_value(), key in "[a-z]{1,4}") {
        let mut map = Map::new();
        map.insert(key, value.clone());
        let wrapped_obj = Value::Object(map);
        let wrapped_arr = Value::Array(vec![value.clone()]);
        prop_assert_eq!(is_deep_empty(&wrapped_obj), is_deep_empty(&value));
        prop_assert_eq!(is_deep_empty(&wrapped_arr), is_deep_empty(&value));
    }

    #[test]
    fn integers_render_in_decimal(n in any::<i64>()) {
        prop_assert_eq!(as_query_text(&json!(n)), Some(n.to_string()));
    }
}
