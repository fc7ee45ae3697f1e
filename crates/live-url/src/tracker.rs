use serde_json::Value;

/// What the controller last saw of one bound field.
///
/// Values are compared by their serialized JSON text, so two values are
/// "the same" exactly when they would reach the URL identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracker {
    last_known_value: String,
    initially_present: bool,
}

impl Tracker {
    pub fn new(value: &Value, initially_present: bool) -> Self {
        Self {
            last_known_value: value.to_string(),
            initially_present,
        }
    }

    pub fn last_known_value(&self) -> &str {
        &self.last_known_value
    }

    /// Whether the parameter was in the URL when the component connected.
    pub fn initially_present(&self) -> bool {
        self.initially_present
    }

    pub fn has_changed(&self, value: &Value) -> bool {
        value.to_string() != self.last_known_value
    }

    pub fn record(&mut self, value: &Value) {
        self.last_known_value = value.to_string();
    }

    /// Whether an empty `value` should stay in the URL as an empty parameter:
    /// it was shown at connect time and nothing changed since the last pass.
    pub fn keeps_empty(&self, value: &Value) -> bool {
        self.initially_present && !self.has_changed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_detection() {
        let mut tracker = Tracker::new(&json!({"a": [1]}), false);
        assert_eq!(tracker.last_known_value(), r#"{"a":[1]}"#);
        assert!(!tracker.has_changed(&json!({"a": [1]})));
        assert!(tracker.has_changed(&json!({"a": [2]})));
        tracker.record(&json!({"a": [2]}));
        assert!(!tracker.has_changed(&json!({"a": [2]})));
    }

    #[test]
    fn test_keeps_empty() {
        let tracker = Tracker::new(&json!(""), true);
        assert!(tracker.keeps_empty(&json!("")));
        assert!(!tracker.keeps_empty(&json!(null)));

        let absent = Tracker::new(&json!(""), false);
        assert!(!absent.keeps_empty(&json!("")));
    }
}
