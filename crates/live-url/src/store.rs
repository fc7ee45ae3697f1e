//! The component side: a value store addressed by dotted property paths.

use live_url_query::path::{get_path, has_path, set_path};
use serde_json::{Map, Value};

/// Read/write access to a component's model.
pub trait ValueStore {
    /// The value at `path`, or `null` when nothing is there.
    fn get(&self, path: &str) -> Value;
    fn set(&mut self, path: &str, value: Value);
    /// Whether `path` resolves, even to an explicit `null`.
    fn has(&self, path: &str) -> bool;
}

/// A value store that can also ask its host to re-render.
pub trait Component: ValueStore {
    fn request_render(&mut self);
}

/// A component backed by an in-memory model, counting render requests.
///
/// # Example
///
/// ```
/// use live_url::{Component, MemoryStore, ValueStore};
/// use serde_json::json;
///
/// let mut store = MemoryStore::new(json!({"address": {"city": null}}));
/// store.set("address.city", json!("Lyon"));
/// assert_eq!(store.get("address.city"), json!("Lyon"));
/// assert!(store.has("address.city"));
/// assert!(!store.has("address.zip"));
/// store.request_render();
/// assert_eq!(store.render_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStore {
    model: Value,
    renders: usize,
}

impl MemoryStore {
    pub fn new(model: Value) -> Self {
        Self { model, renders: 0 }
    }

    pub fn model(&self) -> &Value {
        &self.model
    }

    pub fn into_model(self) -> Value {
        self.model
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl ValueStore for MemoryStore {
    fn get(&self, path: &str) -> Value {
        get_path(&self.model, path).cloned().unwrap_or(Value::Null)
    }

    fn set(&mut self, path: &str, value: Value) {
        set_path(&mut self.model, path, value);
    }

    fn has(&self, path: &str) -> bool {
        has_path(&self.model, path)
    }
}

impl Component for MemoryStore {
    fn request_render(&mut self) {
        self.renders += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_path_reads_null() {
        let store = MemoryStore::default();
        assert_eq!(store.get("nope"), Value::Null);
        assert!(!store.has("nope"));
    }

    #[test]
    fn test_set_whole_field() {
        let mut store = MemoryStore::new(json!({"prop": {"foo": "a"}}));
        store.set("prop", json!(null));
        assert_eq!(store.model(), &json!({"prop": null}));
        assert!(store.has("prop"));
    }

    #[test]
    fn test_into_model() {
        let mut store = MemoryStore::default();
        store.set("a.b", json!(1));
        assert_eq!(store.into_model(), json!({"a": {"b": 1}}));
    }
}
