//! Initial props from a request's query string, before the first render.

use indexmap::IndexMap;
use live_url_query::decode_query;
use serde_json::Value;
use tracing::warn;

use crate::coerce::{coerce, CoercionError};
use crate::mapping::MappingTable;
use crate::store::ValueStore;

/// Values found for bound parameters, keyed by property path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub values: IndexMap<String, Value>,
    pub errors: Vec<CoercionError>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.errors.is_empty()
    }

    pub fn get(&self, property_path: &str) -> Option<&Value> {
        self.values.get(property_path)
    }

    /// Write every extracted value into `store`.
    pub fn apply_to<S: ValueStore + ?Sized>(&self, store: &mut S) {
        for (path, value) in &self.values {
            store.set(path, value.clone());
        }
    }
}

/// Decode `query` and collect the coerced value of every bound parameter
/// present in it, in binding order. Unbound parameters are ignored.
///
/// # Example
///
/// ```
/// use live_url::{extract_props, MappingTable};
/// use serde_json::json;
///
/// let table = MappingTable::from_json(
///     r#"{"prop2": {"type": "int"}, "prop6": "q"}"#,
/// )
/// .unwrap();
/// let extraction = extract_props("?prop2=42&q=foo&other=1", &table);
/// assert_eq!(extraction.get("prop2"), Some(&json!(42)));
/// assert_eq!(extraction.get("prop6"), Some(&json!("foo")));
/// assert_eq!(extraction.values.len(), 2);
/// ```
pub fn extract_props(query: &str, table: &MappingTable) -> Extraction {
    let mut extraction = Extraction::default();
    let Value::Object(tree) = decode_query(query) else {
        return extraction;
    };
    for binding in table {
        let Some(raw) = tree.get(&binding.param_name) else {
            continue;
        };
        match coerce(binding, raw.clone()) {
            Ok(value) => {
                extraction
                    .values
                    .insert(binding.property_path.clone(), value);
            }
            Err(err) => {
                warn!(target: "live_url::extract", error = %err, "skipping parameter");
                extraction.errors.push(err);
            }
        }
    }
    extraction
}
