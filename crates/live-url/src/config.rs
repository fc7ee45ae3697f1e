//! Binding configuration as emitted by the host, and controller options.
//!
//! The host describes its URL-bound fields as a JSON object keyed by field
//! name. Each entry is either an alias string or an object:
//!
//! ```json
//! {
//!     "query": "q",
//!     "page": {"type": "int", "history": true},
//!     "tags": {"type": "array", "collection_type": "string", "keep": true},
//!     "address": {"paths": {"city": "town", "zip": {"type": "int"}}}
//! }
//! ```

use std::fmt;

use indexmap::IndexMap;
use live_url_query::ListStyle;
use serde::{Deserialize, Serialize};

/// Declared type of a bound value, used to coerce decoded URL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }

    pub fn is_collection(self) -> bool {
        matches!(self, ValueType::Array | ValueType::Object)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bound field.
///
/// A field with `paths` is structured: it binds one parameter per sub-path
/// instead of one for the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawFieldConfig")]
pub struct FieldConfig {
    /// URL parameter name; defaults to the field name.
    pub name: Option<String>,
    /// Keep the parameter in the URL even when the value is empty.
    pub keep: bool,
    /// Changes to this field create a new history entry.
    pub history: bool,
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,
    /// Element type of an `array` field.
    pub collection_type: Option<ValueType>,
    pub paths: Option<IndexMap<String, SubPathConfig>>,
}

/// One writable sub-path of a structured field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawSubPathConfig")]
pub struct SubPathConfig {
    /// URL parameter name; defaults to `<field>_<sub-path>`.
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,
}

/// Field name → field configuration, in declaration order.
pub type BindingConfig = IndexMap<String, FieldConfig>;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldConfig {
    Alias(String),
    Full(FullFieldConfig),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FullFieldConfig {
    name: Option<String>,
    keep: bool,
    history: bool,
    #[serde(rename = "type")]
    value_type: Option<ValueType>,
    collection_type: Option<ValueType>,
    paths: Option<IndexMap<String, SubPathConfig>>,
}

impl From<RawFieldConfig> for FieldConfig {
    fn from(raw: RawFieldConfig) -> Self {
        match raw {
            RawFieldConfig::Alias(name) => FieldConfig {
                name: Some(name),
                ..FieldConfig::default()
            },
            RawFieldConfig::Full(full) => FieldConfig {
                name: full.name,
                keep: full.keep,
                history: full.history,
                value_type: full.value_type,
                collection_type: full.collection_type,
                paths: full.paths,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSubPathConfig {
    Alias(String),
    Full(FullSubPathConfig),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FullSubPathConfig {
    name: Option<String>,
    #[serde(rename = "type")]
    value_type: Option<ValueType>,
}

impl From<RawSubPathConfig> for SubPathConfig {
    fn from(raw: RawSubPathConfig) -> Self {
        match raw {
            RawSubPathConfig::Alias(name) => SubPathConfig {
                name: Some(name),
                value_type: None,
            },
            RawSubPathConfig::Full(full) => SubPathConfig {
                name: full.name,
                value_type: full.value_type,
            },
        }
    }
}

/// What to do with a non-kept parameter whose value became empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPolicy {
    /// Remove it whenever the value is deep-empty.
    #[default]
    Remove,
    /// Leave an empty parameter in place if it was in the URL when the
    /// component connected and the value has not changed since the last pass.
    Sticky,
}

/// Controller options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    pub list_style: ListStyle,
    pub empty_policy: EmptyPolicy,
}
