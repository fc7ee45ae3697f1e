//! The immutable table of field bindings.

use std::collections::HashMap;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::config::{BindingConfig, FieldConfig, ValueType};

/// One model field bound to one URL parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// Dotted path into the model, e.g. `address.city`.
    pub property_path: String,
    /// Parameter name as it appears in the URL.
    pub param_name: String,
    pub keep: bool,
    pub history: bool,
    pub value_type: Option<ValueType>,
    pub collection_type: Option<ValueType>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid binding configuration: {0}")]
    InvalidJson(String),
    #[error("field name must not be empty")]
    EmptyFieldName,
    #[error("parameter {param:?} of field {field:?} must be non-empty and free of '[', ']', '&', '=' and '#'")]
    InvalidParameterName { field: String, param: String },
    #[error("parameter {param:?} is bound by both {first:?} and {second:?}")]
    DuplicateParameter {
        param: String,
        first: String,
        second: String,
    },
    #[error("property path {path:?} is bound twice")]
    DuplicatePropertyPath { path: String },
    #[error("structured field {field:?} cannot take a single parameter name")]
    AliasOnStructuredField { field: String },
    #[error("structured field {field:?} declares no sub-paths")]
    MissingSubPaths { field: String },
    #[error("sub-path {sub_path:?} of field {field:?} is empty")]
    EmptySubPath { field: String, sub_path: String },
    #[error("sub-path {sub_path:?} of field {field:?} is a collection")]
    CollectionSubPath { field: String, sub_path: String },
    #[error("sub-path {sub_path:?} of field {field:?} is an object; only scalars are supported")]
    ObjectSubPath { field: String, sub_path: String },
    #[error("array field {field:?} cannot hold {collection_type} elements")]
    NestedCollection {
        field: String,
        collection_type: ValueType,
    },
}

/// Bindings of one component, resolvable by parameter name or property path.
///
/// Iteration follows declaration order, with a structured field's sub-paths
/// in their own declared order.
///
/// # Example
///
/// ```
/// use live_url::MappingTable;
///
/// let table = MappingTable::from_json(
///     r#"{"query": "q", "address": {"paths": {"city": "town", "zip": {}}}}"#,
/// )
/// .unwrap();
/// let params: Vec<&str> = table.iter().map(|b| b.param_name.as_str()).collect();
/// assert_eq!(params, vec!["q", "town", "address_zip"]);
/// assert_eq!(table.by_param("town").unwrap().property_path, "address.city");
/// assert_eq!(table.by_property_path("query").unwrap().param_name, "q");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    bindings: IndexMap<String, FieldBinding>,
    by_path: HashMap<String, usize>,
}

impl MappingTable {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BindingConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &BindingConfig) -> Result<Self, ConfigError> {
        let mut table = MappingTable::default();
        for (field, field_config) in config {
            for binding in expand_field(field, field_config)? {
                table.insert(binding)?;
            }
        }
        debug!(
            target: "live_url::mapping",
            fields = config.len(),
            bindings = table.len(),
            "built mapping table"
        );
        Ok(table)
    }

    fn insert(&mut self, binding: FieldBinding) -> Result<(), ConfigError> {
        if let Some(existing) = self.bindings.get(&binding.param_name) {
            return Err(ConfigError::DuplicateParameter {
                param: binding.param_name.clone(),
                first: existing.property_path.clone(),
                second: binding.property_path,
            });
        }
        if self.by_path.contains_key(&binding.property_path) {
            return Err(ConfigError::DuplicatePropertyPath {
                path: binding.property_path,
            });
        }
        self.by_path
            .insert(binding.property_path.clone(), self.bindings.len());
        self.bindings.insert(binding.param_name.clone(), binding);
        Ok(())
    }

    pub fn by_param(&self, param: &str) -> Option<&FieldBinding> {
        self.bindings.get(param)
    }

    pub fn by_property_path(&self, path: &str) -> Option<&FieldBinding> {
        let idx = *self.by_path.get(path)?;
        self.bindings.get_index(idx).map(|(_, binding)| binding)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldBinding> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> IntoIterator for &'a MappingTable {
    type Item = &'a FieldBinding;
    type IntoIter = indexmap::map::Values<'a, String, FieldBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.values()
    }
}

// ── Field expansion ───────────────────────────────────────────────────────

fn expand_field(field: &str, config: &FieldConfig) -> Result<Vec<FieldBinding>, ConfigError> {
    if field.is_empty() {
        return Err(ConfigError::EmptyFieldName);
    }
    if let Some(collection_type) = config.collection_type {
        if config.value_type == Some(ValueType::Array) && collection_type.is_collection() {
            return Err(ConfigError::NestedCollection {
                field: field.to_string(),
                collection_type,
            });
        }
    }
    let Some(paths) = &config.paths else {
        let param = config.name.clone().unwrap_or_else(|| field.to_string());
        check_param_name(field, &param)?;
        return Ok(vec![FieldBinding {
            property_path: field.to_string(),
            param_name: param,
            keep: config.keep,
            history: config.history,
            value_type: config.value_type,
            collection_type: config.collection_type,
        }]);
    };

    if config.name.is_some() {
        return Err(ConfigError::AliasOnStructuredField {
            field: field.to_string(),
        });
    }
    if paths.is_empty() {
        return Err(ConfigError::MissingSubPaths {
            field: field.to_string(),
        });
    }
    let mut out = Vec::with_capacity(paths.len());
    for (sub_path, sub) in paths {
        let (field, sub_path) = (field.to_string(), sub_path.clone());
        if sub_path.is_empty() {
            return Err(ConfigError::EmptySubPath { field, sub_path });
        }
        match sub.value_type {
            Some(ValueType::Array) => {
                return Err(ConfigError::CollectionSubPath { field, sub_path });
            }
            Some(ValueType::Object) => {
                return Err(ConfigError::ObjectSubPath { field, sub_path });
            }
            _ => {}
        }
        let param = sub
            .name
            .clone()
            .unwrap_or_else(|| format!("{field}_{sub_path}"));
        check_param_name(&field, &param)?;
        out.push(FieldBinding {
            property_path: format!("{field}.{sub_path}"),
            param_name: param,
            keep: config.keep,
            history: config.history,
            value_type: sub.value_type,
            collection_type: None,
        });
    }
    Ok(out)
}

fn check_param_name(field: &str, param: &str) -> Result<(), ConfigError> {
    let forbidden = |c: char| matches!(c, '[' | ']' | '&' | '=' | '#');
    if param.is_empty() || param.contains(forbidden) {
        return Err(ConfigError::InvalidParameterName {
            field: field.to_string(),
            param: param.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let table = MappingTable::from_json(r#"{"prop": {}}"#).unwrap();
        let binding = table.by_param("prop").unwrap();
        assert_eq!(binding.property_path, "prop");
        assert!(!binding.keep);
        assert!(!binding.history);
        assert_eq!(binding.value_type, None);
    }

    #[test]
    fn test_alias() {
        let table = MappingTable::from_json(r#"{"prop1": {"name": "alias1"}}"#).unwrap();
        assert!(table.by_param("prop1").is_none());
        assert_eq!(table.by_param("alias1").unwrap().property_path, "prop1");
    }

    #[test]
    fn test_structured_inherits_policy() {
        let table = MappingTable::from_json(
            r#"{"address": {"keep": true, "history": true, "paths": {"city": {}, "zip": {"type": "int"}}}}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        let zip = table.by_param("address_zip").unwrap();
        assert_eq!(zip.property_path, "address.zip");
        assert!(zip.keep);
        assert!(zip.history);
        assert_eq!(zip.value_type, Some(ValueType::Int));
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = MappingTable::from_json(r#"{"a": "x", "b": "x"}"#).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateParameter {
                param: "x".to_string(),
                first: "a".to_string(),
                second: "b".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_property_path() {
        let err = MappingTable::from_json(r#"{"a.b": "x", "a": {"paths": {"b": "y"}}}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicatePropertyPath {
                path: "a.b".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            MappingTable::from_json("{"),
            Err(ConfigError::InvalidJson(_))
        ));
        assert!(matches!(
            MappingTable::from_json(r#"{"a": 5}"#),
            Err(ConfigError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = MappingTable::from_json("{}").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }
}
