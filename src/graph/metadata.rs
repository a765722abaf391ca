//! Typed key/value metadata attached to nodes and edges
//!
//! Values are a small tagged union. Typed accessors distinguish a missing key
//! from a key holding a value of another type, so scorers can tell "no penalty
//! set" apart from "penalty set to a string".

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Float(f64),
    Text(String),
}

impl MetadataValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            MetadataValue::Bool(_) => "bool",
            MetadataValue::Float(_) => "float",
            MetadataValue::Text(_) => "string",
        }
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<f32> for MetadataValue {
    fn from(v: f32) -> Self {
        MetadataValue::Float(v as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Text(v)
    }
}

/// Lookup failure for a typed accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("metadata key is not set")]
    Missing,
    #[error("metadata value is a {found}, expected a {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Metadata store for one node or edge. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    data: FxHashMap<String, MetadataValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value at `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<MetadataValue> {
        self.data.remove(key)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get_f64(&self, key: &str) -> Result<f64, MetadataError> {
        match self.data.get(key) {
            Some(MetadataValue::Float(v)) => Ok(*v),
            Some(other) => Err(MetadataError::TypeMismatch {
                expected: "float",
                found: other.type_name(),
            }),
            None => Err(MetadataError::Missing),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<&str, MetadataError> {
        match self.data.get(key) {
            Some(MetadataValue::Text(v)) => Ok(v.as_str()),
            Some(other) => Err(MetadataError::TypeMismatch {
                expected: "string",
                found: other.type_name(),
            }),
            None => Err(MetadataError::Missing),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, MetadataError> {
        match self.data.get(key) {
            Some(MetadataValue::Bool(v)) => Ok(*v),
            Some(other) => Err(MetadataError::TypeMismatch {
                expected: "bool",
                found: other.type_name(),
            }),
            None => Err(MetadataError::Missing),
        }
    }

    /// Like [`Metadata::get_f64`] but maps a missing key to `Ok(None)`
    pub fn opt_f64(&self, key: &str) -> Result<Option<f64>, MetadataError> {
        match self.get_f64(key) {
            Ok(v) => Ok(Some(v)),
            Err(MetadataError::Missing) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Like [`Metadata::get_str`] but maps a missing key to `Ok(None)`
    pub fn opt_str(&self, key: &str) -> Result<Option<&str>, MetadataError> {
        match self.get_str(key) {
            Ok(v) => Ok(Some(v)),
            Err(MetadataError::Missing) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
