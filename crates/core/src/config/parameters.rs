//! Typed key/value parameter access

use crate::error::{InitError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A single configuration value as delivered by the loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Real(f64),
    Reals(Vec<f64>),
    Integer(i64),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Real(_) => "real",
            ParamValue::Reals(_) => "real array",
            ParamValue::Integer(_) => "integer",
            ParamValue::Bool(_) => "bool",
            ParamValue::Text(_) => "text",
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::Reals(v)
    }
}

impl From<&[f64]> for ParamValue {
    fn from(v: &[f64]) -> Self {
        ParamValue::Reals(v.to_vec())
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

fn type_mismatch(key: &str, expected: &str, found: &ParamValue) -> InitError {
    InitError::config(key, format!("expected {expected}, found {}", found.kind()))
}

/// Read-only access to configuration parameters
///
/// Every getter returns `Ok(None)` for an absent key and an error when the key
/// is present with an incompatible type. Integers are accepted where a real is
/// expected, and a lone real is accepted as a one-element array.
pub trait ParameterSource {
    /// Raw lookup
    fn lookup(&self, key: &str) -> Option<&ParamValue>;

    fn real(&self, key: &str) -> Result<Option<f64>> {
        match self.lookup(key) {
            None => Ok(None),
            Some(ParamValue::Real(v)) => Ok(Some(*v)),
            Some(ParamValue::Integer(v)) => Ok(Some(*v as f64)),
            Some(other) => Err(type_mismatch(key, "real", other)),
        }
    }

    fn reals(&self, key: &str) -> Result<Option<Vec<f64>>> {
        match self.lookup(key) {
            None => Ok(None),
            Some(ParamValue::Reals(v)) => Ok(Some(v.clone())),
            Some(ParamValue::Real(v)) => Ok(Some(vec![*v])),
            Some(other) => Err(type_mismatch(key, "real array", other)),
        }
    }

    fn integer(&self, key: &str) -> Result<Option<i64>> {
        match self.lookup(key) {
            None => Ok(None),
            Some(ParamValue::Integer(v)) => Ok(Some(*v)),
            Some(other) => Err(type_mismatch(key, "integer", other)),
        }
    }

    fn boolean(&self, key: &str) -> Result<Option<bool>> {
        match self.lookup(key) {
            None => Ok(None),
            Some(ParamValue::Bool(v)) => Ok(Some(*v)),
            Some(other) => Err(type_mismatch(key, "bool", other)),
        }
    }

    fn text(&self, key: &str) -> Result<Option<String>> {
        match self.lookup(key) {
            None => Ok(None),
            Some(ParamValue::Text(v)) => Ok(Some(v.clone())),
            Some(other) => Err(type_mismatch(key, "text", other)),
        }
    }
}

/// In-memory parameter table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterTable {
    values: FxHashMap<String, ParamValue>,
}

impl ParameterTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ParameterSource for ParameterTable {
    fn lookup(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }
}
