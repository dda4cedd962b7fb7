//! Block payloads
//!
//! A block carries either free text or a flat record of named scalar
//! readings. Records keep insertion order for display; the hasher always
//! sees their keys sorted.

use crate::error::{LedgerError, Result};
use crate::utils::CanonicalFloat;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single value inside a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(value) => serializer.serialize_bool(*value),
            Scalar::Int(value) => serializer.serialize_i64(*value),
            Scalar::Float(value) => serializer.serialize_f64(*value),
            Scalar::Text(value) => serializer.serialize_str(value),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl Scalar {
    fn from_json(key: &str, value: &serde_json::Value) -> Result<Scalar> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Scalar::Int(i))
                } else if n.is_f64() {
                    n.as_f64().map(Scalar::Float).ok_or_else(|| {
                        LedgerError::Serialization(format!("Field '{key}' is not a valid number"))
                    })
                } else {
                    Err(LedgerError::Serialization(format!(
                        "Field '{key}' does not fit in a signed 64-bit integer"
                    )))
                }
            }
            Value::String(s) => Ok(Scalar::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(LedgerError::Serialization(format!(
                "Field '{key}' must be a scalar value"
            ))),
        }
    }
}

/// Ordered mapping of field names to scalar values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Record {
        Record { fields: Vec::new() }
    }

    /// Builder-style [`Record::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Record {
        self.insert(key, value);
        self
    }

    /// Set `key` to `value`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn sorted(&self) -> BTreeMap<&str, CanonicalScalar<'_>> {
        self.iter()
            .map(|(key, value)| (key, CanonicalScalar(value)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Payload stored in a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockData {
    Text(String),
    Record(Record),
}

impl BlockData {
    /// Parse a JSON string literal or a flat JSON object of scalars.
    pub fn from_json(input: &str) -> Result<BlockData> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        match value {
            serde_json::Value::String(text) => Ok(BlockData::Text(text)),
            serde_json::Value::Object(map) => {
                let mut record = Record::new();
                for (key, value) in &map {
                    record.insert(key.as_str(), Scalar::from_json(key, value)?);
                }
                Ok(BlockData::Record(record))
            }
            other => Err(LedgerError::Serialization(format!(
                "Block data must be a string or an object, got {other}"
            ))),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BlockData::Text(text) => Some(text),
            BlockData::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            BlockData::Record(record) => Some(record),
            BlockData::Text(_) => None,
        }
    }

    /// View of this payload with record keys in sorted order, for hashing.
    pub(crate) fn canonical(&self) -> CanonicalData<'_> {
        CanonicalData(self)
    }
}

impl Serialize for BlockData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BlockData::Text(text) => serializer.serialize_str(text),
            BlockData::Record(record) => record.serialize(serializer),
        }
    }
}

impl fmt::Display for BlockData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockData::Text(text) => f.write_str(text),
            BlockData::Record(record) => {
                let rendered = serde_json::to_string(record).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

impl From<&str> for BlockData {
    fn from(value: &str) -> Self {
        BlockData::Text(value.to_string())
    }
}

impl From<String> for BlockData {
    fn from(value: String) -> Self {
        BlockData::Text(value)
    }
}

impl From<Record> for BlockData {
    fn from(value: Record) -> Self {
        BlockData::Record(value)
    }
}

pub(crate) struct CanonicalData<'a>(&'a BlockData);

// Non-finite floats keep their own spelling so they never hash like `null`.
struct CanonicalScalar<'a>(&'a Scalar);

impl Serialize for CanonicalScalar<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Scalar::Float(value) => CanonicalFloat(*value).serialize(serializer),
            other => other.serialize(serializer),
        }
    }
}

impl Serialize for CanonicalData<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            BlockData::Text(text) => serializer.serialize_str(text),
            BlockData::Record(record) => record.sorted().serialize(serializer),
        }
    }
}
