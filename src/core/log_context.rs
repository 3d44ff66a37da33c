//! Typed key-value fields carried by log entries
//!
//! Fields enter from two directions: a snapshot accumulates defaults
//! through `Logger::with`, and each call may pass its own context. The two
//! sets meet at write time via [`LogContext::merge_defaults`], where the
//! call site wins on key conflicts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl FieldValue {
    /// The JSON representation of this value.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FieldValue::String(s) => Value::from(s.as_str()),
            FieldValue::Int(i) => Value::from(*i),
            // Non-finite floats have no JSON number form.
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(Value::Null, Value::Number),
            FieldValue::Bool(b) => Value::from(*b),
            FieldValue::Null => Value::Null,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => f.write_str("null"),
        }
    }
}

macro_rules! field_value_from {
    ($($source:ty => $variant:ident),+ $(,)?) => {$(
        impl From<$source> for FieldValue {
            fn from(value: $source) -> Self {
                FieldValue::$variant(value.into())
            }
        }
    )+};
}

field_value_from! {
    String => String,
    &str => String,
    i64 => Int,
    i32 => Int,
    u32 => Int,
    f64 => Float,
    bool => Bool,
}

/// An ordered set of fields keyed by name.
///
/// Keys are unique; inserting an existing key replaces its value. Ordering
/// is lexicographic by key, so formatted output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogContext {
    fields: BTreeMap<String, FieldValue>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the context for chaining.
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.add_field(key, value);
        self
    }

    /// Insert a field in place.
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Insert every field from `other`, replacing values on shared keys.
    pub fn extend(&mut self, other: &LogContext) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Layer `defaults` underneath this context: only keys absent here are
    /// taken, so existing (call-site) values stay in place.
    pub fn merge_defaults(&mut self, defaults: &LogContext) {
        for (key, value) in &defaults.fields {
            self.fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Space-separated `key=value` rendering.
    pub fn format_fields(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.fields {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{}={}", key, value);
        }
        out
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_fields())
    }
}
