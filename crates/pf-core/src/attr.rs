//! Scalar attribute values carried by entities.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single entity attribute.
///
/// Deserialized untagged, so the JSON literals `true`, `42`, and `"vip"` map
/// to `Bool`, `Number`, and `Text` respectively.  Integers are widened to
/// `f64`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Attribute map keyed by attribute name.  Ordered so iteration is
/// deterministic.
pub type Attributes = BTreeMap<String, AttrValue>;

impl AttrValue {
    /// Short type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Bool(_)   => "bool",
            AttrValue::Number(_) => "number",
            AttrValue::Text(_)   => "string",
        }
    }

    /// Truthiness of a bare value: `false`, `0`, `NaN`, and `""` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Bool(b)   => *b,
            AttrValue::Number(n) => *n != 0.0 && !n.is_nan(),
            AttrValue::Text(s)   => !s.is_empty(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Number(n as f64)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b)   => write!(f, "{b}"),
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Text(s)   => write!(f, "{s:?}"),
        }
    }
}
