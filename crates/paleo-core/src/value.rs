//! Untyped response/payload tree.
//!
//! Remote responses arrive schema-flexible: mappings of element name to
//! text, raw bytes, nested mappings, or lists of any of those. Payloads sent
//! to the service use the same shape. A dedicated sum type (rather than
//! `serde_json::Value`) keeps raw byte payloads first-class and preserves
//! element order end to end.

use indexmap::IndexMap;

/// Insertion-ordered mapping from element name to value.
pub type ValueMap = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Member lookup on a mapping; `None` for any other shape.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Probe several equivalent member names in priority order and return
    /// the first one present. This is how naming variants across deployments
    /// are read back out of responses.
    pub fn first_of(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.get(key))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
