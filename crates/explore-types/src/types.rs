use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// A single value read from a keyed metadata database item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldValue {
    /// UTF-8 string value
    String(String),
    /// Signed integer value
    Integer(i64),
    /// Unsigned integer value
    UInteger(u64),
    /// Boolean value
    Boolean(bool),
    /// Raw bytes (content hashes are stored this way)
    Binary(Vec<u8>),
    /// Ordered key/value map; a database record is one of these
    Map(Vec<(String, FieldValue)>),
    /// Null value
    Null,
}

// -------------------------------------------------------------------------------------------------
// Conversions between `FieldValue` and `serde_json::Value`, so catalogs can be described as JSON
// documents. Arrays of bytes map to `Binary`; objects become maps in key order.
// -------------------------------------------------------------------------------------------------

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::String(s) => Self::String(s),
            FieldValue::Integer(i) => Self::Number(serde_json::Number::from(i)),
            FieldValue::UInteger(u) => Self::Number(serde_json::Number::from(u)),
            FieldValue::Boolean(b) => Self::Bool(b),
            FieldValue::Binary(bytes) => {
                Self::Array(bytes.into_iter().map(|b| Self::Number(b.into())).collect())
            }
            FieldValue::Map(items) => Self::Object(
                items
                    .into_iter()
                    .map(|(k, v)| (k, v.into()))
                    .collect::<serde_json::Map<String, Self>>(),
            ),
            FieldValue::Null => Self::Null,
        }
    }
}

impl TryFrom<&serde_json::Value> for FieldValue {
    type Error = anyhow::Error;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInteger(u)
                } else {
                    return Err(anyhow!("Unsupported number value: {}", n));
                }
            }
            serde_json::Value::Bool(b) => Self::Boolean(*b),
            serde_json::Value::Array(arr) => {
                let bytes = arr
                    .iter()
                    .map(|v| {
                        v.as_u64()
                            .and_then(|n| u8::try_from(n).ok())
                            .ok_or_else(|| anyhow!("Array element is not a byte: {}", v))
                    })
                    .collect::<Result<Vec<u8>>>()?;
                Self::Binary(bytes)
            }
            serde_json::Value::Object(map) => {
                let mut items = Vec::with_capacity(map.len());
                for (k, v) in map {
                    items.push((k.clone(), Self::try_from(v)?));
                }
                Self::Map(items)
            }
            serde_json::Value::Null => Self::Null,
        })
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::UInteger(u) => write!(f, "{u}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Binary(bytes) => {
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                Ok(())
            }
            Self::Map(items) => {
                write!(f, "{{")?;
                for (i, (key, value)) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Build a map value from `(key, value)` pairs
    #[must_use]
    pub fn map<K: Into<String>>(items: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Map(items.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a string value
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Build the 4-byte big-endian binary form a database uses for a CRC32
    #[must_use]
    pub fn crc32(crc: u32) -> Self {
        Self::Binary(crc.to_be_bytes().to_vec())
    }

    /// Borrow the string payload, if this is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload for either integer variant
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::UInteger(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Borrow the map entries, if this is a map
    #[must_use]
    pub fn as_map(&self) -> Option<&[(String, Self)]> {
        match self {
            Self::Map(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key in a map value (first match wins)
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map()?.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get the type name as a string
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::UInteger(_) => "uinteger",
            Self::Boolean(_) => "boolean",
            Self::Binary(_) => "binary",
            Self::Map(_) => "map",
            Self::Null => "null",
        }
    }
}

/// One row of a playlist
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Display label
    #[serde(default)]
    pub label: Option<String>,
    /// Content hash as text, e.g. `"DEADBEEF|crc"`
    #[serde(default)]
    pub crc32: Option<String>,
    /// Name of the metadata database describing this content
    #[serde(default)]
    pub db_name: Option<String>,
    /// Display name of the core associated with this content
    #[serde(default)]
    pub core_name: Option<String>,
    /// Path to the content on disk
    #[serde(default)]
    pub path: String,
}

impl PlaylistEntry {
    /// Create an entry with a label and content path
    #[must_use]
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self { label: Some(label.into()), path: path.into(), ..Self::default() }
    }

    /// Set the content hash text
    #[must_use]
    pub fn with_crc32(mut self, crc32: impl Into<String>) -> Self {
        self.crc32 = Some(crc32.into());
        self
    }

    /// Set the metadata database name
    #[must_use]
    pub fn with_db(mut self, db_name: impl Into<String>) -> Self {
        self.db_name = Some(db_name.into());
        self
    }

    /// Set the core display name
    #[must_use]
    pub fn with_core(mut self, core_name: impl Into<String>) -> Self {
        self.core_name = Some(core_name.into());
        self
    }

    /// Label text, empty when missing
    #[must_use]
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Whether the entry carries the hash, database and label needed for indexing
    #[must_use]
    pub fn is_indexable(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.crc32) && present(&self.db_name) && present(&self.label)
    }
}

/// Description of an installed core
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreInfo {
    /// Name the core is shown under (and referenced by from playlists)
    pub display_name: String,
    /// Name of the system the core emulates
    #[serde(default)]
    pub system_name: Option<String>,
}

impl CoreInfo {
    /// Create a core description
    #[must_use]
    pub fn new(display_name: impl Into<String>, system_name: impl Into<String>) -> Self {
        Self { display_name: display_name.into(), system_name: Some(system_name.into()) }
    }
}
