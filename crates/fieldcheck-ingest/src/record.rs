//! Normalized output values

use std::collections::BTreeMap;

use serde::Serialize;

use crate::duration::SignedDuration;
use crate::status::Timeliness;

/// A coerced data cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// `HH:MM:SS`, or empty when unreadable
    Time(String),
    Duration(SignedDuration),
    Count(u32),
    Flag(bool),
}

impl FieldValue {
    /// Whether a text-like value is empty; other kinds never are
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) | FieldValue::Time(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text or time content
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Time(s) => Some(s),
            _ => None,
        }
    }

    /// Count content
    pub fn as_count(&self) -> Option<u32> {
        match self {
            FieldValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Duration content
    pub fn as_duration(&self) -> Option<SignedDuration> {
        match self {
            FieldValue::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Flag content
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

/// A coerced metadata value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    /// `YYYY-MM-DD`
    Date(String),
    Integer(i64),
}

impl MetadataValue {
    /// Text or date content
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) | MetadataValue::Date(s) => Some(s),
            MetadataValue::Integer(_) => None,
        }
    }

    /// Integer content
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// Canonical metadata key to value, sorted by key
pub type MetadataMap = BTreeMap<String, MetadataValue>;

/// One service check, fully coerced.
///
/// Serializes flat: `id`, `row`, every schema field under its key, then the
/// derived `status` and `nonCompliance`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    /// Stable identifier
    pub id: String,
    /// 1-based row number in the source grid
    pub row: usize,
    /// Schema fields by key
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Derived from the duration field
    pub status: Timeliness,
    /// Explicit marker or report mention in the observations
    pub non_compliance: bool,
}

impl NormalizedRecord {
    /// Field by key
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Text or time field, empty when absent
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(FieldValue::as_str).unwrap_or("")
    }

    /// Count field, 0 when absent
    pub fn count(&self, key: &str) -> u32 {
        self.get(key).and_then(FieldValue::as_count).unwrap_or(0)
    }

    /// Duration field, zero when absent
    pub fn duration(&self, key: &str) -> SignedDuration {
        self.get(key)
            .and_then(FieldValue::as_duration)
            .unwrap_or(SignedDuration::ZERO)
    }
}
