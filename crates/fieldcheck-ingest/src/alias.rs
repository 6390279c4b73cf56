//! Label normalization and alias lookup

use ahash::AHashMap;
use fieldcheck_core::CellValue;

use crate::error::{SchemaError, SchemaResult};

/// Normalize a free-form label for lookup: lowercase, trimmed, with runs of
/// internal whitespace collapsed to a single space.
///
/// Accents are kept, so alias tables list accented and unaccented spellings
/// side by side.
///
/// ```
/// use fieldcheck_ingest::normalize_label;
///
/// assert_eq!(normalize_label("  Hora   de\tLlegada "), "hora de llegada");
/// assert_eq!(normalize_label("LÍNEA"), "línea");
/// ```
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Immutable mapping from normalized label to canonical field key.
///
/// Every alias is normalized once when the table is built; lookups normalize
/// the incoming label the same way.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: AHashMap<String, String>,
}

impl AliasTable {
    /// Build a table from `(alias, key)` pairs.
    ///
    /// Fails if two aliases normalize to the same label but point at
    /// different keys, or if an alias normalizes to nothing.
    pub fn build<'a, I>(pairs: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entries: AHashMap<String, String> = AHashMap::new();

        for (alias, key) in pairs {
            let label = normalize_label(alias);
            if label.is_empty() {
                return Err(SchemaError::EmptyAlias {
                    key: key.to_string(),
                });
            }
            match entries.get(&label) {
                Some(existing) if existing != key => {
                    return Err(SchemaError::ConflictingAlias {
                        alias: label,
                        first: existing.clone(),
                        second: key.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    entries.insert(label, key.to_string());
                }
            }
        }

        Ok(Self { entries })
    }

    /// Look up a raw label
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.entries.get(&normalize_label(label)).map(String::as_str)
    }

    /// Look up the displayed text of a cell; blank cells never match
    pub fn lookup_cell(&self, cell: &CellValue) -> Option<&str> {
        if cell.is_blank() {
            return None;
        }
        self.lookup(&cell.to_string())
    }

    /// Number of distinct normalized aliases
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no aliases
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
