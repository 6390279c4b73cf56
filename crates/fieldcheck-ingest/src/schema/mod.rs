//! Per-variant form schemas
//!
//! A [`SchemaConfig`] is plain data describing one form variant: which labels
//! name which fields, how the header row is recognized, which fields make a
//! row real data and how durations are written. [`Schema::compile`] turns it
//! into the immutable lookup structures the pipeline reads.

mod builtin;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::error::{SchemaError, SchemaResult};

/// Record attributes derived by the pipeline; data fields may not reuse them
pub const RESERVED_KEYS: [&str; 4] = ["id", "row", "status", "nonCompliance"];

/// Default number of leading rows scanned for metadata
pub const DEFAULT_METADATA_SCAN_ROWS: usize = 10;

/// Declared type of a metadata value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    /// Trimmed text
    Text,
    /// Calendar date, normalized to `YYYY-MM-DD`
    Date,
    /// Whole number, 0 when unreadable
    Integer,
}

/// Declared type of a data column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Trimmed free text
    Text,
    /// Time of day, `HH:MM:SS`
    Time,
    /// Signed minutes/seconds offset
    Duration,
    /// Non-negative count
    Count,
    /// Yes/no marker
    Flag,
}

impl FieldKind {
    /// Kind name as written in schema documents
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Time => "time",
            FieldKind::Duration => "duration",
            FieldKind::Count => "count",
            FieldKind::Flag => "flag",
        }
    }
}

/// How bare numbers in a duration column are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnits {
    /// Whole numbers are seconds; decimals are fractional seconds.
    #[default]
    Seconds,
    /// Forms whose offsets were typed as `MM:SS` into cells the spreadsheet
    /// formatted as clock times. Whole numbers are minutes, decimals of one
    /// or more are fractional minutes, and day fractions are time serials
    /// whose hour and minute stand for minutes and seconds.
    ClockSerial,
}

/// One field and every label it may appear under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec<K> {
    /// Canonical key used in output
    pub key: String,
    /// Declared value type
    pub kind: K,
    /// Accepted labels (normalized on compile)
    pub aliases: Vec<String>,
}

impl<K> FieldSpec<K> {
    /// Create a field spec
    pub fn new(key: &str, kind: K, aliases: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            kind,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// How the header row is recognized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatch {
    /// Minimum number of matching cells
    pub threshold: usize,
    /// When set, only cells naming one of these fields count toward the
    /// threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<Vec<String>>,
}

/// A form-level total filled from the records when the form omits it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalRule {
    /// Metadata key receiving the total
    pub metadata_key: String,
    /// Count field summed across records
    pub data_key: String,
}

/// Serializable description of one form variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Variant name
    pub name: String,
    /// Label/value pairs expected above the table
    pub metadata_fields: Vec<FieldSpec<MetadataKind>>,
    /// Columns of the table
    pub data_fields: Vec<FieldSpec<FieldKind>>,
    /// Header recognition rule
    pub header_match: HeaderMatch,
    /// A row is kept when any of these fields is non-empty
    pub identifying_fields: Vec<String>,
    /// Reading of bare numbers in duration columns
    #[serde(default)]
    pub duration_units: DurationUnits,
    /// Duration field feeding the timeliness status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_field: Option<String>,
    /// Free-text fields searched for report mentions
    #[serde(default)]
    pub observation_fields: Vec<String>,
    /// Flag field explicitly marking non-compliance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_non_compliance_field: Option<String>,
    /// Totals derived from the records
    #[serde(default)]
    pub totals: Vec<TotalRule>,
    /// Number of leading rows scanned for metadata
    #[serde(default = "default_metadata_scan_rows")]
    pub metadata_scan_rows: usize,
}

fn default_metadata_scan_rows() -> usize {
    DEFAULT_METADATA_SCAN_ROWS
}

/// A validated, compiled schema.
///
/// Cheap to share: the pipeline only ever reads from it, so one instance
/// may serve any number of concurrent parses.
#[derive(Debug, Clone)]
pub struct Schema {
    config: SchemaConfig,
    metadata_aliases: AliasTable,
    data_aliases: AliasTable,
    metadata_kinds: AHashMap<String, MetadataKind>,
    data_kinds: AHashMap<String, FieldKind>,
    critical: Option<AHashSet<String>>,
}

impl Schema {
    /// Validate a configuration and build its lookup tables
    pub fn compile(config: SchemaConfig) -> SchemaResult<Self> {
        let metadata_kinds = collect_kinds(&config.metadata_fields)?;
        let data_kinds = collect_kinds(&config.data_fields)?;

        if let Some(key) = data_kinds.keys().find(|k| RESERVED_KEYS.contains(&k.as_str())) {
            return Err(SchemaError::ReservedKey(key.clone()));
        }

        let metadata_aliases = AliasTable::build(alias_pairs(&config.metadata_fields))?;
        let data_aliases = AliasTable::build(alias_pairs(&config.data_fields))?;

        let data_kind = |role: &'static str, key: &str| {
            data_kinds.get(key).copied().ok_or_else(|| SchemaError::UnknownField {
                role,
                key: key.to_string(),
            })
        };
        let expect_kind = |role: &'static str, key: &str, allowed: &[FieldKind]| {
            let kind = data_kind(role, key)?;
            if allowed.contains(&kind) {
                Ok(())
            } else {
                Err(SchemaError::WrongKind {
                    role,
                    key: key.to_string(),
                    expected: allowed
                        .first()
                        .map(FieldKind::as_str)
                        .unwrap_or("text"),
                })
            }
        };

        if config.identifying_fields.is_empty() {
            return Err(SchemaError::NoIdentifyingFields);
        }
        for key in &config.identifying_fields {
            expect_kind("Identifying field", key, &[FieldKind::Text, FieldKind::Time])?;
        }
        for key in &config.observation_fields {
            expect_kind("Observation field", key, &[FieldKind::Text])?;
        }
        if let Some(key) = &config.duration_field {
            expect_kind("Duration field", key, &[FieldKind::Duration])?;
        }
        if let Some(key) = &config.explicit_non_compliance_field {
            expect_kind("Non-compliance field", key, &[FieldKind::Flag])?;
        }
        for rule in &config.totals {
            expect_kind("Total", &rule.data_key, &[FieldKind::Count])?;
            if let Some(kind) = metadata_kinds.get(&rule.metadata_key) {
                if *kind != MetadataKind::Integer {
                    return Err(SchemaError::WrongKind {
                        role: "Total",
                        key: rule.metadata_key.clone(),
                        expected: "integer",
                    });
                }
            }
        }

        let critical = match &config.header_match.critical {
            Some(keys) => {
                for key in keys {
                    data_kind("Critical header field", key)?;
                }
                Some(keys.iter().cloned().collect::<AHashSet<_>>())
            }
            None => None,
        };

        let available = critical
            .as_ref()
            .map_or(config.data_fields.len(), |c| c.len());
        let threshold = config.header_match.threshold;
        if threshold == 0 || threshold > available {
            return Err(SchemaError::InvalidThreshold {
                threshold,
                available,
            });
        }

        Ok(Self {
            config,
            metadata_aliases,
            data_aliases,
            metadata_kinds,
            data_kinds,
            critical,
        })
    }

    /// Parse and compile a JSON schema document
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let config: SchemaConfig = serde_json::from_str(json)?;
        Self::compile(config)
    }

    /// The configuration this schema was compiled from
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Variant name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Metadata label lookup
    pub fn metadata_aliases(&self) -> &AliasTable {
        &self.metadata_aliases
    }

    /// Data column label lookup
    pub fn data_aliases(&self) -> &AliasTable {
        &self.data_aliases
    }

    /// Declared kind of a metadata key
    pub fn metadata_kind(&self, key: &str) -> Option<MetadataKind> {
        self.metadata_kinds.get(key).copied()
    }

    /// Declared kind of a data key
    pub fn field_kind(&self, key: &str) -> Option<FieldKind> {
        self.data_kinds.get(key).copied()
    }

    /// Data fields in declaration order
    pub fn data_fields(&self) -> &[FieldSpec<FieldKind>] {
        &self.config.data_fields
    }

    /// Minimum number of matching header cells
    pub fn header_threshold(&self) -> usize {
        self.config.header_match.threshold
    }

    /// Whether a field counts toward the header threshold
    pub fn counts_toward_header(&self, key: &str) -> bool {
        self.critical.as_ref().map_or(true, |c| c.contains(key))
    }

    /// Column labels the header locator looks for, in declaration order
    pub fn expected_header_labels(&self) -> Vec<String> {
        let mut seen = AHashSet::new();
        self.config
            .data_fields
            .iter()
            .filter(|f| self.counts_toward_header(&f.key))
            .flat_map(|f| f.aliases.iter())
            .filter(|a| seen.insert(a.as_str()))
            .cloned()
            .collect()
    }

    /// Fields that make a row real data
    pub fn identifying_fields(&self) -> &[String] {
        &self.config.identifying_fields
    }

    /// Reading of bare numbers in duration columns
    pub fn duration_units(&self) -> DurationUnits {
        self.config.duration_units
    }

    /// Duration field feeding the timeliness status
    pub fn duration_field(&self) -> Option<&str> {
        self.config.duration_field.as_deref()
    }

    /// Free-text fields searched for report mentions
    pub fn observation_fields(&self) -> &[String] {
        &self.config.observation_fields
    }

    /// Flag field explicitly marking non-compliance
    pub fn explicit_non_compliance_field(&self) -> Option<&str> {
        self.config.explicit_non_compliance_field.as_deref()
    }

    /// Totals derived from the records
    pub fn totals(&self) -> &[TotalRule] {
        &self.config.totals
    }

    /// Number of leading rows scanned for metadata
    pub fn metadata_scan_rows(&self) -> usize {
        self.config.metadata_scan_rows
    }
}

fn collect_kinds<K: Copy>(fields: &[FieldSpec<K>]) -> SchemaResult<AHashMap<String, K>> {
    let mut kinds = AHashMap::with_capacity(fields.len());
    for field in fields {
        if kinds.insert(field.key.clone(), field.kind).is_some() {
            return Err(SchemaError::DuplicateField(field.key.clone()));
        }
    }
    Ok(kinds)
}

fn alias_pairs<K>(fields: &[FieldSpec<K>]) -> impl Iterator<Item = (&str, &str)> {
    fields
        .iter()
        .flat_map(|f| f.aliases.iter().map(move |a| (a.as_str(), f.key.as_str())))
}
