//! Form-level label/value pairs above the table

use fieldcheck_core::RawGrid;

use crate::coerce::coerce_metadata;
use crate::record::MetadataMap;
use crate::schema::Schema;

/// Scan the leading rows for `label | value` pairs.
///
/// Only the first `schema.metadata_scan_rows()` rows are read. Cell 0 is the
/// label and cell 1 the value; a label must match a metadata alias and the
/// value must be non-blank. The first match for a key wins. Dates that
/// cannot be read are skipped so a later row may still supply them.
///
/// A blank value leaves its key unset, so a blank total on the form is
/// later filled from the records instead of being kept as empty.
pub fn extract_metadata(grid: &RawGrid, schema: &Schema) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    let limit = schema.metadata_scan_rows().min(grid.len());

    for (index, row) in grid.rows()[..limit].iter().enumerate() {
        let [label, value, ..] = row.as_slice() else {
            continue;
        };
        let Some(key) = schema.metadata_aliases().lookup_cell(label) else {
            continue;
        };
        if metadata.contains_key(key) || value.is_blank() {
            continue;
        }
        let Some(kind) = schema.metadata_kind(key) else {
            continue;
        };

        match coerce_metadata(value, kind, grid.date_1904()) {
            Some(coerced) => {
                log::debug!("metadata '{}' found on row {}", key, index + 1);
                metadata.insert(key.to_string(), coerced);
            }
            None => log::debug!("unreadable '{}' on row {}: '{}'", key, index + 1, value),
        }
    }

    metadata
}
