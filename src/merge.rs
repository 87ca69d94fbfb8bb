use std::collections::{HashMap, HashSet};

use crate::table::Table;
use crate::{Error, FieldMap, Result, TAX_ID_COLUMN, URL_COLUMN};

/// Appended to a lookup label until it no longer collides with another column.
const COLLISION_SUFFIX: &str = "_lookup";

/// Left-joins `results` onto `table` by identifier.
///
/// Identifiers on both sides are compared trimmed. Every original row is kept
/// once and in place, with its original cells untouched; rows without a
/// matching result get empty lookup cells. If several results share an
/// identifier the first one is used.
pub fn merge_results(table: &Table, column: &str, results: &[FieldMap]) -> Result<Table> {
    let key_idx = table
        .column_index(column)
        .ok_or_else(|| Error::MissingColumn {
            column: column.to_string(),
            available: table.headers().to_vec(),
        })?;

    let mut by_identifier: HashMap<&str, &FieldMap> = HashMap::with_capacity(results.len());
    for fields in results {
        if let Some(id) = fields.identifier() {
            by_identifier.entry(id.trim()).or_insert(fields);
        }
    }

    // Union of labels in order of first appearance, provenance columns first.
    let mut labels: Vec<&str> = vec![TAX_ID_COLUMN, URL_COLUMN];
    let mut seen: HashSet<&str> = labels.iter().copied().collect();
    for label in results.iter().flat_map(FieldMap::labels) {
        if seen.insert(label) {
            labels.push(label);
        }
    }

    // The join column is shared when it already carries the lookup identifier name.
    if column == TAX_ID_COLUMN {
        labels.retain(|label| *label != TAX_ID_COLUMN);
    }

    let mut headers = table.headers().to_vec();
    let mut taken: HashSet<String> = headers.iter().cloned().collect();
    for label in &labels {
        let mut name = label.to_string();
        while taken.contains(&name) {
            name.push_str(COLLISION_SUFFIX);
        }
        taken.insert(name.clone());
        headers.push(name);
    }

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let matched = by_identifier.get(row[key_idx].trim());
            let mut out = row.clone();
            out.extend(labels.iter().map(|label| {
                matched
                    .and_then(|fields| fields.get(label))
                    .unwrap_or_default()
                    .to_string()
            }));
            out
        })
        .collect();

    Ok(Table::new(headers, rows))
}
