pub mod pull;
pub mod push;

use std::collections::BTreeSet;

use tracing::info;

use crate::remote::{Record, RemoteError, RemoteTable};

/// The identifier field always occupies the first column of the sheet.
const ID_COLUMN: usize = 1;

/// Identifier values present in the remote table. Empty identifiers are
/// template or spacer rows and never count as keys.
fn remote_key_set(records: &[Record], id_field: &str) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(|record| record.get(id_field))
        .filter(|value| !value.is_empty())
        .cloned()
        .collect()
}

/// Deletes the rows holding `keys`, best-effort: keys without a matching
/// row are skipped silently. Returns the keys actually removed.
fn remove_keys<T: RemoteTable>(table: &mut T, keys: &[String]) -> Result<Vec<String>, RemoteError> {
    let mut rows = Vec::new();
    let mut removed = Vec::new();

    for key in keys {
        if let Some(row) = table.find_in_col(ID_COLUMN, key)? {
            rows.push(row);
            removed.push(key.clone());
        }
    }

    if !rows.is_empty() {
        table.delete_rows(&rows)?;
        info!(count = rows.len(), keys = ?removed, "removed remote rows");
    }

    Ok(removed)
}
