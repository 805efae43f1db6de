use std::collections::BTreeSet;

use tracing::{debug, info};

use super::{remote_key_set, remove_keys};
use crate::config::{SyncConfig, UNSYNC_TRUE};
use crate::error::Error;
use crate::remote::RemoteTable;
use crate::services::pack::LanguagePack;

#[derive(Debug, serde::Serialize)]
pub struct PullReport {
    pub removed_keys: Vec<String>,
    pub updated_cells: usize,
    pub skipped_rows: usize,
}

/// Remote-to-local sync: drops remote rows whose key no longer exists
/// locally, then pulls remotely edited translations into the store.
pub fn run<T: RemoteTable>(
    table: &mut T,
    pack: &mut LanguagePack,
    cfg: &SyncConfig,
) -> Result<PullReport, Error> {
    let local: BTreeSet<String> = pack.key_list().iter().cloned().collect();
    let remote = remote_key_set(&table.records()?, &cfg.id_field);

    let stale: Vec<String> = remote.difference(&local).cloned().collect();
    let removed_keys = remove_keys(table, &stale)?;

    let mut updated_cells = 0usize;
    let mut skipped_rows = 0usize;

    // Re-read after the deletions so dropped keys cannot be pulled back in.
    for record in table.records()? {
        let key = record.get(&cfg.id_field).map(String::as_str).unwrap_or("");
        if key.is_empty() {
            skipped_rows += 1;
            continue;
        }

        if record.get(&cfg.unsync_field).map(String::as_str) == Some(UNSYNC_TRUE) {
            debug!(key, "row flagged unsync, skipping");
            skipped_rows += 1;
            continue;
        }

        for (field, value) in &record {
            if pack.languages().contains(field) {
                pack.set(field, key, value);
                updated_cells += 1;
            }
        }
    }

    pack.save()?;
    info!(
        removed = removed_keys.len(),
        updated_cells, skipped_rows, "pull complete"
    );

    Ok(PullReport {
        removed_keys,
        updated_cells,
        skipped_rows,
    })
}
