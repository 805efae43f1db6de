use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use super::{remote_key_set, remove_keys};
use crate::config::SyncConfig;
use crate::error::Error;
use crate::remote::{RemoteError, RemoteTable};
use crate::services::pack::LanguagePack;

#[derive(Debug, serde::Serialize)]
pub struct PushReport {
    pub removed_keys: Vec<String>,
    pub appended_keys: Vec<String>,
    pub updated_rows: usize,
}

/// Local-to-remote sync: reconciles the key rows, widens the header with
/// any missing language column, then overwrites every row's language cells
/// with the local values in one range update per row.
pub fn run<T: RemoteTable>(
    table: &mut T,
    pack: &mut LanguagePack,
    cfg: &SyncConfig,
) -> Result<PushReport, Error> {
    let local: BTreeSet<String> = pack.key_list().iter().cloned().collect();
    let remote = remote_key_set(&table.records()?, &cfg.id_field);

    let obsolete: Vec<String> = remote.difference(&local).cloned().collect();
    let removed_keys = remove_keys(table, &obsolete)?;

    let appended_keys: Vec<String> = local.difference(&remote).cloned().collect();
    for key in &appended_keys {
        // New rows start with the identifier only; translations follow below.
        table.append_row(vec![key.clone()])?;
    }
    if !appended_keys.is_empty() {
        info!(count = appended_keys.len(), keys = ?appended_keys, "appended remote rows");
    }

    ensure_language_columns(table, pack.languages())?;

    let header = table.row_values(1)?;
    let lang_by_col = language_columns(&header, pack.languages());

    let (Some(&first_col), Some(&last_col)) =
        (lang_by_col.keys().next(), lang_by_col.keys().last())
    else {
        // No language columns means nothing to write.
        return Ok(PushReport {
            removed_keys,
            appended_keys,
            updated_rows: 0,
        });
    };

    // Fresh read after the structural changes above. Each row's key comes
    // from the record itself, never from its pre-deletion position.
    let records = table.records()?;
    let mut updated_rows = 0usize;

    for (i, record) in records.iter().enumerate() {
        let row = i + 2;
        let key = record.get(&cfg.id_field).map(String::as_str).unwrap_or("");
        if key.is_empty() {
            continue;
        }

        let mut values = Vec::with_capacity(last_col - first_col + 1);
        for col in first_col..=last_col {
            match lang_by_col.get(&col) {
                Some(lang) => {
                    values.push(pack.get(lang, key).unwrap_or("").to_string());
                }
                None => {
                    // Non-language column inside the span keeps its value.
                    let field = header.get(col - 1).map(String::as_str).unwrap_or("");
                    values.push(record.get(field).cloned().unwrap_or_default());
                }
            }
        }

        table.update_range(row, first_col, vec![values])?;
        updated_rows += 1;
    }

    info!(
        removed = removed_keys.len(),
        appended = appended_keys.len(),
        updated_rows,
        "push complete"
    );

    Ok(PushReport {
        removed_keys,
        appended_keys,
        updated_rows,
    })
}

/// Widens the header row with any local language it does not carry yet.
fn ensure_language_columns<T: RemoteTable>(
    table: &mut T,
    languages: &[String],
) -> Result<(), RemoteError> {
    let header = table.row_values(1)?;
    let missing: Vec<String> = languages
        .iter()
        .filter(|lang| !header.contains(lang))
        .cloned()
        .collect();

    if !missing.is_empty() {
        info!(languages = ?missing, "extending header with language columns");
        table.update_range(1, header.len() + 1, vec![missing])?;
    }

    Ok(())
}

/// Column index -> language, ascending by column.
fn language_columns(header: &[String], languages: &[String]) -> BTreeMap<usize, String> {
    header
        .iter()
        .enumerate()
        .filter(|(_, name)| languages.contains(name))
        .map(|(i, name)| (i + 1, name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::remote::testing::MemoryTable;

    fn config(dir: PathBuf) -> SyncConfig {
        SyncConfig {
            sheet_url: String::new(),
            credential_path: PathBuf::new(),
            data_sheet_name: "origin".to_string(),
            sync_sheet_name: "data".to_string(),
            meta_sheet_name: "meta".to_string(),
            unsync_field: "unsync".to_string(),
            id_field: "Translation ID".to_string(),
            language_dir: dir,
        }
    }

    fn pack_with(files: &[(&str, &str)]) -> (tempfile::TempDir, LanguagePack) {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, content) in files {
            fs::write(dir.path().join(name), content).expect("write fixture");
        }
        let pack = LanguagePack::load(dir.path()).expect("load");
        (dir, pack)
    }

    #[test]
    fn reconciles_key_rows_both_ways() {
        // Remote {a.b, a.c} vs local {a.b, a.d}: drop a.c, append a.d.
        let (dir, mut pack) = pack_with(&[("en.json", r#"{"a": {"b": "hello", "d": "new"}}"#)]);
        let mut table = MemoryTable::new(&[
            &["Translation ID", "unsync", "en"],
            &["a.b", "", "stale"],
            &["a.c", "", "obsolete"],
        ]);

        let report = run(&mut table, &mut pack, &config(dir.path().to_path_buf())).expect("push");

        assert_eq!(report.removed_keys, ["a.c"]);
        assert_eq!(report.appended_keys, ["a.d"]);
        assert_eq!(table.key_column(1), ["a.b", "a.d"]);
    }

    #[test]
    fn overwrites_language_cells_from_the_store() {
        let (dir, mut pack) = pack_with(&[
            ("en.json", r#"{"a": {"b": "hello"}}"#),
            ("ko.json", r#"{"a": {"b": "annyeong"}}"#),
        ]);
        let mut table = MemoryTable::new(&[
            &["Translation ID", "unsync", "en", "ko"],
            &["a.b", "", "outdated", ""],
        ]);

        let report = run(&mut table, &mut pack, &config(dir.path().to_path_buf())).expect("push");

        assert_eq!(report.updated_rows, 1);
        assert_eq!(table.cell(2, 3), "hello");
        assert_eq!(table.cell(2, 4), "annyeong");
    }

    #[test]
    fn appended_rows_get_their_translations_filled() {
        let (dir, mut pack) = pack_with(&[("en.json", r#"{"a": {"d": "fresh"}}"#)]);
        let mut table = MemoryTable::new(&[&["Translation ID", "unsync", "en"]]);

        run(&mut table, &mut pack, &config(dir.path().to_path_buf())).expect("push");

        assert_eq!(table.cell(2, 1), "a.d");
        assert_eq!(table.cell(2, 3), "fresh");
    }

    #[test]
    fn missing_language_columns_extend_the_header() {
        let (dir, mut pack) = pack_with(&[
            ("de.json", r#"{"a": {"b": "hallo"}}"#),
            ("en.json", r#"{"a": {"b": "hello"}}"#),
        ]);
        let mut table = MemoryTable::new(&[
            &["Translation ID", "unsync", "en"],
            &["a.b", "", ""],
        ]);

        run(&mut table, &mut pack, &config(dir.path().to_path_buf())).expect("push");

        assert_eq!(table.cell(1, 4), "de");
        assert_eq!(table.cell(2, 3), "hello");
        assert_eq!(table.cell(2, 4), "hallo");
    }

    #[test]
    fn non_language_columns_inside_the_span_are_preserved() {
        let (dir, mut pack) = pack_with(&[
            ("en.json", r#"{"a": {"b": "hello"}}"#),
            ("ko.json", r#"{"a": {"b": "annyeong"}}"#),
        ]);
        let mut table = MemoryTable::new(&[
            &["Translation ID", "en", "note", "ko"],
            &["a.b", "", "reviewer comment", ""],
        ]);

        run(&mut table, &mut pack, &config(dir.path().to_path_buf())).expect("push");

        assert_eq!(table.cell(2, 2), "hello");
        assert_eq!(table.cell(2, 3), "reviewer comment");
        assert_eq!(table.cell(2, 4), "annyeong");
    }

    #[test]
    fn missing_local_translations_write_empty_cells() {
        let (dir, mut pack) = pack_with(&[
            ("en.json", r#"{"a": {"b": "hello"}}"#),
            ("ko.json", "{}"),
        ]);
        let mut table = MemoryTable::new(&[
            &["Translation ID", "unsync", "en", "ko"],
            &["a.b", "", "x", "leftover"],
        ]);

        run(&mut table, &mut pack, &config(dir.path().to_path_buf())).expect("push");

        assert_eq!(table.cell(2, 3), "hello");
        assert_eq!(table.cell(2, 4), "");
    }
}
