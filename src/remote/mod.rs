pub mod sheets;

#[cfg(test)]
pub mod testing;

use std::collections::BTreeMap;

/// One table row, keyed by the header-row column names.
pub type Record = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("credential error: {0}")]
    Credential(String),

    #[error("unexpected response from remote table: {0}")]
    Protocol(String),
}

/// Contract over a row/column tabular remote resource. Rows and columns
/// are 1-based, matching spreadsheet addressing. Lookups that find nothing
/// return `Ok(None)`; only transport or protocol failures are errors.
pub trait RemoteTable {
    /// Values of one row, left to right, trailing empties trimmed.
    fn row_values(&self, row: usize) -> Result<Vec<String>, RemoteError>;

    /// Values of one column, top to bottom, trailing empties trimmed.
    fn col_values(&self, col: usize) -> Result<Vec<String>, RemoteError>;

    /// Every data row as a record keyed by the header row. Row `i` of the
    /// result sits at table row `i + 2`.
    fn records(&self) -> Result<Vec<Record>, RemoteError>;

    /// Column index of the first cell in `row` equal to `needle`.
    fn find_in_row(&self, row: usize, needle: &str) -> Result<Option<usize>, RemoteError>;

    /// Row index of the first cell in `col` equal to `needle`.
    fn find_in_col(&self, col: usize, needle: &str) -> Result<Option<usize>, RemoteError>;

    /// Appends one row after the last non-empty row.
    fn append_row(&mut self, row: Vec<String>) -> Result<(), RemoteError>;

    /// Deletes the given rows. Positions refer to the table as it is at
    /// call time; implementations apply them highest-first so earlier
    /// deletions cannot shift later ones.
    fn delete_rows(&mut self, rows: &[usize]) -> Result<(), RemoteError>;

    /// Writes a rectangular block of literal values with its top-left
    /// corner at (`row`, `col`).
    fn update_range(
        &mut self,
        row: usize,
        col: usize,
        values: Vec<Vec<String>>,
    ) -> Result<(), RemoteError>;
}

/// 1-based column index to spreadsheet letters (1 -> A, 27 -> AA).
pub fn col_letters(mut col: usize) -> String {
    let mut out = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        out.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// A1 range for a block of `rows` x `cols` cells anchored at (row, col).
pub fn a1_range(row: usize, col: usize, rows: usize, cols: usize) -> String {
    format!(
        "{}{}:{}{}",
        col_letters(col),
        row,
        col_letters(col + cols.saturating_sub(1)),
        row + rows.saturating_sub(1),
    )
}
