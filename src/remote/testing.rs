use super::{Record, RemoteError, RemoteTable};
use crate::remote::sheets::records_from_grid;

/// In-memory `RemoteTable` used by the driver tests. Row 1 is the header.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub grid: Vec<Vec<String>>,
}

impl MemoryTable {
    pub fn new(rows: &[&[&str]]) -> Self {
        let grid = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        MemoryTable { grid }
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.grid
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn key_column(&self, id_col: usize) -> Vec<String> {
        self.grid
            .iter()
            .skip(1)
            .map(|row| row.get(id_col - 1).cloned().unwrap_or_default())
            .collect()
    }
}

impl RemoteTable for MemoryTable {
    fn row_values(&self, row: usize) -> Result<Vec<String>, RemoteError> {
        Ok(self.grid.get(row - 1).cloned().unwrap_or_default())
    }

    fn col_values(&self, col: usize) -> Result<Vec<String>, RemoteError> {
        let mut values: Vec<String> = self
            .grid
            .iter()
            .map(|row| row.get(col - 1).cloned().unwrap_or_default())
            .collect();
        while values.last().is_some_and(String::is_empty) {
            values.pop();
        }
        Ok(values)
    }

    fn records(&self) -> Result<Vec<Record>, RemoteError> {
        Ok(records_from_grid(&self.grid))
    }

    fn find_in_row(&self, row: usize, needle: &str) -> Result<Option<usize>, RemoteError> {
        let values = self.row_values(row)?;
        Ok(values.iter().position(|v| v == needle).map(|i| i + 1))
    }

    fn find_in_col(&self, col: usize, needle: &str) -> Result<Option<usize>, RemoteError> {
        let values: Vec<String> = self
            .grid
            .iter()
            .map(|row| row.get(col - 1).cloned().unwrap_or_default())
            .collect();
        Ok(values.iter().position(|v| v == needle).map(|i| i + 1))
    }

    fn append_row(&mut self, row: Vec<String>) -> Result<(), RemoteError> {
        self.grid.push(row);
        Ok(())
    }

    fn delete_rows(&mut self, rows: &[usize]) -> Result<(), RemoteError> {
        let mut ordered: Vec<usize> = rows.to_vec();
        ordered.sort_unstable();
        ordered.dedup();
        for &row in ordered.iter().rev() {
            if row >= 1 && row <= self.grid.len() {
                self.grid.remove(row - 1);
            }
        }
        Ok(())
    }

    fn update_range(
        &mut self,
        row: usize,
        col: usize,
        values: Vec<Vec<String>>,
    ) -> Result<(), RemoteError> {
        for (dr, value_row) in values.into_iter().enumerate() {
            let r = row - 1 + dr;
            if self.grid.len() <= r {
                self.grid.resize(r + 1, Vec::new());
            }
            let target = &mut self.grid[r];
            for (dc, value) in value_row.into_iter().enumerate() {
                let c = col - 1 + dc;
                if target.len() <= c {
                    target.resize(c + 1, String::new());
                }
                target[c] = value;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_rows_applies_highest_first() {
        let mut table = MemoryTable::new(&[
            &["k"],
            &["one"],
            &["two"],
            &["three"],
        ]);
        table.delete_rows(&[2, 4]).expect("delete");
        assert_eq!(table.key_column(1), vec!["two"]);
    }

    #[test]
    fn update_range_grows_the_grid_as_needed() {
        let mut table = MemoryTable::new(&[&["k", "en"]]);
        table
            .update_range(2, 2, vec![vec!["hello".to_string(), "extra".to_string()]])
            .expect("update");
        assert_eq!(table.cell(2, 2), "hello");
        assert_eq!(table.cell(2, 3), "extra");
    }
}
