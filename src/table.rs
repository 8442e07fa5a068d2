//! Minimal string table used as the model's input/output contract.

use crate::error::{Result, SegmentError};

/// Column-named table of string cells. Missing values are stored as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; it must have one cell per column.
    pub fn push_row<I, S>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(SegmentError::ModelInference(format!(
                "row has {} cells but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Returns a copy of the table with `values` appended as a new column.
    /// An existing column of the same name is replaced.
    pub fn with_column<I, S>(&self, name: &str, values: I) -> Result<Table>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != self.rows.len() {
            return Err(SegmentError::ModelInference(format!(
                "column '{name}' has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }

        let mut out = self.clone();
        match out.column_index(name) {
            Some(idx) => {
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                out.columns.push(name.to_string());
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rows() -> Table {
        let mut table = Table::new(["age", "gender"]);
        table.push_row(["18-24", "Kobieta"]).unwrap();
        table.push_row(["25-34", ""]).unwrap();
        table
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut table = Table::new(["age", "gender"]);
        assert!(table.push_row(["18-24"]).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn with_column_appends_without_touching_the_source() {
        let table = two_rows();
        let labeled = table.with_column("Cluster", ["Cluster 0", "Cluster 1"]).unwrap();

        assert_eq!(table.columns().len(), 2);
        assert_eq!(labeled.columns().len(), 3);
        assert_eq!(labeled.cell(1, "Cluster"), Some("Cluster 1"));
        assert_eq!(labeled.cell(1, "gender"), Some(""));
    }

    #[test]
    fn with_column_replaces_existing_column() {
        let table = two_rows().with_column("Cluster", ["a", "b"]).unwrap();
        let relabeled = table.with_column("Cluster", ["c", "d"]).unwrap();
        assert_eq!(relabeled.columns().len(), 3);
        assert_eq!(relabeled.column("Cluster").unwrap().collect::<Vec<_>>(), ["c", "d"]);
    }

    #[test]
    fn with_column_checks_length() {
        assert!(two_rows().with_column("Cluster", ["only one"]).is_err());
    }
}
