//! Tabular result sets built from accumulated records.

use crate::record::Record;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Rows over the union of all columns seen, in first-seen column order.
/// Cells absent from a row's source record are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| columns.iter().map(|c| record.get(c).cloned()).collect())
            .collect();

        Self { columns, rows }
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

    /// All cells of one column, `None` for missing cells.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&Value>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).and_then(Option::as_ref))
                .collect(),
        )
    }

    /// Copy of this table without the named columns.
    pub fn without_columns(&self, names: &[&str]) -> Table {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|i| !names.contains(&self.columns[*i].as_str()))
            .collect();
        Table {
            columns: keep.iter().map(|i| self.columns[*i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|i| row.get(*i).cloned().flatten()).collect())
                .collect(),
        }
    }

    /// Render as CSV with a header row; missing cells are empty.
    pub fn to_csv(&self) -> String {
        let mut buf = self
            .columns
            .iter()
            .map(|c| csv_escape(c))
            .collect::<Vec<_>>()
            .join(",");
        buf.push('\n');
        for row in &self.rows {
            let line = row
                .iter()
                .map(|cell| match cell {
                    Some(v) => csv_escape(&v.to_string()),
                    None => String::new(),
                })
                .collect::<Vec<_>>()
                .join(",");
            buf.push_str(&line);
            buf.push('\n');
        }
        buf
    }
}

/// Quote a field containing a comma, quote or line break, doubling embedded quotes.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
