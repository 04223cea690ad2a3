//! Name-based row access helpers.
//!
//! Enabled with the `row-map` feature.

use crate::{QueryResult, Value};

/// Lightweight row view for name-based access helpers.
#[derive(Debug)]
pub struct RowRef<'a> {
    /// Column names aligned with `values`.
    pub columns: &'a [String],
    /// Row values aligned with `columns`.
    pub values: &'a [Value],
}

impl<'a> RowRef<'a> {
    /// Returns a value by case-insensitive column name.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let idx = self
            .columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))?;
        self.values.get(idx)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_i64()
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_f64()
    }

    pub fn get_text(&self, name: &str) -> Option<&'a str> {
        self.get(name)?.as_str()
    }

    pub fn get_blob(&self, name: &str) -> Option<&'a [u8]> {
        match self.get(name)? {
            Value::Blob(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }
}

impl QueryResult {
    /// Iterates rows as name-addressable views.
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.values.iter().map(|row| RowRef {
            columns: &self.columns,
            values: row,
        })
    }
}
