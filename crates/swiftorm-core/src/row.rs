//! Result rows returned by the driver.

use std::sync::Arc;

use crate::value::Value;

/// Column names shared by every row of one result set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnInfo {
    names: Vec<String>,
}

impl ColumnInfo {
    /// Create column info from ordered names.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Ordered column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One row: an ordered mapping from column name to value.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<ColumnInfo>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row that shares its column info with sibling rows.
    ///
    /// Missing trailing values are padded with NULL.
    pub fn with_columns(columns: Arc<ColumnInfo>, mut values: Vec<Value>) -> Self {
        values.resize(columns.len(), Value::Null);
        Self { columns, values }
    }

    /// Create a row from `(column, value)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self {
            columns: Arc::new(ColumnInfo::new(names)),
            values,
        }
    }

    /// Value at a position.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Value of a named column.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.columns.index_of(name).and_then(|i| self.values.get(i))
    }

    /// Column names of this row.
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
