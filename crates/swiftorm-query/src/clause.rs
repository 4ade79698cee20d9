//! WHERE and ORDER BY clauses.
//!
//! Filters are equality-only and AND-joined; ordering entries are applied left
//! to right. Column names are quoted on output, values always travel as bind
//! parameters.

use std::fmt;

use swiftorm_core::{Value, quote_ident};

/// Positional placeholder for the `index`-th parameter (1-based).
pub fn placeholder(index: usize) -> String {
    format!("${index}")
}

/// An ordered set of `column = value` conditions.
///
/// Setting a column that is already present replaces its value but keeps its
/// original position, so merged filters render deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one condition.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column.into(), value.into());
        self
    }

    /// Add or replace one condition in place.
    pub fn insert(&mut self, column: String, value: Value) {
        match self.conditions.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.conditions.push((column, value)),
        }
    }

    /// Merge `other` into this filter; `other` wins on shared columns.
    pub fn merge(&mut self, other: Filter) {
        for (column, value) in other.conditions {
            self.insert(column, value);
        }
    }

    /// Value of a column's condition, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.conditions
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Iterate conditions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// True when there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render as a predicate whose placeholders start after `offset` existing
    /// parameters. Returns `None` for an empty filter.
    pub fn to_sql(&self, offset: usize) -> Option<(String, Vec<Value>)> {
        if self.conditions.is_empty() {
            return None;
        }
        let mut params = Vec::with_capacity(self.conditions.len());
        let parts: Vec<String> = self
            .conditions
            .iter()
            .map(|(column, value)| {
                params.push(value.clone());
                format!(
                    "{} = {}",
                    quote_ident(column),
                    placeholder(offset + params.len())
                )
            })
            .collect();
        Some((parts.join(" AND "), params))
    }
}

impl<K, V> FromIterator<(K, V)> for Filter
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Filter::new();
        for (k, v) in iter {
            filter.insert(k.into(), v.into());
        }
        filter
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// SQL keyword.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Column name.
    pub column: String,
    /// Sort direction.
    pub direction: Direction,
}

impl OrderBy {
    /// Ascending on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }

    /// Parse `"name"` (ascending) or `"-name"` (descending).
    pub fn parse(entry: &str) -> Self {
        match entry.strip_prefix('-') {
            Some(column) => Self::desc(column),
            None => Self::asc(entry),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", quote_ident(&self.column), self.direction.as_sql())
    }
}
