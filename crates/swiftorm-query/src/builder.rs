//! Query builders for INSERT, UPDATE, DELETE and SELECT.
//!
//! Every builder renders to `(sql, params)` with PostgreSQL positional
//! placeholders numbered in the order the parameters appear. Identifiers are
//! quoted; values are never inlined.

use swiftorm_core::{Value, quote_ident};

use crate::clause::{Filter, OrderBy, placeholder};

/// INSERT query builder.
///
/// # Example
///
/// ```
/// use swiftorm_query::InsertBuilder;
///
/// let (sql, params) = InsertBuilder::new("authors")
///     .value("name", "Barad")
///     .returning("id")
///     .build();
/// assert_eq!(sql, r#"INSERT INTO "authors" ("name") VALUES ($1) RETURNING "id""#);
/// assert_eq!(params.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    values: Vec<(String, Value)>,
    returning: Option<String>,
}

impl InsertBuilder {
    /// Create a new INSERT builder for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
            returning: None,
        }
    }

    /// Add one column value.
    #[must_use]
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Add column values in order.
    #[must_use]
    pub fn values<I, K>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Return `column` of the inserted row.
    #[must_use]
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning = Some(column.into());
        self
    }

    /// Build the INSERT SQL and parameters.
    ///
    /// With no values the statement uses `DEFAULT VALUES`.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut sql = if self.values.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(&self.table))
        } else {
            let columns: Vec<String> = self.values.iter().map(|(c, _)| quote_ident(c)).collect();
            let placeholders: Vec<String> = (1..=self.values.len()).map(placeholder).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(&self.table),
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        if let Some(column) = &self.returning {
            sql.push_str(" RETURNING ");
            sql.push_str(&quote_ident(column));
        }

        let params = self.values.iter().map(|(_, v)| v.clone()).collect();
        (sql, params)
    }
}

/// UPDATE query builder.
///
/// SET parameters are numbered first, then the WHERE parameters.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    sets: Vec<(String, Value)>,
    filter: Filter,
}

impl UpdateBuilder {
    /// Create a new UPDATE builder for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            sets: Vec::new(),
            filter: Filter::new(),
        }
    }

    /// Set a column to a value.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sets.push((column.into(), value.into()));
        self
    }

    /// Restrict the updated rows.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter.merge(filter);
        self
    }

    /// True when there is nothing to SET.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Build the UPDATE SQL and parameters.
    ///
    /// Returns an empty statement when there is nothing to SET.
    pub fn build(&self) -> (String, Vec<Value>) {
        if self.sets.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut params = Vec::with_capacity(self.sets.len() + self.filter.len());
        let set_clauses: Vec<String> = self
            .sets
            .iter()
            .map(|(column, value)| {
                params.push(value.clone());
                format!("{} = {}", quote_ident(column), placeholder(params.len()))
            })
            .collect();

        let mut sql = format!(
            "UPDATE {} SET {}",
            quote_ident(&self.table),
            set_clauses.join(", ")
        );
        if let Some((predicate, where_params)) = self.filter.to_sql(params.len()) {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
            params.extend(where_params);
        }
        (sql, params)
    }
}

/// DELETE query builder.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    filter: Filter,
}

impl DeleteBuilder {
    /// Create a new DELETE builder for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: Filter::new(),
        }
    }

    /// Restrict the deleted rows.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter.merge(filter);
        self
    }

    /// Build the DELETE SQL and parameters.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut sql = format!("DELETE FROM {}", quote_ident(&self.table));
        let mut params = Vec::new();
        if let Some((predicate, where_params)) = self.filter.to_sql(0) {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
            params = where_params;
        }
        (sql, params)
    }
}

/// SELECT query builder with an explicit column list.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    columns: Vec<String>,
    filter: Filter,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
}

impl SelectBuilder {
    /// Create a new SELECT builder for `columns` of `table`.
    pub fn new<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            filter: Filter::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// AND the given conditions into the WHERE clause.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter.merge(filter);
        self
    }

    /// Append ordering entries.
    #[must_use]
    pub fn order_by<I>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = OrderBy>,
    {
        self.order_by.extend(order);
        self
    }

    /// Set LIMIT.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build the SELECT SQL and parameters.
    pub fn build(&self) -> (String, Vec<Value>) {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut sql = format!("SELECT {columns} FROM {}", quote_ident(&self.table));

        let mut params = Vec::new();
        if let Some((predicate, where_params)) = self.filter.to_sql(0) {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
            params = where_params;
        }

        if !self.order_by.is_empty() {
            let order: Vec<String> = self.order_by.iter().map(ToString::to_string).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        (sql, params)
    }
}
