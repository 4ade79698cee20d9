//! DDL generation.
//!
//! A [`DdlGenerator`] renders `CREATE TABLE` statements for one dialect from
//! registered schema metadata.

mod postgres;

pub use postgres::PostgresDdlGenerator;

use std::sync::Arc;

use swiftorm_core::{FieldInfo, FieldKind, Schema};

/// Renders DDL for one SQL dialect.
pub trait DdlGenerator {
    /// SQL type of a plain field.
    fn column_type(&self, field: &FieldInfo) -> String;

    /// Idempotent `CREATE TABLE` statement for one schema.
    fn create_table(&self, schema: &Schema) -> String;

    /// `CREATE TABLE` statements for every schema, in the given order.
    ///
    /// Abstract schemas are skipped.
    fn create_all(&self, schemas: &[Arc<Schema>]) -> Vec<String> {
        schemas
            .iter()
            .filter(|s| !s.is_abstract())
            .map(|s| self.create_table(s))
            .collect()
    }
}

/// Name of the table-level foreign key constraint for `field` of `table`.
pub fn foreign_key_constraint_name(table: &str, field: &str, related_table: &str) -> String {
    format!("fk_{table}_{field}_to_{related_table}")
}

/// Column constraints in their rendered order: PRIMARY KEY, NOT NULL, UNIQUE.
pub(crate) fn column_constraints(primary_key: bool, not_null: bool, unique: bool) -> Vec<&'static str> {
    let mut constraints = Vec::new();
    if primary_key {
        constraints.push("PRIMARY KEY");
    }
    if not_null {
        constraints.push("NOT NULL");
    }
    if unique {
        constraints.push("UNIQUE");
    }
    constraints
}

/// SQL type for a kind, without auto-increment substitution.
pub(crate) fn base_type(kind: FieldKind, max_length: Option<usize>) -> String {
    match kind {
        FieldKind::Integer => "INTEGER".to_string(),
        FieldKind::Text => match max_length {
            Some(n) => format!("VARCHAR({n})"),
            None => "TEXT".to_string(),
        },
        FieldKind::Boolean => "BOOLEAN".to_string(),
    }
}
