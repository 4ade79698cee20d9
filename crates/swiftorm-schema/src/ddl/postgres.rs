//! PostgreSQL DDL generator.

use swiftorm_core::{FieldInfo, Schema, quote_ident};

use super::{DdlGenerator, base_type, column_constraints, foreign_key_constraint_name};

/// DDL generator for PostgreSQL.
pub struct PostgresDdlGenerator;

impl DdlGenerator for PostgresDdlGenerator {
    fn column_type(&self, field: &FieldInfo) -> String {
        if field.is_auto_increment() {
            "SERIAL".to_string()
        } else {
            base_type(field.kind, field.max_length)
        }
    }

    fn create_table(&self, schema: &Schema) -> String {
        tracing::debug!(
            dialect = "postgres",
            table = schema.table_name(),
            "Generating CREATE TABLE"
        );

        let mut defs: Vec<String> = Vec::new();

        for field in schema.fields() {
            let mut def = format!("{} {}", quote_ident(&field.name), self.column_type(field));
            for constraint in column_constraints(field.primary_key, field.required, field.unique) {
                def.push(' ');
                def.push_str(constraint);
            }
            defs.push(def);
        }

        for fk in schema.foreign_keys() {
            let related_pk = fk.related.primary_key_field();
            let mut def = format!(
                "{} {}",
                quote_ident(&fk.column_name()),
                base_type(related_pk.kind, related_pk.max_length)
            );
            for constraint in column_constraints(false, fk.required, false) {
                def.push(' ');
                def.push_str(constraint);
            }
            defs.push(def);
        }

        for fk in schema.foreign_keys() {
            defs.push(format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
                foreign_key_constraint_name(
                    schema.table_name(),
                    &fk.name,
                    fk.related.table_name()
                ),
                quote_ident(&fk.column_name()),
                quote_ident(fk.related.table_name()),
                quote_ident(fk.related.primary_key()),
                fk.on_delete.as_sql()
            ));
        }

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            quote_ident(schema.table_name()),
            defs.join(", ")
        );
        tracing::trace!(sql = %sql, "Generated PostgreSQL DDL statement");
        sql
    }
}
