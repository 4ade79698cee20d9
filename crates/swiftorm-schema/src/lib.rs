//! Schema DDL for SwiftORM.
//!
//! `swiftorm-schema` turns registered [`Schema`](swiftorm_core::Schema)
//! metadata into `CREATE TABLE IF NOT EXISTS` statements: typed columns with
//! PRIMARY KEY / NOT NULL / UNIQUE constraints and table-level foreign keys
//! carrying their ON DELETE action.

pub mod ddl;

pub use ddl::{DdlGenerator, PostgresDdlGenerator, foreign_key_constraint_name};
