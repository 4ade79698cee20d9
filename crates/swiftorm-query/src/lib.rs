//! Parameterized DML for SwiftORM.
//!
//! `swiftorm-query` turns filter, ordering and value lists into PostgreSQL
//! statements with positional placeholders. It knows nothing about schemas or
//! execution; the storage engine decides which columns go in and runs the
//! result through the driver.
//!
//! - [`Filter`] / [`OrderBy`] are the WHERE and ORDER BY building blocks.
//! - [`InsertBuilder`], [`UpdateBuilder`], [`DeleteBuilder`] and
//!   [`SelectBuilder`] render `(sql, params)` pairs.

pub mod builder;
pub mod clause;

pub use builder::{DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder};
pub use clause::{Direction, Filter, OrderBy, placeholder};
