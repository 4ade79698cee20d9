//! SwiftORM: an async object-relational mapper for PostgreSQL.
//!
//! Schemas are declared once with [`SchemaBuilder`] and registered with a
//! [`SchemaRegistry`]. A [`Database`] context object wraps the storage engine
//! and is passed to every operation:
//!
//! - `db.create_all_tables(cx)` creates a table per registered schema.
//! - `db.objects(&schema)` returns a [`QuerySet`] with chainable `filter`,
//!   `order_by` and `limit`, and terminal `all`, `first`, `get` and `create`.
//! - `db.save(cx, &mut entity)` inserts or updates; `db.delete(cx, &entity)`
//!   removes the row.
//!
//! Every storage operation takes a [`Cx`] and returns an [`Outcome`]; domain
//! failures are [`Error`] variants (validation, integrity, not found, ...).
//!
//! # Example
//!
//! ```rust,ignore
//! use swiftorm::prelude::*;
//!
//! let registry = SchemaRegistry::global();
//! let author = registry.register(
//!     SchemaBuilder::new("Author")
//!         .field(FieldInfo::integer("id").primary_key(true))
//!         .field(FieldInfo::text("name").required(true).max_length(100)),
//! )?;
//!
//! let db = Database::new(driver);
//! db.connect(&cx).await;
//! db.create_all_tables(&cx).await;
//! let barad = db.objects(&author).create(&cx, [("name", "Barad")]).await;
//! ```

pub mod config;
pub mod database;
pub mod queryset;

pub use config::{DatabaseConfig, Settings};
pub use database::Database;
pub use queryset::QuerySet;

pub use swiftorm_core::{
    Column, Cx, Driver, Entity, Error, FieldInfo, FieldKind, ForeignKeyInfo, IntegrityError,
    IntegrityErrorKind, Outcome, QueryError, QueryErrorKind, ReferentialAction, Result, Row,
    Schema, SchemaBuilder, SchemaRegistry, ValidationError, ValidationErrorKind, Value,
};
pub use swiftorm_postgres::PgEngine;
pub use swiftorm_query::{Filter, OrderBy};
pub use swiftorm_schema::{DdlGenerator, PostgresDdlGenerator};

/// Everything needed to declare schemas and run queries.
pub mod prelude {
    pub use crate::config::{DatabaseConfig, Settings};
    pub use crate::database::Database;
    pub use crate::queryset::QuerySet;
    pub use swiftorm_core::{
        Cx, Driver, Entity, Error, FieldInfo, ForeignKeyInfo, Outcome, ReferentialAction, Result,
        Row, Schema, SchemaBuilder, SchemaRegistry, Value,
    };
}
