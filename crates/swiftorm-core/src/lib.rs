//! Core types for SwiftORM.
//!
//! `swiftorm-core` is the **foundation layer** of the workspace. It defines the
//! data types and the driver contract that every other crate builds on.
//!
//! # Role In The Architecture
//!
//! - **Declaration**: [`FieldInfo`], [`ForeignKeyInfo`] and [`SchemaBuilder`]
//!   describe an entity type; [`SchemaRegistry`] validates and records it.
//! - **Records**: [`Entity`] holds one row's values, enforces the
//!   declared-columns-only assignment rule and aggregates field validation.
//! - **Data model**: [`Row`] and [`Value`] are exchanged with the driver and
//!   shared by the query, schema and engine crates.
//! - **Driver contract**: [`Driver`] is implemented by the wire-level client.
//! - **Structured concurrency**: re-exports `Cx` and `Outcome` from asupersync so
//!   every async database operation is cancel-correct.
//!
//! Most applications should use the `swiftorm` facade; reach for
//! `swiftorm-core` directly when writing drivers.

pub use asupersync::{Cx, Outcome};

pub mod connection;
pub mod entity;
pub mod error;
pub mod field;
pub mod identifiers;
pub mod row;
pub mod schema;
pub mod value;

pub use connection::Driver;
pub use entity::Entity;
pub use error::{
    ConnectionError, ConnectionErrorKind, Error, FieldValidationError, IntegrityError,
    IntegrityErrorKind, QueryError, QueryErrorKind, Result, ValidationError, ValidationErrorKind,
};
pub use field::{FieldInfo, FieldKind, ForeignKeyInfo, ReferentialAction};
pub use identifiers::{is_valid_identifier, quote_ident};
pub use row::{ColumnInfo, Row};
pub use schema::{Column, Schema, SchemaBuilder, SchemaRegistry};
pub use value::Value;
