//! PostgreSQL storage engine for SwiftORM.
//!
//! This crate executes SwiftORM's DDL and DML against PostgreSQL through any
//! [`Driver`](swiftorm_core::Driver). It provides:
//!
//! - Connection lifecycle tracking (statements before `connect` are rejected)
//! - Idempotent table creation from registered schemas
//! - INSERT with generated-key write-back, UPDATE, DELETE and SELECT
//! - Translation of SQLSTATE-coded driver failures into integrity and
//!   validation errors

pub mod engine;
pub mod error;

pub use engine::PgEngine;
pub use error::translate_driver_error;
