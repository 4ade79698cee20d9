//! The PostgreSQL storage engine.
//!
//! [`PgEngine`] owns one [`Driver`] connection and turns schema metadata and
//! entity values into DDL and parameterized DML. It writes generated primary
//! keys back onto inserted entities and reclassifies driver failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use asupersync::{Cx, Outcome};
use swiftorm_core::{Driver, Entity, Error, QueryError, QueryErrorKind, Row, Schema, Value};
use swiftorm_query::{DeleteBuilder, Filter, InsertBuilder, OrderBy, SelectBuilder, UpdateBuilder};
use swiftorm_schema::{DdlGenerator, PostgresDdlGenerator};

use crate::error::translate_driver_error;

/// Storage engine over a single driver connection.
///
/// Statements are issued one at a time; callers sharing an engine serialize
/// their operations.
pub struct PgEngine<D: Driver> {
    driver: D,
    connected: AtomicBool,
}

impl<D: Driver> std::fmt::Debug for PgEngine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgEngine")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl<D: Driver> PgEngine<D> {
    /// Wrap a driver. The engine starts disconnected.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            connected: AtomicBool::new(false),
        }
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Whether `connect` has succeeded and `disconnect` has not been called.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Open the driver connection. Calling it again while connected is a no-op.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn connect(&self, cx: &Cx) -> Outcome<(), Error> {
        if self.is_connected() {
            return Outcome::Ok(());
        }
        match self.driver.connect(cx).await {
            Outcome::Ok(()) => {
                self.connected.store(true, Ordering::Release);
                tracing::info!("Connected to PostgreSQL");
                Outcome::Ok(())
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Close the driver connection. Calling it while disconnected is a no-op.
    ///
    /// The engine stays connected when the driver fails to close.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn disconnect(&self, cx: &Cx) -> Outcome<(), Error> {
        if !self.is_connected() {
            return Outcome::Ok(());
        }
        match self.driver.close(cx).await {
            Outcome::Ok(()) => {
                self.connected.store(false, Ordering::Release);
                tracing::info!("Disconnected from PostgreSQL");
                Outcome::Ok(())
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` for one concrete schema.
    #[tracing::instrument(level = "debug", skip(self, cx, schema), fields(table = schema.table_name()))]
    pub async fn create_table(&self, cx: &Cx, schema: &Schema) -> Outcome<(), Error> {
        if let Err(e) = ensure_concrete(schema) {
            return Outcome::Err(e);
        }
        let sql = PostgresDdlGenerator.create_table(schema);
        match self.run(cx, &sql, &[]).await {
            Outcome::Ok(_) => {
                tracing::info!(table = schema.table_name(), "Created table");
                Outcome::Ok(())
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Create the tables of every concrete schema in order, stopping at the
    /// first failure. Abstract schemas are skipped.
    pub async fn create_all(&self, cx: &Cx, schemas: &[Arc<Schema>]) -> Outcome<(), Error> {
        let statements = PostgresDdlGenerator.create_all(schemas);
        tracing::debug!(count = statements.len(), "Running CREATE TABLE statements");
        for sql in &statements {
            match self.run(cx, sql, &[]).await {
                Outcome::Ok(_) => {}
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        }
        Outcome::Ok(())
    }

    /// INSERT every non-null column of `entity`.
    ///
    /// For a generated integer primary key the statement asks for the key
    /// back and writes it onto the entity.
    #[tracing::instrument(level = "debug", skip(self, cx, entity), fields(model = entity.schema().name()))]
    pub async fn insert(&self, cx: &Cx, entity: &mut Entity) -> Outcome<(), Error> {
        let schema = Arc::clone(entity.schema());
        if let Err(e) = ensure_concrete(&schema) {
            return Outcome::Err(e);
        }
        let pk = schema.primary_key_field();

        let values = entity
            .column_values()
            .into_iter()
            .filter(|(_, v)| !v.is_null());
        let mut builder = InsertBuilder::new(schema.table_name()).values(values);
        if pk.is_auto_increment() {
            builder = builder.returning(&pk.name);
        }
        let (sql, params) = builder.build();

        let rows = match self.run_dml(cx, &sql, &params).await {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        if pk.is_auto_increment() {
            let generated = rows
                .first()
                .and_then(|row| row.get_named(&pk.name).or_else(|| row.get(0)))
                .filter(|v| !v.is_null())
                .cloned();
            let Some(id) = generated else {
                return Outcome::Err(Error::Query(
                    QueryError::new(
                        QueryErrorKind::Database,
                        format!("INSERT into {} did not return a primary key", schema.table_name()),
                    )
                    .with_sql(sql),
                ));
            };
            tracing::debug!(table = schema.table_name(), id = %id, "Generated primary key");
            entity.set_primary_key(id);
        }
        Outcome::Ok(())
    }

    /// UPDATE every non-primary-key column, keyed by the current primary key.
    ///
    /// A schema with no other columns sends nothing.
    #[tracing::instrument(level = "debug", skip(self, cx, entity), fields(model = entity.schema().name()))]
    pub async fn update(&self, cx: &Cx, entity: &Entity) -> Outcome<(), Error> {
        let schema = entity.schema();
        if let Err(e) = ensure_concrete(schema) {
            return Outcome::Err(e);
        }
        let pk_name = schema.primary_key();
        let pk_value = entity.primary_key_value();
        if pk_value.is_null() {
            return Outcome::Err(Error::Custom(format!(
                "cannot update {} without a primary key value",
                schema.name()
            )));
        }

        let builder = entity
            .column_values()
            .into_iter()
            .filter(|(name, _)| name != pk_name)
            .fold(UpdateBuilder::new(schema.table_name()), |b, (name, value)| {
                b.set(name, value)
            });
        if builder.is_empty() {
            tracing::debug!(table = schema.table_name(), "No columns to update");
            return Outcome::Ok(());
        }
        let (sql, params) = builder
            .filter(Filter::new().eq(pk_name, pk_value.clone()))
            .build();

        match self.run_dml(cx, &sql, &params).await {
            Outcome::Ok(_) => Outcome::Ok(()),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// DELETE the row whose primary key equals the entity's.
    #[tracing::instrument(level = "debug", skip(self, cx, entity), fields(model = entity.schema().name()))]
    pub async fn delete(&self, cx: &Cx, entity: &Entity) -> Outcome<(), Error> {
        let schema = entity.schema();
        if let Err(e) = ensure_concrete(schema) {
            return Outcome::Err(e);
        }
        let pk_value = entity.primary_key_value();
        if pk_value.is_null() {
            return Outcome::Err(Error::Custom(format!(
                "cannot delete {} without a primary key value",
                schema.name()
            )));
        }

        let (sql, params) = DeleteBuilder::new(schema.table_name())
            .filter(Filter::new().eq(schema.primary_key(), pk_value.clone()))
            .build();

        match self.run_dml(cx, &sql, &params).await {
            Outcome::Ok(_) => Outcome::Ok(()),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// SELECT every column of `schema` matching `filter`.
    #[tracing::instrument(level = "debug", skip(self, cx, schema, filter, order_by), fields(table = schema.table_name()))]
    pub async fn select(
        &self,
        cx: &Cx,
        schema: &Schema,
        filter: &Filter,
        order_by: &[OrderBy],
        limit: Option<u64>,
    ) -> Outcome<Vec<Row>, Error> {
        if let Err(e) = ensure_concrete(schema) {
            return Outcome::Err(e);
        }
        let mut builder = SelectBuilder::new(schema.table_name(), schema.column_names())
            .filter(filter.clone())
            .order_by(order_by.iter().cloned());
        if let Some(n) = limit {
            builder = builder.limit(n);
        }
        let (sql, params) = builder.build();
        self.run_dml(cx, &sql, &params).await
    }

    async fn run_dml(&self, cx: &Cx, sql: &str, params: &[Value]) -> Outcome<Vec<Row>, Error> {
        match self.run(cx, sql, params).await {
            Outcome::Err(e) => Outcome::Err(translate_driver_error(e)),
            other => other,
        }
    }

    async fn run(&self, cx: &Cx, sql: &str, params: &[Value]) -> Outcome<Vec<Row>, Error> {
        if !self.is_connected() {
            return Outcome::Err(Error::Config(
                "database is not connected; call connect() first".to_string(),
            ));
        }
        tracing::debug!(sql = %sql, "Executing statement");
        tracing::trace!(params = ?params, "Statement parameters");
        self.driver.execute(cx, sql, params).await
    }
}

/// Abstract schemas have no table; no statement may target one.
fn ensure_concrete(schema: &Schema) -> Result<(), Error> {
    if schema.is_abstract() {
        Err(Error::Config(format!(
            "{} is abstract and has no table",
            schema.name()
        )))
    } else {
        Ok(())
    }
}
