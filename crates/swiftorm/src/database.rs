//! The database context object.
//!
//! A [`Database`] bundles the storage engine with the schema registry. It is
//! created once, connected once, and passed by reference to every persistence
//! and query operation.

use std::sync::Arc;

use asupersync::{Cx, Outcome};
use swiftorm_core::{Driver, Entity, Error, Result, Schema, SchemaRegistry};
use swiftorm_postgres::PgEngine;

use crate::config::{DatabaseConfig, Settings};
use crate::queryset::QuerySet;

/// Storage engine plus the schemas it serves.
#[derive(Debug)]
pub struct Database<D: Driver> {
    engine: PgEngine<D>,
    registry: Arc<SchemaRegistry>,
}

impl<D: Driver> Database<D> {
    /// Use `driver` with the process-wide schema registry.
    pub fn new(driver: D) -> Self {
        Self::with_registry(driver, SchemaRegistry::global())
    }

    /// Use `driver` with an explicit registry.
    pub fn with_registry(driver: D, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            engine: PgEngine::new(driver),
            registry,
        }
    }

    /// Build from a config, creating the driver through `factory` once the
    /// engine name has been checked.
    pub fn from_config<F>(config: &DatabaseConfig, factory: F) -> Result<Self>
    where
        F: FnOnce(&DatabaseConfig) -> D,
    {
        config.check_engine()?;
        tracing::debug!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Configuring database"
        );
        Ok(Self::new(factory(config)))
    }

    /// Build from the `"default"` entry of `settings`.
    pub fn from_settings<F>(settings: &Settings, factory: F) -> Result<Self>
    where
        F: FnOnce(&DatabaseConfig) -> D,
    {
        tracing::debug!(apps = ?settings.installed_apps, "Loading settings");
        Self::from_config(settings.default_database()?, factory)
    }

    /// The storage engine.
    pub fn engine(&self) -> &PgEngine<D> {
        &self.engine
    }

    /// The schema registry.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Whether the connection is open.
    pub fn is_connected(&self) -> bool {
        self.engine.is_connected()
    }

    /// Open the connection.
    pub async fn connect(&self, cx: &Cx) -> Outcome<(), Error> {
        self.engine.connect(cx).await
    }

    /// Close the connection.
    pub async fn disconnect(&self, cx: &Cx) -> Outcome<(), Error> {
        self.engine.disconnect(cx).await
    }

    /// Create the table for one schema if it does not exist.
    pub async fn create_table(&self, cx: &Cx, schema: &Schema) -> Outcome<(), Error> {
        self.engine.create_table(cx, schema).await
    }

    /// Create tables for every registered schema, in registration order.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn create_all_tables(&self, cx: &Cx) -> Outcome<(), Error> {
        let schemas = self.registry.schemas();
        tracing::info!(count = schemas.len(), "Creating tables");
        self.engine.create_all(cx, &schemas).await
    }

    /// A query set over `schema`.
    pub fn objects(&self, schema: &Arc<Schema>) -> QuerySet<'_, D> {
        QuerySet::new(self, schema)
    }

    /// Persist an entity: INSERT when new, UPDATE otherwise.
    ///
    /// The entity is fully validated first. A persisted entity whose primary
    /// key was changed in memory is rejected without sending a statement.
    #[tracing::instrument(level = "debug", skip(self, cx, entity), fields(model = entity.schema().name()))]
    pub async fn save(&self, cx: &Cx, entity: &mut Entity) -> Outcome<(), Error> {
        if let Err(e) = self.ensure_connected() {
            return Outcome::Err(e);
        }
        if let Err(e) = entity.check_primary_key_unchanged() {
            return Outcome::Err(e);
        }
        if let Err(e) = entity.validate() {
            return Outcome::Err(e);
        }

        let outcome = if entity.is_new() {
            tracing::info!(model = entity.schema().name(), "Inserting object");
            self.engine.insert(cx, entity).await
        } else {
            tracing::info!(
                model = entity.schema().name(),
                pk = %entity.primary_key_value(),
                "Updating object"
            );
            self.engine.update(cx, entity).await
        };

        match outcome {
            Outcome::Ok(()) => {
                entity.mark_persisted();
                Outcome::Ok(())
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Delete a persisted entity's row.
    #[tracing::instrument(level = "debug", skip(self, cx, entity), fields(model = entity.schema().name()))]
    pub async fn delete(&self, cx: &Cx, entity: &Entity) -> Outcome<(), Error> {
        if let Err(e) = self.ensure_connected() {
            return Outcome::Err(e);
        }
        if entity.is_new() || entity.primary_key_value().is_null() {
            return Outcome::Err(Error::Custom(format!(
                "{} object can't be deleted because its primary key is not set",
                entity.schema().name()
            )));
        }
        if let Err(e) = entity.check_primary_key_unchanged() {
            return Outcome::Err(e);
        }

        tracing::info!(
            model = entity.schema().name(),
            pk = %entity.primary_key_value(),
            "Deleting object"
        );
        self.engine.delete(cx, entity).await
    }

    pub(crate) fn ensure_connected(&self) -> Result<()> {
        if self.engine.is_connected() {
            Ok(())
        } else {
            Err(Error::Config(
                "database is not connected; call connect() first".to_string(),
            ))
        }
    }
}
