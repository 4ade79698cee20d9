//! Entity instances: one row's worth of values bound to a schema.
//!
//! Entities are untyped records (a map from column name to [`Value`]) checked
//! against their [`Schema`] on every assignment path. Only declared columns can
//! be set, foreign keys are assigned through their `<name>_id` column, and the
//! primary key captured at load time is kept to detect in-memory tampering.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result, ValidationError, ValidationErrorKind};
use crate::row::Row;
use crate::schema::{Column, Schema};
use crate::value::Value;

/// A live record of one schema.
#[derive(Debug, Clone)]
pub struct Entity {
    schema: Arc<Schema>,
    values: HashMap<String, Value>,
    is_new: bool,
    original_pk: Value,
}

impl Entity {
    /// Create an unsaved entity with every column set to its default.
    pub fn new(schema: &Arc<Schema>) -> Self {
        let values = schema
            .columns()
            .map(|col| {
                let default = match col {
                    Column::Field(f) => f.default_value(),
                    Column::ForeignKey(_) => Value::Null,
                };
                (col.name(), default)
            })
            .collect();
        Self {
            schema: Arc::clone(schema),
            values,
            is_new: true,
            original_pk: Value::Null,
        }
    }

    /// Create an unsaved entity from defaults overridden by `values`.
    ///
    /// Every name must be a declared column. Passing a foreign key's relation
    /// name instead of its `<name>_id` column fails with a hint.
    pub fn with_values<I, K, V>(schema: &Arc<Schema>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut entity = Self::new(schema);
        for (name, value) in values {
            entity.set(name.as_ref(), value)?;
        }
        Ok(entity)
    }

    /// Materialize a persisted entity from a result row.
    ///
    /// Columns absent from the row are left NULL; extra row columns are
    /// ignored.
    pub fn from_row(schema: &Arc<Schema>, row: &Row) -> Self {
        let values: HashMap<String, Value> = schema
            .columns()
            .map(|col| {
                let name = col.name();
                let value = row.get_named(&name).cloned().unwrap_or_default();
                (name, value)
            })
            .collect();
        let original_pk = values
            .get(schema.primary_key())
            .cloned()
            .unwrap_or_default();
        Self {
            schema: Arc::clone(schema),
            values,
            is_new: false,
            original_pk,
        }
    }

    /// The entity's schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// True until the first successful insert.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Primary key captured at load or at the last successful save.
    pub fn original_primary_key(&self) -> &Value {
        &self.original_pk
    }

    /// Current primary key value.
    pub fn primary_key_value(&self) -> &Value {
        self.values
            .get(self.schema.primary_key())
            .unwrap_or(&Value::Null)
    }

    /// Value of a declared column.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Assign a declared column.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if self.schema.column(name).is_none() {
            return Err(self.schema.unknown_field(name));
        }
        self.values.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Write a backend-generated primary key without touching the original.
    pub fn set_primary_key(&mut self, value: Value) {
        self.values
            .insert(self.schema.primary_key().to_string(), value);
    }

    /// Record a successful save: no longer new, current key becomes original.
    pub fn mark_persisted(&mut self) {
        self.is_new = false;
        self.original_pk = self.primary_key_value().clone();
    }

    /// `(column, value)` pairs in schema column order.
    pub fn column_values(&self) -> Vec<(String, Value)> {
        self.schema
            .columns()
            .map(|col| {
                let name = col.name();
                let value = self.values.get(&name).cloned().unwrap_or_default();
                (name, value)
            })
            .collect()
    }

    /// Check every column, collecting all failures.
    ///
    /// A null value fails when the column is required; a generated integer
    /// primary key may be null while the entity is new, and any other primary
    /// key must always be set. Non-null values are type-checked.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationError::new();
        let pk = self.schema.primary_key_field();

        for col in self.schema.columns() {
            let name = col.name();
            let value = self.values.get(&name).unwrap_or(&Value::Null);

            if value.is_null() {
                let is_pk = name == pk.name;
                let required = if is_pk {
                    !(self.is_new && pk.is_auto_increment())
                } else {
                    col.is_required()
                };
                if required {
                    errors.add(name, ValidationErrorKind::Required, "field is required");
                }
                continue;
            }

            match col.validate(value) {
                Ok(()) => {}
                Err(Error::Validation(e)) => errors.extend(e),
                Err(other) => return Err(other),
            }
        }
        errors.into_result()
    }

    /// Fail when the primary key was changed in memory since it was loaded.
    pub fn check_primary_key_unchanged(&self) -> Result<()> {
        if self.is_new {
            return Ok(());
        }
        let current = self.primary_key_value();
        if *current != self.original_pk {
            return Err(Error::validation(
                self.schema.primary_key(),
                ValidationErrorKind::PrimaryKeyChanged,
                format!(
                    "primary key cannot be changed after load (was {}, now {current})",
                    self.original_pk
                ),
            ));
        }
        Ok(())
    }

    /// Column values as a JSON object.
    ///
    /// Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .column_values()
            .into_iter()
            .map(|(name, value)| (name, serde_json::to_value(&value).unwrap_or_default()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pk = self.schema.primary_key();
        write!(
            f,
            "<{}: {pk}={}",
            self.schema.name(),
            self.primary_key_value()
        )?;

        let mut rest: Vec<(&String, &Value)> =
            self.values.iter().filter(|(k, _)| k.as_str() != pk).collect();
        rest.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in rest {
            write!(f, ", {name}={value}")?;
        }
        f.write_str(">")
    }
}
