//! Schema declaration and the schema registry.
//!
//! A schema is declared once through [`SchemaBuilder`] and registered with a
//! [`SchemaRegistry`]. Declaration validates everything up front: exactly one
//! primary key, legal identifiers, no duplicate columns, consistent foreign
//! keys. The resulting [`Schema`] is immutable and shared behind an `Arc`.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::error::{Error, Result};
use crate::field::{FieldInfo, FieldKind, ForeignKeyInfo, ReferentialAction};
use crate::identifiers::is_valid_identifier;
use crate::value::Value;

/// Immutable metadata for one entity type.
#[derive(Debug)]
pub struct Schema {
    name: String,
    table_name: String,
    fields: Vec<FieldInfo>,
    foreign_keys: Vec<ForeignKeyInfo>,
    pk_index: usize,
    is_abstract: bool,
}

/// A column of a schema: either a plain field or a foreign key's `<name>_id`.
#[derive(Debug, Clone, Copy)]
pub enum Column<'a> {
    /// Plain field.
    Field(&'a FieldInfo),
    /// Foreign key column.
    ForeignKey(&'a ForeignKeyInfo),
}

impl Column<'_> {
    /// Physical column name.
    pub fn name(&self) -> String {
        match self {
            Column::Field(f) => f.name.clone(),
            Column::ForeignKey(fk) => fk.column_name(),
        }
    }

    /// Whether a null value fails validation.
    pub fn is_required(&self) -> bool {
        match self {
            Column::Field(f) => f.required,
            Column::ForeignKey(fk) => fk.required,
        }
    }

    /// Type-check a non-null value.
    pub fn validate(&self, value: &Value) -> Result<()> {
        match self {
            Column::Field(f) => f.validate(value),
            Column::ForeignKey(fk) => fk.validate(value),
        }
    }
}

impl Schema {
    /// Declared type name (e.g. `Author`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table name: explicit override or the lowercased type name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Plain fields in declaration order.
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Foreign keys in declaration order.
    pub fn foreign_keys(&self) -> &[ForeignKeyInfo] {
        &self.foreign_keys
    }

    /// Whether this schema is an abstract base.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Name of the primary key field.
    pub fn primary_key(&self) -> &str {
        &self.fields[self.pk_index].name
    }

    /// The primary key field.
    pub fn primary_key_field(&self) -> &FieldInfo {
        &self.fields[self.pk_index]
    }

    /// Look up a plain field by name.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a foreign key by relation name (without `_id`).
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKeyInfo> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }

    /// Look up a column by physical name.
    pub fn column(&self, name: &str) -> Option<Column<'_>> {
        if let Some(f) = self.field(name) {
            return Some(Column::Field(f));
        }
        self.foreign_keys
            .iter()
            .find(|fk| fk.column_name() == name)
            .map(Column::ForeignKey)
    }

    /// All columns: plain fields first, then foreign keys.
    pub fn columns(&self) -> impl Iterator<Item = Column<'_>> {
        self.fields
            .iter()
            .map(Column::Field)
            .chain(self.foreign_keys.iter().map(Column::ForeignKey))
    }

    /// All physical column names in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns().map(|c| c.name()).collect()
    }

    /// Build an [`Error::UnknownField`] for this schema.
    pub fn unknown_field(&self, name: &str) -> Error {
        let hint = self
            .foreign_key(name)
            .map(|fk| format!("assign the related id through '{}'", fk.column_name()));
        Error::UnknownField {
            model: self.name.clone(),
            field: name.to_string(),
            hint,
        }
    }
}

/// Collects a schema declaration and validates it in [`SchemaBuilder::build`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    table_name: Option<String>,
    fields: Vec<FieldInfo>,
    foreign_keys: Vec<ForeignKeyInfo>,
    is_abstract: bool,
}

impl SchemaBuilder {
    /// Start declaring a schema for the type `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            fields: Vec::new(),
            foreign_keys: Vec::new(),
            is_abstract: false,
        }
    }

    /// Override the derived table name.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Declare a plain field.
    pub fn field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a foreign key.
    pub fn foreign_key(mut self, fk: ForeignKeyInfo) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Copy the fields and foreign keys of an abstract base, ahead of the
    /// ones declared on this builder.
    pub fn inherit(mut self, base: &Schema) -> Self {
        let mut fields = base.fields.clone();
        fields.append(&mut self.fields);
        self.fields = fields;

        let mut fks = base.foreign_keys.clone();
        fks.append(&mut self.foreign_keys);
        self.foreign_keys = fks;
        self
    }

    /// Mark as an abstract base: never registered, never gets a table.
    pub fn mark_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Validate the declaration and produce the immutable schema.
    pub fn build(self) -> Result<Schema> {
        let name = self.name;
        if name.is_empty() {
            return Err(Error::Config("schema name cannot be empty".into()));
        }
        let table_name = self.table_name.unwrap_or_else(|| name.to_lowercase());
        if !is_valid_identifier(&table_name) {
            return Err(Error::Config(format!(
                "{name}: invalid table name '{table_name}'"
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            check_column_name(&name, &field.name, &mut seen)?;
            if field.max_length.is_some() && field.kind != FieldKind::Text {
                return Err(Error::Config(format!(
                    "{name}.{}: max_length only applies to text fields",
                    field.name
                )));
            }
            if let Some(default) = field.default.as_ref().filter(|v| !v.is_null()) {
                if field.validate(default).is_err() {
                    return Err(Error::Config(format!(
                        "{name}.{}: default value {default} does not match the field type",
                        field.name
                    )));
                }
            }
        }
        for fk in &self.foreign_keys {
            check_column_name(&name, &fk.column_name(), &mut seen)?;
            if self.fields.iter().any(|f| f.name == fk.name) {
                return Err(Error::Config(format!(
                    "{name}: field '{}' collides with foreign key of the same name",
                    fk.name
                )));
            }
            if fk.related.is_abstract() {
                return Err(Error::Config(format!(
                    "{name}.{}: cannot reference abstract schema {}",
                    fk.name,
                    fk.related.name()
                )));
            }
            if fk.required
                && matches!(
                    fk.on_delete,
                    ReferentialAction::SetNull | ReferentialAction::SetDefault
                )
            {
                return Err(Error::Config(format!(
                    "{name}.{}: ON DELETE {} requires required(false)",
                    fk.name,
                    fk.on_delete.as_sql()
                )));
            }
        }

        let pks: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.primary_key)
            .map(|(i, _)| i)
            .collect();
        let pk_index = match pks.as_slice() {
            [] => {
                return Err(Error::Config(format!(
                    "{name} must have one primary key field"
                )));
            }
            [idx] => *idx,
            many => {
                let names: Vec<&str> = many.iter().map(|i| self.fields[*i].name.as_str()).collect();
                return Err(Error::Config(format!(
                    "{name} cannot have more than one primary key (found {})",
                    names.join(", ")
                )));
            }
        };

        Ok(Schema {
            name,
            table_name,
            fields: self.fields,
            foreign_keys: self.foreign_keys,
            pk_index,
            is_abstract: self.is_abstract,
        })
    }
}

fn check_column_name(model: &str, column: &str, seen: &mut HashSet<String>) -> Result<()> {
    if !is_valid_identifier(column) {
        return Err(Error::Config(format!(
            "{model}: invalid column name '{column}'"
        )));
    }
    if !seen.insert(column.to_string()) {
        return Err(Error::Config(format!(
            "{model}: column '{column}' is declared more than once"
        )));
    }
    Ok(())
}

/// The list of declared, non-abstract schemas used for bulk table creation.
///
/// Registration order is preserved, so schemas that are referenced by foreign
/// keys (and therefore declared first) get their tables created first.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<Vec<Arc<Schema>>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<SchemaRegistry> {
        static REGISTRY: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();
        Arc::clone(REGISTRY.get_or_init(|| Arc::new(SchemaRegistry::new())))
    }

    /// Declare a schema: validate it and, unless abstract, register it.
    ///
    /// Fails with [`Error::Config`] on an invalid declaration or when another
    /// registered schema already owns the table name.
    pub fn register(&self, builder: SchemaBuilder) -> Result<Arc<Schema>> {
        let schema = Arc::new(builder.build()?);
        if schema.is_abstract() {
            tracing::debug!(model = schema.name(), "Declared abstract schema");
            return Ok(schema);
        }

        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = schemas
            .iter()
            .find(|s| s.table_name() == schema.table_name())
        {
            return Err(Error::Config(format!(
                "table '{}' is already registered by {}",
                schema.table_name(),
                existing.name()
            )));
        }
        schemas.push(Arc::clone(&schema));

        tracing::debug!(
            model = schema.name(),
            table = schema.table_name(),
            primary_key = schema.primary_key(),
            "Registered schema"
        );
        Ok(schema)
    }

    /// Registered schemas in registration order.
    pub fn schemas(&self) -> Vec<Arc<Schema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Find a registered schema by type name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|s| s.name() == name)
            .cloned()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
