//! Field and foreign-key descriptors.

use std::sync::Arc;

use crate::error::{Error, Result, ValidationErrorKind};
use crate::schema::Schema;
use crate::value::Value;

/// What happens to referencing rows when a referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    /// Reject the delete while references exist (checked at statement end).
    #[default]
    NoAction,
    /// Reject the delete while references exist (checked immediately).
    Restrict,
    /// Delete the referencing rows too.
    Cascade,
    /// Null the referencing column. The foreign key must be optional.
    SetNull,
    /// Reset the referencing column to its default, which is NULL for a
    /// foreign key. The foreign key must be optional.
    SetDefault,
}

impl ReferentialAction {
    /// SQL keyword(s) for the ON DELETE clause.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

/// Semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer column. An integer primary key is generated by the backend.
    Integer,
    /// Text column, optionally bounded by `max_length`.
    Text,
    /// Boolean column.
    Boolean,
}

impl FieldKind {
    /// Name used in validation messages ("must be an integer").
    pub const fn article_name(&self) -> &'static str {
        match self {
            FieldKind::Integer => "an integer",
            FieldKind::Text => "a string",
            FieldKind::Boolean => "a boolean",
        }
    }
}

/// Metadata and validation rule for one plain column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Field name, also the column name.
    pub name: String,
    /// Semantic kind.
    pub kind: FieldKind,
    /// Whether this is the primary key.
    pub primary_key: bool,
    /// NOT NULL: a null value fails validation.
    pub required: bool,
    /// UNIQUE constraint.
    pub unique: bool,
    /// Value assigned when an entity is constructed.
    pub default: Option<Value>,
    /// Maximum character count for text fields (VARCHAR(n)).
    pub max_length: Option<usize>,
}

impl FieldInfo {
    /// Create a field of the given kind with no constraints.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            primary_key: false,
            required: false,
            unique: false,
            default: None,
            max_length: None,
        }
    }

    /// Integer field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Boolean field. Defaults to `false` unless overridden.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean).default(false)
    }

    /// Set primary key flag.
    pub fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    /// Set required (NOT NULL) flag.
    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    /// Set unique flag.
    pub fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }

    /// Set default value.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set maximum length (text fields only).
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Integer primary keys are generated by the backend when absent.
    pub fn is_auto_increment(&self) -> bool {
        self.primary_key && self.kind == FieldKind::Integer
    }

    /// The value an entity starts with for this field.
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }

    /// Type-check a non-null value.
    ///
    /// This is a kind check only: integers must be `BigInt` (booleans and
    /// floats are rejected), text must be `Text` within `max_length`, and
    /// booleans must be `Bool`.
    pub fn validate(&self, value: &Value) -> Result<()> {
        self.check_value(value)
            .map_err(|(kind, message)| Error::validation(&self.name, kind, message))
    }

    pub(crate) fn check_value(
        &self,
        value: &Value,
    ) -> std::result::Result<(), (ValidationErrorKind, String)> {
        let type_ok = matches!(
            (self.kind, value),
            (FieldKind::Integer, Value::BigInt(_))
                | (FieldKind::Text, Value::Text(_))
                | (FieldKind::Boolean, Value::Bool(_))
        );
        if !type_ok {
            return Err((
                ValidationErrorKind::Type,
                format!(
                    "must be {}, got {}",
                    self.kind.article_name(),
                    value.kind_name()
                ),
            ));
        }
        if let (Some(max), Value::Text(s)) = (self.max_length, value) {
            let len = s.chars().count();
            if len > max {
                return Err((
                    ValidationErrorKind::MaxLength,
                    format!("exceeds max length of {max} (got {len})"),
                ));
            }
        }
        Ok(())
    }
}

/// A field that references another schema's primary key.
///
/// Materializes as a `<name>_id` column plus a table-level FOREIGN KEY
/// constraint. Unlike plain fields, foreign keys are required by default.
#[derive(Debug, Clone)]
pub struct ForeignKeyInfo {
    /// Relation name; the column is `<name>_id`.
    pub name: String,
    /// Referenced schema.
    pub related: Arc<Schema>,
    /// ON DELETE policy.
    pub on_delete: ReferentialAction,
    /// NOT NULL.
    pub required: bool,
}

impl ForeignKeyInfo {
    /// Reference `related` through a `<name>_id` column.
    pub fn new(name: impl Into<String>, related: &Arc<Schema>) -> Self {
        Self {
            name: name.into(),
            related: Arc::clone(related),
            on_delete: ReferentialAction::default(),
            required: true,
        }
    }

    /// Set the ON DELETE policy.
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Set required (NOT NULL) flag.
    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    /// The physical column name, `<name>_id`.
    pub fn column_name(&self) -> String {
        format!("{}_id", self.name)
    }

    /// Kind of the referenced primary key, which is also this column's kind.
    pub fn key_kind(&self) -> FieldKind {
        self.related.primary_key_field().kind
    }

    /// Type-check a non-null id value against the referenced primary key.
    pub fn validate(&self, value: &Value) -> Result<()> {
        self.related
            .primary_key_field()
            .check_value(value)
            .map_err(|(kind, message)| Error::validation(self.column_name(), kind, message))
    }
}

impl PartialEq for ForeignKeyInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.related.table_name() == other.related.table_name()
            && self.on_delete == other.on_delete
            && self.required == other.required
    }
}
