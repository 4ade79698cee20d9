//! Error types for SwiftORM.
//!
//! Driver failures arrive as [`Error::Connection`] or [`Error::Query`]. The
//! storage engine reclassifies constraint violations into [`Error::Integrity`]
//! and malformed-input failures into [`Error::Validation`]; everything the ORM
//! itself detects uses the remaining domain variants.

use std::fmt;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type.
#[derive(Debug)]
pub enum Error {
    /// Connection-level driver failure.
    Connection(ConnectionError),
    /// Statement-level driver failure.
    Query(QueryError),
    /// A value failed a field check, a required field was null, or the backend
    /// rejected malformed input.
    Validation(ValidationError),
    /// A database-enforced constraint was violated.
    Integrity(IntegrityError),
    /// `get()` matched no rows.
    ObjectNotFound {
        /// Model name.
        model: String,
    },
    /// `get()` matched more than one row.
    MultipleObjectsReturned {
        /// Model name.
        model: String,
        /// Number of rows returned.
        count: usize,
    },
    /// A name that is not a declared field was assigned or queried.
    UnknownField {
        /// Model name.
        model: String,
        /// The offending name.
        field: String,
        /// Optional guidance for the caller.
        hint: Option<String>,
    },
    /// Invalid schema declaration, settings, or use before setup.
    Config(String),
    /// Generic ORM misuse.
    Custom(String),
}

impl Error {
    /// True for [`Error::Validation`].
    pub const fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True for [`Error::Integrity`].
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Error::Integrity(_))
    }

    /// True for [`Error::ObjectNotFound`].
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound { .. })
    }

    /// True for [`Error::Config`].
    pub const fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Build a single-field validation error.
    pub fn validation(
        field: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Error::Validation(ValidationError::single(field, kind, message))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "connection error: {e}"),
            Error::Query(e) => write!(f, "query error: {e}"),
            Error::Validation(e) => write!(f, "validation error: {e}"),
            Error::Integrity(e) => write!(f, "integrity error: {e}"),
            Error::ObjectNotFound { model } => {
                write!(f, "{model} matching query does not exist")
            }
            Error::MultipleObjectsReturned { model, count } => {
                write!(f, "query for {model} returned {count} objects, expected 1")
            }
            Error::UnknownField { model, field, hint } => {
                write!(f, "'{model}' object has no attribute '{field}'")?;
                if let Some(hint) = hint {
                    write!(f, "; {hint}")?;
                }
                Ok(())
            }
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|s| s as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

/// Kinds of connection failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Could not establish the connection.
    Connect,
    /// Authentication was rejected.
    Authentication,
    /// The connection was closed or never opened.
    Disconnected,
}

/// A connection-level failure reported by the driver.
#[derive(Debug)]
pub struct ConnectionError {
    /// What went wrong.
    pub kind: ConnectionErrorKind,
    /// Driver message.
    pub message: String,
    /// Underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Kinds of statement failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Malformed SQL.
    Syntax,
    /// Constraint violation (SQLSTATE class 23).
    Constraint,
    /// Malformed bind value (SQLSTATE class 22).
    InvalidInput,
    /// Statement cancelled.
    Cancelled,
    /// Any other database failure.
    Database,
}

/// A statement-level failure reported by the driver.
#[derive(Debug, Clone)]
pub struct QueryError {
    /// Classification.
    pub kind: QueryErrorKind,
    /// Five character SQLSTATE, when the backend supplied one.
    pub sqlstate: Option<String>,
    /// Driver message.
    pub message: String,
    /// The statement that failed.
    pub sql: Option<String>,
    /// Constraint name, when the backend supplied one.
    pub constraint: Option<String>,
}

impl QueryError {
    /// Create a query error with no SQLSTATE.
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            sqlstate: None,
            message: message.into(),
            sql: None,
            constraint: None,
        }
    }

    /// Attach a SQLSTATE code.
    pub fn with_sqlstate(mut self, code: impl Into<String>) -> Self {
        self.sqlstate = Some(code.into());
        self
    }

    /// Attach the failing statement.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    /// Attach the violated constraint name.
    pub fn with_constraint(mut self, name: impl Into<String>) -> Self {
        self.constraint = Some(name.into());
        self
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sqlstate {
            Some(code) => write!(f, "{} (SQLSTATE {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// What kind of field check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required field was null or absent.
    Required,
    /// The value had the wrong kind.
    Type,
    /// A string exceeded its maximum length.
    MaxLength,
    /// The primary key was changed in memory after load.
    PrimaryKeyChanged,
    /// The backend rejected the input as malformed.
    InvalidInput,
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationError {
    /// Field or column name.
    pub field: String,
    /// Failure kind.
    pub kind: ValidationErrorKind,
    /// Human readable message.
    pub message: String,
}

impl fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every failing field of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    /// Individual failures, in field declaration order.
    pub errors: Vec<FieldValidationError>,
}

impl ValidationError {
    /// Create an empty error collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error with a single failure.
    pub fn single(
        field: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) -> Self {
        let mut err = Self::new();
        err.add(field, kind, message);
        err
    }

    /// Record a failure.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) {
        self.errors.push(FieldValidationError {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }

    /// Merge another error's failures into this one.
    pub fn extend(&mut self, other: ValidationError) {
        self.errors.extend(other.errors);
    }

    /// True when nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when some failure has the given kind.
    pub fn has_kind(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// `Ok(())` when empty, otherwise `Err(Error::Validation(self))`.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

/// Which database constraint was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityErrorKind {
    /// UNIQUE or PRIMARY KEY (SQLSTATE 23505).
    Unique,
    /// FOREIGN KEY (SQLSTATE 23503).
    ForeignKey,
    /// NOT NULL (SQLSTATE 23502).
    NotNull,
    /// CHECK (SQLSTATE 23514).
    Check,
    /// Any other class 23 violation.
    Other,
}

/// A database-enforced constraint violation.
#[derive(Debug, Clone)]
pub struct IntegrityError {
    /// Which constraint class failed.
    pub kind: IntegrityErrorKind,
    /// Constraint name, when known.
    pub constraint: Option<String>,
    /// Backend message.
    pub message: String,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(name) => write!(f, "{} (constraint {name})", self.message),
            None => f.write_str(&self.message),
        }
    }
}
